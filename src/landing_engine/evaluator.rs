use super::WindowFilter;
use crate::sys::host::WindowInfo;

/// Everything besides the window lists that a removal is judged against.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    pub filter: WindowFilter,
    /// Whether the shell is already showing its overview. We never trigger
    /// again while it is up.
    pub overview_shown: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The window count did not change. Some shells report removals for
    /// transient popups that never showed up in the window list.
    NoNetChange,
    /// Nothing on the primary monitor was open before the removal, and
    /// secondary monitors are ignored.
    SecondaryMonitorOnly,
    WindowsRemain(usize),
    AlreadyShown,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub trigger: bool,
    pub reason: Reason,
}

impl From<Reason> for Evaluation {
    fn from(reason: Reason) -> Self {
        Evaluation { trigger: reason == Reason::Empty, reason }
    }
}

/// Judges a window-removed signal, given the workspace's windows before
/// (`pre`) and after (`post`) the removal.
pub fn evaluate(pre: &[WindowInfo], post: &[WindowInfo], ctx: &EvalContext) -> Evaluation {
    if pre.len() == post.len() {
        return Reason::NoNetChange.into();
    }

    let primary_pre = ctx.filter.count_on_primary(pre);
    let eligible_post = ctx.filter.count_eligible(post);

    // A burst that removes windows from several monitors at once is still
    // judged only by whether the primary monitor had anything open.
    if ctx.filter.ignore_secondary_monitors && primary_pre == 0 {
        return Reason::SecondaryMonitorOnly.into();
    }
    if eligible_post > 0 {
        return Reason::WindowsRemain(eligible_post).into();
    }
    if ctx.overview_shown {
        return Reason::AlreadyShown.into();
    }
    Reason::Empty.into()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::host::{MonitorId, WindowId};

    fn window(id: u64, monitor: i32) -> WindowInfo {
        WindowInfo {
            id: WindowId::new(id),
            monitor: MonitorId::new(monitor),
            skip_taskbar: false,
            showing_on_workspace: true,
        }
    }

    fn ctx(ignore_minimized: bool, ignore_secondary_monitors: bool) -> EvalContext {
        EvalContext {
            filter: WindowFilter {
                primary_monitor: MonitorId::new(0),
                ignore_minimized,
                ignore_secondary_monitors,
            },
            overview_shown: false,
        }
    }

    #[test]
    fn equal_length_lists_never_trigger() {
        let lists: [Vec<WindowInfo>; 3] = [
            vec![],
            vec![window(1, 0)],
            vec![window(1, 1), window(2, 0)],
        ];
        for list in &lists {
            // Same length, different contents: still not a removal.
            let shifted: Vec<_> = list.iter().map(|w| WindowInfo { id: WindowId::new(99), ..*w }).collect();
            for (min, sec) in [(false, false), (true, false), (false, true), (true, true)] {
                let eval = evaluate(list, &shifted, &ctx(min, sec));
                assert_eq!(eval, Evaluation { trigger: false, reason: Reason::NoNetChange });
            }
        }
    }

    #[test]
    fn last_window_closed_triggers() {
        let eval = evaluate(&[window(1, 0)], &[], &ctx(false, false));
        assert_eq!(eval, Evaluation { trigger: true, reason: Reason::Empty });
    }

    #[test]
    fn remaining_windows_do_not_trigger() {
        let eval = evaluate(&[window(1, 0), window(2, 0)], &[window(2, 0)], &ctx(false, false));
        assert_eq!(eval.reason, Reason::WindowsRemain(1));
        assert!(!eval.trigger);
    }

    #[test]
    fn ignored_windows_do_not_keep_the_workspace_occupied() {
        let mut minimized = window(2, 0);
        minimized.showing_on_workspace = false;
        let mut popup = window(3, 0);
        popup.skip_taskbar = true;

        let pre = [window(1, 0), minimized, popup];
        let post = [minimized, popup];
        assert!(evaluate(&pre, &post, &ctx(true, false)).trigger);
        assert_eq!(
            evaluate(&pre, &post, &ctx(false, false)).reason,
            Reason::WindowsRemain(1)
        );
    }

    #[test]
    fn secondary_only_removal_is_suppressed() {
        let eval = evaluate(&[window(1, 1)], &[], &ctx(false, true));
        assert_eq!(eval, Evaluation { trigger: false, reason: Reason::SecondaryMonitorOnly });

        // Without the preference the same removal empties the desktop.
        assert!(evaluate(&[window(1, 1)], &[], &ctx(false, false)).trigger);
    }

    #[test]
    fn primary_windows_before_removal_lift_suppression() {
        // Primary window closes, a window on the secondary monitor stays:
        // it is ignored, so the desktop counts as empty.
        let eval = evaluate(&[window(1, 0), window(2, 1)], &[window(2, 1)], &ctx(false, true));
        assert!(eval.trigger);
    }

    #[test]
    fn mixed_burst_is_judged_by_primary_count_alone() {
        let eval = evaluate(&[window(1, 0), window(2, 1)], &[], &ctx(false, true));
        assert!(eval.trigger);

        let eval = evaluate(&[window(1, 1), window(2, 1)], &[], &ctx(false, true));
        assert_eq!(eval.reason, Reason::SecondaryMonitorOnly);
    }

    #[test]
    fn secondary_removal_with_only_minimized_primary_windows_left_triggers() {
        // The closed window was on the secondary monitor, but the primary
        // monitor had a (minimized) window before the removal. Suppression
        // looks at the primary count before the removal, not at which monitor
        // lost a window, so this counts as emptied.
        let mut minimized = window(1, 0);
        minimized.showing_on_workspace = false;

        let eval = evaluate(&[minimized, window(2, 1)], &[minimized], &ctx(true, true));
        assert_eq!(eval, Evaluation { trigger: true, reason: Reason::Empty });

        // Minimized windows still count when they are not ignored.
        let eval = evaluate(&[minimized, window(2, 1)], &[minimized], &ctx(false, true));
        assert_eq!(eval.reason, Reason::WindowsRemain(1));
    }

    #[test]
    fn never_triggers_while_overview_is_shown() {
        let mut shown = ctx(false, false);
        shown.overview_shown = true;
        for _ in 0..3 {
            let eval = evaluate(&[window(1, 0)], &[], &shown);
            assert_eq!(eval, Evaluation { trigger: false, reason: Reason::AlreadyShown });
        }
    }
}
