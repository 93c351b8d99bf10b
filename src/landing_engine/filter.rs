use crate::common::config::Settings;
use crate::sys::host::{MonitorId, WindowInfo};

/// Decides which windows count toward a workspace being occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFilter {
    pub primary_monitor: MonitorId,
    pub ignore_minimized: bool,
    pub ignore_secondary_monitors: bool,
}

impl WindowFilter {
    pub fn new(settings: &Settings, primary_monitor: MonitorId) -> Self {
        Self {
            primary_monitor,
            ignore_minimized: settings.ignore_minimized_windows,
            ignore_secondary_monitors: settings.ignore_secondary_monitor_windows,
        }
    }

    pub fn is_eligible(&self, window: &WindowInfo) -> bool {
        !window.skip_taskbar
            && (!self.ignore_secondary_monitors || window.monitor == self.primary_monitor)
            && (!self.ignore_minimized || window.showing_on_workspace)
    }

    pub fn count_eligible<'a>(&self, windows: impl IntoIterator<Item = &'a WindowInfo>) -> usize {
        windows.into_iter().filter(|w| self.is_eligible(w)).count()
    }

    /// Windows on the primary monitor that show up in a taskbar, regardless
    /// of the minimized/secondary filters.
    pub fn count_on_primary<'a>(&self, windows: impl IntoIterator<Item = &'a WindowInfo>) -> usize {
        windows
            .into_iter()
            .filter(|w| w.monitor == self.primary_monitor && !w.skip_taskbar)
            .count()
    }
}
