use crate::sys::host::{WindowInfo, WorkspaceId};

/// Result of scanning every workspace at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupCheck {
    AllEmpty,
    Occupied(WorkspaceId),
}

impl StartupCheck {
    pub fn is_empty(&self) -> bool { matches!(self, StartupCheck::AllEmpty) }
}

/// Scans workspaces in order and stops at the first one holding a window
/// that shows up in a taskbar. Minimized and secondary-monitor windows count
/// here; only the taskbar exemption applies at startup.
pub fn check_startup<I, E>(workspaces: I) -> Result<StartupCheck, E>
where I: IntoIterator<Item = Result<(WorkspaceId, Vec<WindowInfo>), E>> {
    for workspace in workspaces {
        let (id, windows) = workspace?;
        if windows.iter().any(|w| !w.skip_taskbar) {
            return Ok(StartupCheck::Occupied(id));
        }
    }
    Ok(StartupCheck::AllEmpty)
}
