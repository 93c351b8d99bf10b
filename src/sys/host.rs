//! The surface of the desktop shell that the reactor consumes.
//!
//! Everything the engine knows about windows and workspaces comes from a
//! [`Host`]. Signals carry no payload; a handler that receives one must
//! re-query the host for the current state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier the shell assigns to a workspace.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WorkspaceId(u64);

impl WorkspaceId {
    pub const fn new(id: u64) -> Self { Self(id) }

    pub fn get(self) -> u64 { self.0 }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(id: u64) -> Self { Self(id) }

    pub fn get(self) -> u64 { self.0 }
}

/// Index of a physical display as reported by the shell.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct MonitorId(i32);

impl MonitorId {
    pub const fn new(id: i32) -> Self { Self(id) }

    pub fn get(self) -> i32 { self.0 }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SignalHandlerId(u64);

impl SignalHandlerId {
    pub const fn new(id: u64) -> Self { Self(id) }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TimerId(u64);

impl TimerId {
    pub const fn new(id: u64) -> Self { Self(id) }
}

/// A window as seen by the engine. The shell owns the window; this is a
/// read-only copy taken at query time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub monitor: MonitorId,
    /// Set for popups, widgets and other windows that never show up in a
    /// taskbar. These never count as occupying a workspace.
    #[serde(default)]
    pub skip_taskbar: bool,
    /// False while the window is minimized or otherwise hidden.
    #[serde(default = "yes")]
    pub showing_on_workspace: bool,
}

fn yes() -> bool { true }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    WorkspaceSwitched,
    WindowAdded(WorkspaceId),
    WindowRemoved(WorkspaceId),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppsView {
    All,
    Frequent,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("unknown workspace {0:?}")]
    UnknownWorkspace(WorkspaceId),
    #[error("workspace index {index} out of range (have {count})")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("host is disconnected")]
    Disconnected,
}

pub trait Host {
    fn active_workspace(&self) -> Result<Option<WorkspaceId>, HostError>;
    fn workspace_count(&self) -> Result<usize, HostError>;
    fn workspace_by_index(&self, index: usize) -> Result<WorkspaceId, HostError>;
    fn list_windows(&self, workspace: WorkspaceId) -> Result<Vec<WindowInfo>, HostError>;
    fn primary_monitor(&self) -> Result<MonitorId, HostError>;
    fn focused_window(&self) -> Result<Option<WindowId>, HostError>;
    /// Whether the shell creates and destroys workspaces on demand, always
    /// keeping one trailing empty workspace.
    fn dynamic_workspaces(&self) -> bool;

    /// Subscribes to `signal`. Each emission is delivered to the reactor as
    /// `Event::Signal` with the returned id until [`Host::disconnect`] is
    /// called with it.
    fn connect(&mut self, signal: Signal) -> Result<SignalHandlerId, HostError>;
    fn disconnect(&mut self, id: SignalHandlerId);

    /// Delivers `Event::TimerFired` once after `delay` unless cancelled first.
    fn schedule_once(&mut self, delay: Duration) -> TimerId;
    fn cancel_timer(&mut self, id: TimerId);

    /// Whether the shell reports its overview as open.
    fn overview_shown(&self) -> bool;
    /// Whether we asked for the overview and the shell has not answered yet.
    fn overview_requested(&self) -> bool;
    fn show_overview(&mut self);
    fn select_apps_view(&mut self, view: AppsView);
}
