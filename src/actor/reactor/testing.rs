use std::collections::BTreeMap;
use std::time::Duration;

use super::{Event, Reactor};
use crate::sys::host::{
    AppsView, Host, HostError, MonitorId, Signal, SignalHandlerId, TimerId, WindowId, WindowInfo,
    WorkspaceId,
};

pub fn window(id: u64, monitor: i32) -> WindowInfo {
    WindowInfo {
        id: WindowId::new(id),
        monitor: MonitorId::new(monitor),
        skip_taskbar: false,
        showing_on_workspace: true,
    }
}

pub fn exempt_window(id: u64, monitor: i32) -> WindowInfo {
    WindowInfo { skip_taskbar: true, ..window(id, monitor) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCall {
    ShowOverview,
    SelectAppsView(AppsView),
}

/// A scripted shell. State is changed directly by the test, and signals are
/// only delivered to handlers that are connected at the time of emission.
pub struct MockHost {
    workspaces: Vec<(WorkspaceId, Vec<WindowInfo>)>,
    active: Option<usize>,
    primary: MonitorId,
    focused: Option<WindowId>,
    dynamic: bool,
    overview_shown: bool,
    /// Whether `show_overview` flips `overview_shown`, like a shell that is up.
    overview_responds: bool,
    overview_requested: bool,
    handlers: BTreeMap<SignalHandlerId, Signal>,
    next_handler: u64,
    connects_left: Option<usize>,
    timers: BTreeMap<TimerId, Duration>,
    next_timer: u64,
    scheduled: usize,
    cancelled: Vec<TimerId>,
    failing: bool,
    calls: Vec<ShellCall>,
}

impl MockHost {
    pub fn with_workspaces(workspaces: Vec<Vec<WindowInfo>>) -> Self {
        MockHost {
            workspaces: workspaces
                .into_iter()
                .enumerate()
                .map(|(i, windows)| (WorkspaceId::new(100 + i as u64), windows))
                .collect(),
            active: Some(0),
            primary: MonitorId::new(0),
            focused: None,
            dynamic: true,
            overview_shown: false,
            overview_responds: true,
            overview_requested: false,
            handlers: BTreeMap::new(),
            next_handler: 1,
            connects_left: None,
            timers: BTreeMap::new(),
            next_timer: 1,
            scheduled: 0,
            cancelled: Vec::new(),
            failing: false,
            calls: Vec::new(),
        }
    }

    pub fn workspace_id(&self, index: usize) -> WorkspaceId { self.workspaces[index].0 }

    pub fn set_active(&mut self, index: usize) { self.active = Some(index); }

    pub fn clear_active(&mut self) { self.active = None; }

    pub fn set_dynamic(&mut self, dynamic: bool) { self.dynamic = dynamic; }

    pub fn set_focused(&mut self, focused: Option<WindowId>) { self.focused = focused; }

    /// Reports the overview state as the shell would, answering any pending
    /// request.
    pub fn set_overview_shown(&mut self, shown: bool) {
        self.overview_shown = shown;
        self.overview_requested = false;
    }

    /// Simulates a shell that is not ready yet: show requests are recorded
    /// and left pending, and the overview never reports as shown.
    pub fn set_overview_responds(&mut self, responds: bool) { self.overview_responds = responds; }

    pub fn set_failing(&mut self, failing: bool) { self.failing = failing; }

    pub fn fail_connects_after(&mut self, n: usize) { self.connects_left = Some(n); }

    pub fn add_workspace(&mut self, windows: Vec<WindowInfo>) -> usize {
        let id = WorkspaceId::new(100 + self.workspaces.len() as u64);
        self.workspaces.push((id, windows));
        self.workspaces.len() - 1
    }

    pub fn add_window(&mut self, index: usize, window: WindowInfo) {
        self.workspaces[index].1.push(window);
    }

    pub fn remove_window(&mut self, index: usize, id: u64) {
        self.workspaces[index].1.retain(|w| w.id != WindowId::new(id));
    }

    pub fn connected_signals(&self) -> Vec<Signal> { self.handlers.values().copied().collect() }

    pub fn emit(&self, signal: Signal) -> Vec<Event> {
        self.handlers
            .iter()
            .filter(|(_, s)| **s == signal)
            .map(|(id, _)| Event::Signal(*id))
            .collect()
    }

    /// Fires every pending timer, as if enough time had passed.
    pub fn expire_timers(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.timers).into_keys().map(Event::TimerFired).collect()
    }

    pub fn pending_timers(&self) -> Vec<Duration> { self.timers.values().copied().collect() }

    pub fn scheduled_timers(&self) -> usize { self.scheduled }

    pub fn cancelled_timers(&self) -> &[TimerId] { &self.cancelled }

    pub fn calls(&self) -> &[ShellCall] { &self.calls }

    fn check(&self) -> Result<(), HostError> {
        if self.failing { Err(HostError::Disconnected) } else { Ok(()) }
    }

    fn find(&self, workspace: WorkspaceId) -> Result<&Vec<WindowInfo>, HostError> {
        self.workspaces
            .iter()
            .find(|(id, _)| *id == workspace)
            .map(|(_, windows)| windows)
            .ok_or(HostError::UnknownWorkspace(workspace))
    }
}

impl Host for MockHost {
    fn active_workspace(&self) -> Result<Option<WorkspaceId>, HostError> {
        self.check()?;
        Ok(self.active.map(|i| self.workspaces[i].0))
    }

    fn workspace_count(&self) -> Result<usize, HostError> {
        self.check()?;
        Ok(self.workspaces.len())
    }

    fn workspace_by_index(&self, index: usize) -> Result<WorkspaceId, HostError> {
        self.check()?;
        self.workspaces.get(index).map(|(id, _)| *id).ok_or(HostError::IndexOutOfRange {
            index,
            count: self.workspaces.len(),
        })
    }

    fn list_windows(&self, workspace: WorkspaceId) -> Result<Vec<WindowInfo>, HostError> {
        self.check()?;
        self.find(workspace).cloned()
    }

    fn primary_monitor(&self) -> Result<MonitorId, HostError> {
        self.check()?;
        Ok(self.primary)
    }

    fn focused_window(&self) -> Result<Option<WindowId>, HostError> {
        self.check()?;
        Ok(self.focused)
    }

    fn dynamic_workspaces(&self) -> bool { self.dynamic }

    fn connect(&mut self, signal: Signal) -> Result<SignalHandlerId, HostError> {
        self.check()?;
        if let Some(left) = self.connects_left.as_mut() {
            if *left == 0 {
                return Err(HostError::Disconnected);
            }
            *left -= 1;
        }
        let id = SignalHandlerId::new(self.next_handler);
        self.next_handler += 1;
        self.handlers.insert(id, signal);
        Ok(id)
    }

    fn disconnect(&mut self, id: SignalHandlerId) {
        assert!(self.handlers.remove(&id).is_some(), "disconnected unknown handler {id:?}");
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        let id = TimerId::new(self.next_timer);
        self.next_timer += 1;
        self.scheduled += 1;
        self.timers.insert(id, delay);
        id
    }

    fn cancel_timer(&mut self, id: TimerId) {
        self.timers.remove(&id);
        self.cancelled.push(id);
    }

    fn overview_shown(&self) -> bool { self.overview_shown }

    fn overview_requested(&self) -> bool { self.overview_requested }

    fn show_overview(&mut self) {
        self.calls.push(ShellCall::ShowOverview);
        if self.overview_responds {
            self.overview_shown = true;
        } else {
            self.overview_requested = true;
        }
    }

    fn select_apps_view(&mut self, view: AppsView) { self.calls.push(ShellCall::SelectAppsView(view)); }
}

impl Reactor<MockHost> {
    pub fn handle_events(&mut self, events: Vec<Event>) {
        for event in events {
            self.handle_event(event);
        }
    }

    pub fn open_window(&mut self, index: usize, window: WindowInfo) {
        self.host.add_window(index, window);
        let events = self.host.emit(Signal::WindowAdded(self.host.workspace_id(index)));
        self.handle_events(events);
    }

    pub fn close_window(&mut self, index: usize, id: u64) {
        self.host.remove_window(index, id);
        let events = self.host.emit(Signal::WindowRemoved(self.host.workspace_id(index)));
        self.handle_events(events);
    }

    pub fn switch_to(&mut self, index: usize) {
        self.host.set_active(index);
        let events = self.host.emit(Signal::WorkspaceSwitched);
        self.handle_events(events);
    }

    pub fn expire_timers(&mut self) {
        let events = self.host.expire_timers();
        self.handle_events(events);
    }
}
