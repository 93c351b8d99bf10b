//! A [`Host`] backed by a shell extension speaking line-delimited JSON.
//!
//! The shell writes [`ShellMessage`]s to our stdin and reads
//! [`ShellCommand`]s from our stdout. We keep a mirror of the shell's state so
//! host queries never block on the shell; every inbound message updates the
//! mirror first and only then wakes the handlers connected to it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::actor::reactor::{self, Event, ReactorCommand};
use crate::common::collections::HashMap;
use crate::sys::host::{
    AppsView, Host, HostError, MonitorId, Signal, SignalHandlerId, TimerId, WindowId, WindowInfo,
    WorkspaceId,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceState {
    pub id: WorkspaceId,
    #[serde(default)]
    pub windows: Vec<WindowInfo>,
}

/// Everything the shell tells us about itself, in workspace order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ShellState {
    pub workspaces: Vec<WorkspaceState>,
    /// Index into `workspaces`.
    pub active: Option<usize>,
    pub primary_monitor: MonitorId,
    pub focused_window: Option<WindowId>,
    pub overview_shown: bool,
    pub dynamic_workspaces: bool,
}

impl Default for ShellState {
    fn default() -> Self {
        ShellState {
            workspaces: Vec::new(),
            active: None,
            primary_monitor: MonitorId::default(),
            focused_window: None,
            overview_shown: false,
            dynamic_workspaces: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellMessage {
    State(ShellState),
    Overview { shown: bool },
    WorkspaceSwitched { active: usize },
    WindowAdded { workspace: WorkspaceId, window: WindowInfo },
    WindowRemoved { workspace: WorkspaceId, window: WindowId },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellCommand {
    ShowOverview,
    SelectAppsView { view: AppsView },
}

impl ShellState {
    fn active_id(&self) -> Option<WorkspaceId> {
        self.active.and_then(|i| self.workspaces.get(i)).map(|ws| ws.id)
    }

    fn workspace_mut(&mut self, id: WorkspaceId) -> Option<&mut WorkspaceState> {
        self.workspaces.iter_mut().find(|ws| ws.id == id)
    }

    /// One signal per workspace whose window list differs in `next`. A
    /// removal wins over an addition since the removal handler also refreshes
    /// the baseline.
    fn window_changes(&self, next: &ShellState) -> Vec<Signal> {
        next.workspaces
            .iter()
            .filter_map(|ws| {
                let before = self
                    .workspaces
                    .iter()
                    .find(|old| old.id == ws.id)
                    .map_or(&[][..], |old| old.windows.as_slice());
                let removed = before.iter().any(|w| !ws.windows.iter().any(|n| n.id == w.id));
                let added = ws.windows.iter().any(|n| !before.iter().any(|w| w.id == n.id));
                if removed {
                    Some(Signal::WindowRemoved(ws.id))
                } else if added {
                    Some(Signal::WindowAdded(ws.id))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Folds `msg` into the mirror and returns the signals it raises.
    pub fn apply(&mut self, msg: ShellMessage) -> Vec<Signal> {
        match msg {
            ShellMessage::State(state) => {
                let mut signals = self.window_changes(&state);
                if state.active_id() != self.active_id() {
                    signals.push(Signal::WorkspaceSwitched);
                }
                *self = state;
                signals
            }
            ShellMessage::Overview { shown } => {
                self.overview_shown = shown;
                vec![]
            }
            ShellMessage::WorkspaceSwitched { active } => {
                self.active = Some(active);
                vec![Signal::WorkspaceSwitched]
            }
            ShellMessage::WindowAdded { workspace, window } => {
                let Some(ws) = self.workspace_mut(workspace) else {
                    warn!(?workspace, "window added to unknown workspace");
                    return vec![];
                };
                ws.windows.retain(|w| w.id != window.id);
                ws.windows.push(window);
                vec![Signal::WindowAdded(workspace)]
            }
            ShellMessage::WindowRemoved { workspace, window } => {
                let Some(ws) = self.workspace_mut(workspace) else {
                    warn!(?workspace, "window removed from unknown workspace");
                    return vec![];
                };
                ws.windows.retain(|w| w.id != window);
                if self.focused_window == Some(window) {
                    self.focused_window = None;
                }
                vec![Signal::WindowRemoved(workspace)]
            }
        }
    }
}

struct Shared {
    state: ShellState,
    handlers: HashMap<SignalHandlerId, Signal>,
    /// Set by `show_overview` until the shell next reports the overview state.
    overview_requested: bool,
    disconnected: bool,
}

pub struct BridgeHost {
    shared: Arc<Mutex<Shared>>,
    commands: UnboundedSender<ShellCommand>,
    events_tx: reactor::Sender,
    timers: HashMap<TimerId, JoinHandle<()>>,
    next_handler: u64,
    next_timer: u64,
}

impl BridgeHost {
    /// Waits for the shell's first `state` message, then starts the reader
    /// and writer tasks. Must be called from within a tokio runtime.
    pub async fn connect<R, W>(
        reader: R,
        writer: W,
        events_tx: reactor::Sender,
    ) -> anyhow::Result<BridgeHost>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut lines = reader.lines();
        let state = loop {
            let Some(line) = lines.next_line().await? else {
                bail!("shell closed the connection before sending its state");
            };
            match parse_line(&line) {
                Some(ShellMessage::State(state)) => break state,
                Some(msg) => debug!(?msg, "ignoring message received before initial state"),
                None => {}
            }
        };
        info!(
            workspaces = state.workspaces.len(),
            active = ?state.active,
            "connected to shell"
        );

        let shared = Arc::new(Mutex::new(Shared {
            state,
            handlers: HashMap::default(),
            overview_requested: false,
            disconnected: false,
        }));
        let (commands, commands_rx) = unbounded_channel();

        tokio::spawn(read_messages(lines, shared.clone(), events_tx.clone()));
        tokio::spawn(write_commands(writer, commands_rx));

        Ok(BridgeHost {
            shared,
            commands,
            events_tx,
            timers: HashMap::default(),
            next_handler: 1,
            next_timer: 1,
        })
    }

    fn with_state<T>(&self, f: impl FnOnce(&ShellState) -> Result<T, HostError>) -> Result<T, HostError> {
        let shared = self.shared.lock();
        if shared.disconnected {
            return Err(HostError::Disconnected);
        }
        f(&shared.state)
    }

    fn send(&self, cmd: ShellCommand) {
        if self.commands.send(cmd).is_err() {
            warn!(?cmd, "shell writer is gone; dropping command");
        }
    }
}

impl Host for BridgeHost {
    fn active_workspace(&self) -> Result<Option<WorkspaceId>, HostError> {
        self.with_state(|s| Ok(s.active_id()))
    }

    fn workspace_count(&self) -> Result<usize, HostError> {
        self.with_state(|s| Ok(s.workspaces.len()))
    }

    fn workspace_by_index(&self, index: usize) -> Result<WorkspaceId, HostError> {
        self.with_state(|s| {
            s.workspaces.get(index).map(|ws| ws.id).ok_or(HostError::IndexOutOfRange {
                index,
                count: s.workspaces.len(),
            })
        })
    }

    fn list_windows(&self, workspace: WorkspaceId) -> Result<Vec<WindowInfo>, HostError> {
        self.with_state(|s| {
            s.workspaces
                .iter()
                .find(|ws| ws.id == workspace)
                .map(|ws| ws.windows.clone())
                .ok_or(HostError::UnknownWorkspace(workspace))
        })
    }

    fn primary_monitor(&self) -> Result<MonitorId, HostError> {
        self.with_state(|s| Ok(s.primary_monitor))
    }

    fn focused_window(&self) -> Result<Option<WindowId>, HostError> {
        self.with_state(|s| Ok(s.focused_window))
    }

    fn dynamic_workspaces(&self) -> bool { self.shared.lock().state.dynamic_workspaces }

    fn connect(&mut self, signal: Signal) -> Result<SignalHandlerId, HostError> {
        let mut shared = self.shared.lock();
        if shared.disconnected {
            return Err(HostError::Disconnected);
        }
        let id = SignalHandlerId::new(self.next_handler);
        self.next_handler += 1;
        shared.handlers.insert(id, signal);
        trace!(?id, ?signal, "connected");
        Ok(id)
    }

    fn disconnect(&mut self, id: SignalHandlerId) {
        if self.shared.lock().handlers.remove(&id).is_none() {
            debug!(?id, "disconnecting unknown handler");
        }
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        self.timers.retain(|_, task| !task.is_finished());
        let id = TimerId::new(self.next_timer);
        self.next_timer += 1;
        let events_tx = self.events_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            events_tx.send(Event::TimerFired(id));
        });
        self.timers.insert(id, task);
        id
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if let Some(task) = self.timers.remove(&id) {
            task.abort();
        }
    }

    fn overview_shown(&self) -> bool { self.shared.lock().state.overview_shown }

    fn overview_requested(&self) -> bool { self.shared.lock().overview_requested }

    fn show_overview(&mut self) {
        self.send(ShellCommand::ShowOverview);
        self.shared.lock().overview_requested = true;
    }

    fn select_apps_view(&mut self, view: AppsView) {
        self.send(ShellCommand::SelectAppsView { view });
    }
}

impl Drop for BridgeHost {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}

fn parse_line(line: &str) -> Option<ShellMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!("skipping malformed shell message: {e}");
            None
        }
    }
}

async fn read_messages<R>(mut lines: Lines<R>, shared: Arc<Mutex<Shared>>, events_tx: reactor::Sender)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("shell closed the connection");
                break;
            }
            Err(e) => {
                warn!("reading from shell failed: {e}");
                break;
            }
        };
        let Some(msg) = parse_line(&line) else { continue };
        trace!(?msg, "shell message");

        let handlers: Vec<SignalHandlerId> = {
            let mut shared = shared.lock();
            if matches!(msg, ShellMessage::Overview { .. } | ShellMessage::State(_)) {
                shared.overview_requested = false;
            }
            let signals = shared.state.apply(msg);
            let mut ids: Vec<_> = shared
                .handlers
                .iter()
                .filter(|(_, s)| signals.contains(s))
                .map(|(id, _)| *id)
                .collect();
            ids.sort();
            ids
        };
        for id in handlers {
            events_tx.send(Event::Signal(id));
        }
    }

    shared.lock().disconnected = true;
    events_tx.send(Event::Command(ReactorCommand::Shutdown));
}

async fn write_commands<W>(mut writer: W, mut commands: UnboundedReceiver<ShellCommand>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(cmd) = commands.recv().await {
        let mut line = match serde_json::to_string(&cmd) {
            Ok(line) => line,
            Err(e) => {
                warn!(?cmd, "could not encode shell command: {e}");
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        }
        .await
        {
            warn!("writing to shell failed: {e}");
            break;
        }
    }
}
