//! The Reactor turns shell signals into landing decisions.
//!
//! It owns the host, the workspace tracker and the startup sequencer, and
//! handles one event at a time to completion. All host access happens on the
//! reactor's task, so no state here needs locking.

mod error;
mod events;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ReactorError;
use events::startup::StartupEventHandler;
use events::window::WindowEventHandler;
use events::workspace::WorkspaceEventHandler;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::common::config::{Config, LandingSurface};
use crate::landing_engine::{Topology, Trigger};
use crate::model::{Subscription, WindowSignal, WorkspaceTracker};
use crate::sys::host::{AppsView, Host, Signal, SignalHandlerId, TimerId};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Debug)]
pub enum Event {
    /// A signal the reactor connected to was emitted. Signals carry no data;
    /// the handler re-queries the host.
    Signal(SignalHandlerId),
    /// A timer scheduled through the host expired.
    TimerFired(TimerId),
    /// The configuration file changed on disk.
    ConfigUpdated(Config),
    Command(ReactorCommand),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReactorCommand {
    Activate,
    Deactivate,
    /// Deactivate and stop the run loop.
    Shutdown,
    /// Log the current tracking state.
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartupPhase {
    Idle,
    RetryPending(TimerId),
    Done,
}

pub struct Reactor<H: Host> {
    config: Config,
    host: H,
    tracker: WorkspaceTracker,
    workspace_switched: Option<Subscription>,
    startup: StartupPhase,
    active: bool,
}

impl<H: Host> Reactor<H> {
    pub fn new(config: Config, host: H) -> Reactor<H> {
        Reactor {
            config,
            host,
            tracker: WorkspaceTracker::new(),
            workspace_switched: None,
            startup: StartupPhase::Idle,
            active: false,
        }
    }

    pub fn host(&self) -> &H { &self.host }

    pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    pub fn config(&self) -> &Config { &self.config }

    pub fn is_active(&self) -> bool { self.active }

    /// Activates, then handles events until the channel closes or a
    /// `Shutdown` command arrives. Always deactivates before returning.
    pub async fn run(mut self, mut events: Receiver) {
        self.activate();
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            let shutdown = matches!(event, Event::Command(ReactorCommand::Shutdown));
            self.handle_event(event);
            if shutdown {
                break;
            }
        }
        self.deactivate();
    }

    /// Starts following workspace switches, binds to the active workspace and
    /// runs the startup check if enabled.
    pub fn activate(&mut self) {
        if self.active {
            debug!("already active");
            return;
        }
        self.active = true;
        info!("activating");

        match Subscription::connect(&mut self.host, Signal::WorkspaceSwitched) {
            Ok(sub) => self.workspace_switched = Some(sub),
            Err(err) => warn!(%err, "could not subscribe to workspace switches"),
        }
        if let Err(err) = self.tracker.bind_to_active_workspace(&mut self.host) {
            warn!(%err, "could not bind to the active workspace; waiting for a switch");
        }
        StartupEventHandler::begin(self);
    }

    /// Disconnects every handler and cancels a pending startup retry. Safe to
    /// call when already inactive.
    pub fn deactivate(&mut self) {
        if let Some(sub) = self.workspace_switched.take() {
            sub.release(&mut self.host);
        }
        self.tracker.unbind(&mut self.host);
        if let StartupPhase::RetryPending(timer) =
            std::mem::replace(&mut self.startup, StartupPhase::Idle)
        {
            self.host.cancel_timer(timer);
        }
        if std::mem::replace(&mut self.active, false) {
            info!("deactivated");
        }
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::Signal(..) | Event::TimerFired(..) => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    /// Handles one event. Failures are logged and dropped so that a bad cycle
    /// never stops later events from being processed.
    #[instrument(name = "reactor::handle_event", skip(self), fields(event=?event))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        let result = match event {
            Event::Signal(id) => self.handle_signal(id),
            Event::TimerFired(timer) => StartupEventHandler::handle_timer_fired(self, timer),
            Event::ConfigUpdated(config) => {
                info!("config updated");
                self.config = config;
                Ok(())
            }
            Event::Command(cmd) => {
                self.handle_command(cmd);
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!(%err, "event handling failed; no action this cycle");
        }
    }

    fn handle_signal(&mut self, id: SignalHandlerId) -> Result<(), ReactorError> {
        if !self.active {
            trace!(?id, "inactive - ignoring signal");
            return Ok(());
        }
        if self.workspace_switched.as_ref().is_some_and(|sub| sub.id() == id) {
            return WorkspaceEventHandler::handle_workspace_switched(self);
        }
        match self.tracker.classify(id) {
            Some(WindowSignal::Added) => WindowEventHandler::handle_window_added(self),
            Some(WindowSignal::Removed) => WindowEventHandler::handle_window_removed(self),
            None => {
                trace!(?id, "signal from a handler we no longer own - ignoring");
                Ok(())
            }
        }
    }

    fn handle_command(&mut self, cmd: ReactorCommand) {
        match cmd {
            ReactorCommand::Activate => self.activate(),
            ReactorCommand::Deactivate | ReactorCommand::Shutdown => self.deactivate(),
            ReactorCommand::Debug => info!(
                active = self.active,
                workspace = ?self.tracker.workspace(),
                snapshot = ?self.tracker.snapshot(),
                startup = ?self.startup,
                "reactor state"
            ),
        }
    }

    fn topology(&self) -> Result<Topology, ReactorError> {
        Ok(Topology {
            workspace_count: self.host.workspace_count()?,
            dynamic_workspaces: self.host.dynamic_workspaces(),
        })
    }

    fn show_landing(&mut self, trigger: Trigger, surface: LandingSurface) {
        info!(?trigger, %surface, "showing landing surface");
        self.host.show_overview();
        match surface {
            LandingSurface::Overview => {}
            LandingSurface::Applications => self.host.select_apps_view(AppsView::All),
            LandingSurface::Frequent => self.host.select_apps_view(AppsView::Frequent),
        }
    }
}

impl<H: Host> Drop for Reactor<H> {
    fn drop(&mut self) { self.deactivate(); }
}
