use tracing::{debug, info, trace, warn};

use crate::actor::reactor::{Reactor, ReactorError, StartupPhase};
use crate::landing_engine::{StartupCheck, Trigger, check_startup};
use crate::sys::host::{Host, HostError, TimerId};

pub struct StartupEventHandler;

impl StartupEventHandler {
    /// Runs the startup check right away and, if the overview is still not up
    /// afterwards, arms the single retry.
    pub fn begin<H: Host>(reactor: &mut Reactor<H>) {
        if !reactor.config.settings.on_startup {
            return;
        }
        match reactor.host.focused_window() {
            Ok(None) => {}
            Ok(Some(window)) => {
                debug!(?window, "a window has focus; skipping startup check");
                return;
            }
            Err(err) => {
                warn!(%err, "could not query focus; skipping startup check");
                return;
            }
        }

        if let Err(err) = Self::check(reactor) {
            warn!(%err, "startup check failed");
        }
        if reactor.host.overview_shown() {
            reactor.startup = StartupPhase::Done;
            return;
        }

        let delay = reactor.config.settings.startup_retry_delay();
        let timer = reactor.host.schedule_once(delay);
        debug!(?timer, ?delay, "overview not shown after startup check; retrying once");
        reactor.startup = StartupPhase::RetryPending(timer);
    }

    pub fn handle_timer_fired<H: Host>(
        reactor: &mut Reactor<H>,
        timer: TimerId,
    ) -> Result<(), ReactorError> {
        match reactor.startup {
            StartupPhase::RetryPending(pending) if pending == timer => {
                reactor.startup = StartupPhase::Done;
                Self::check(reactor)
            }
            _ => {
                trace!(?timer, "ignoring unknown timer");
                Ok(())
            }
        }
    }

    fn check<H: Host>(reactor: &mut Reactor<H>) -> Result<(), ReactorError> {
        let host = &reactor.host;
        let count = host.workspace_count()?;
        let result = check_startup((0..count).map(|index| {
            let workspace = host.workspace_by_index(index)?;
            Ok::<_, HostError>((workspace, host.list_windows(workspace)?))
        }))?;
        let overview_shown = host.overview_shown();

        match result {
            StartupCheck::AllEmpty if !overview_shown => {
                let surface = reactor.config.landing.on_startup;
                reactor.show_landing(Trigger::Startup, surface);
            }
            StartupCheck::AllEmpty => debug!("overview already shown at startup"),
            StartupCheck::Occupied(workspace) => {
                info!(?workspace, "windows open at startup; not showing landing surface")
            }
        }
        Ok(())
    }
}
