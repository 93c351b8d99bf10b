use tracing::{debug, trace};

use crate::actor::reactor::{Reactor, ReactorError};
use crate::landing_engine::{EvalContext, WindowFilter, decide, evaluate};
use crate::sys::host::Host;

pub struct WindowEventHandler;

impl WindowEventHandler {
    pub fn handle_window_added<H: Host>(reactor: &mut Reactor<H>) -> Result<(), ReactorError> {
        reactor.tracker.on_window_added(&reactor.host)?;
        Ok(())
    }

    pub fn handle_window_removed<H: Host>(reactor: &mut Reactor<H>) -> Result<(), ReactorError> {
        let Some(removal) = reactor.tracker.on_window_removed(&reactor.host)? else {
            trace!("window removed while unbound - ignoring");
            return Ok(());
        };

        let ctx = EvalContext {
            filter: WindowFilter::new(&reactor.config.settings, reactor.host.primary_monitor()?),
            overview_shown: reactor.host.overview_shown() || reactor.host.overview_requested(),
        };
        let evaluation = evaluate(&removal.pre, &removal.post, &ctx);
        debug!(
            workspace = ?removal.workspace,
            before = removal.pre.len(),
            after = removal.post.len(),
            reason = ?evaluation.reason,
            "window removed"
        );
        if !evaluation.trigger {
            return Ok(());
        }

        let topology = reactor.topology()?;
        match decide(&reactor.config, topology) {
            Some((trigger, surface)) => reactor.show_landing(trigger, surface),
            None => debug!(?topology, "desktop is empty but no trigger covers it"),
        }
        Ok(())
    }
}
