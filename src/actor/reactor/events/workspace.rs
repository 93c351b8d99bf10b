use tracing::info;

use crate::actor::reactor::{Reactor, ReactorError};
use crate::sys::host::Host;

pub struct WorkspaceEventHandler;

impl WorkspaceEventHandler {
    /// Moves the window listeners over to whatever workspace is active now.
    ///
    /// If the host has no active workspace the tracker stays unbound until the
    /// next switch.
    pub fn handle_workspace_switched<H: Host>(reactor: &mut Reactor<H>) -> Result<(), ReactorError> {
        let previous = reactor.tracker.workspace();
        let workspace = reactor.tracker.bind_to_active_workspace(&mut reactor.host)?;
        info!(?previous, ?workspace, "workspace switched");
        Ok(())
    }
}
