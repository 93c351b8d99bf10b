use thiserror::Error;
use tracing::{debug, trace};

use super::Subscription;
use crate::sys::host::{Host, HostError, Signal, SignalHandlerId, WindowInfo, WorkspaceId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("host reports no active workspace")]
    NoActiveWorkspace,
    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSignal {
    Added,
    Removed,
}

/// The bound workspace's windows just before and just after a removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRemoval {
    pub workspace: WorkspaceId,
    pub pre: Vec<WindowInfo>,
    pub post: Vec<WindowInfo>,
}

#[derive(Debug)]
struct Binding {
    workspace: WorkspaceId,
    added: Subscription,
    removed: Subscription,
    /// Window list as of the last add/remove on `workspace`.
    snapshot: Vec<WindowInfo>,
}

/// Follows the active workspace's window-added/window-removed signals.
///
/// At most one workspace is bound at a time. Binding always drops the previous
/// workspace's handlers and snapshot before looking at the new one.
#[derive(Debug, Default)]
pub struct WorkspaceTracker {
    binding: Option<Binding>,
}

impl WorkspaceTracker {
    pub fn new() -> Self { Self::default() }

    pub fn workspace(&self) -> Option<WorkspaceId> { self.binding.as_ref().map(|b| b.workspace) }

    pub fn is_bound(&self) -> bool { self.binding.is_some() }

    pub fn snapshot(&self) -> Option<&[WindowInfo]> {
        self.binding.as_ref().map(|b| b.snapshot.as_slice())
    }

    pub fn bind_to_active_workspace<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<WorkspaceId, BindError> {
        self.unbind(host);

        let workspace = host.active_workspace()?.ok_or(BindError::NoActiveWorkspace)?;
        let snapshot = host.list_windows(workspace)?;
        let added = Subscription::connect(host, Signal::WindowAdded(workspace))?;
        let removed = match Subscription::connect(host, Signal::WindowRemoved(workspace)) {
            Ok(removed) => removed,
            Err(e) => {
                added.release(host);
                return Err(e.into());
            }
        };

        debug!(?workspace, windows = snapshot.len(), "bound to workspace");
        self.binding = Some(Binding { workspace, added, removed, snapshot });
        Ok(workspace)
    }

    /// Disconnects from the bound workspace, if any. Safe to call repeatedly.
    pub fn unbind<H: Host + ?Sized>(&mut self, host: &mut H) -> Option<WorkspaceId> {
        let binding = self.binding.take()?;
        binding.added.release(host);
        binding.removed.release(host);
        trace!(workspace = ?binding.workspace, "unbound from workspace");
        Some(binding.workspace)
    }

    /// Maps a handler id to the signal it belongs to, if it is one of ours.
    pub fn classify(&self, id: SignalHandlerId) -> Option<WindowSignal> {
        let binding = self.binding.as_ref()?;
        if binding.added.id() == id {
            Some(WindowSignal::Added)
        } else if binding.removed.id() == id {
            Some(WindowSignal::Removed)
        } else {
            None
        }
    }

    /// Refreshes the baseline so a later removal is compared against the
    /// workspace as it looks now.
    pub fn on_window_added<H: Host + ?Sized>(&mut self, host: &H) -> Result<(), HostError> {
        let Some(binding) = self.binding.as_mut() else {
            return Ok(());
        };
        binding.snapshot = host.list_windows(binding.workspace)?;
        trace!(windows = binding.snapshot.len(), "window added");
        Ok(())
    }

    /// Swaps the baseline for the current window list and returns both.
    pub fn on_window_removed<H: Host + ?Sized>(
        &mut self,
        host: &H,
    ) -> Result<Option<WindowRemoval>, HostError> {
        let Some(binding) = self.binding.as_mut() else {
            return Ok(None);
        };
        let post = host.list_windows(binding.workspace)?;
        let pre = std::mem::replace(&mut binding.snapshot, post.clone());
        Ok(Some(WindowRemoval { workspace: binding.workspace, pre, post }))
    }
}
