use crate::common::config::{Config, LandingSurface};

/// What the shell's workspace layout looks like at the moment of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub workspace_count: usize,
    pub dynamic_workspaces: bool,
}

impl Topology {
    /// With dynamic workspaces the shell always keeps one trailing empty
    /// workspace, so two or fewer means we are on the last real one.
    pub fn on_last_workspace(&self) -> bool {
        self.dynamic_workspaces && self.workspace_count <= 2
    }
}

/// Which preference produced a landing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    CurrentWorkspaceEmpty,
    LastWorkspaceEmpty,
    Startup,
}

/// Picks the landing surface for an emptied workspace, or `None` if the
/// enabled preferences do not cover this topology.
pub fn decide(config: &Config, topology: Topology) -> Option<(Trigger, LandingSurface)> {
    let settings = &config.settings;
    if topology.on_last_workspace() {
        settings
            .on_last_workspace_empty
            .then_some((Trigger::LastWorkspaceEmpty, config.landing.on_last_workspace_empty))
    } else {
        settings
            .on_current_workspace_empty
            .then_some((Trigger::CurrentWorkspaceEmpty, config.landing.on_current_empty))
    }
}
