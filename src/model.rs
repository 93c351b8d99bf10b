pub mod subscription;
pub mod workspace_tracker;

pub use subscription::Subscription;
pub use workspace_tracker::{BindError, WindowRemoval, WindowSignal, WorkspaceTracker};
