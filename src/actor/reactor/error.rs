use thiserror::Error;

use crate::model::BindError;
use crate::sys::host::HostError;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Host query failed: {0}")]
    Host(#[from] HostError),
    #[error("Workspace bind failed: {0}")]
    Bind(#[from] BindError),
}
