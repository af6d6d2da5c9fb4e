use thiserror::Error;

/// Errors surfaced by the workbench core.
///
/// The dock controller itself never propagates these to callers; failed
/// operations degrade to logged no-ops. The CLI and the persistence layer
/// use them where a hard failure is the right answer.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("no route matches '{0}'")]
    RouteNotFound(String),

    #[error("no usable state directory (set LEDGERDOCK_STATE_DIR)")]
    StateDirUnavailable,

    #[error("no usable config directory")]
    ConfigDirUnavailable,

    #[error("snapshot rejected: {0}")]
    InvalidSnapshot(&'static str),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;
