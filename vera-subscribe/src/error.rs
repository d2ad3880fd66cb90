use thiserror::Error;

/// Errors returned by the subscription registry's lifecycle calls
#[derive(Error, Debug)]
pub enum SubscribeError {
    /// `start` was called while a poll thread is still owned by the registry
    #[error("Poll thread is already running")]
    AlreadyRunning,

    /// `join` was called before `start`, or after the thread was already joined
    #[error("Poll thread has not been started")]
    NotStarted,

    /// The OS refused to spawn the poll thread
    #[error("Failed to spawn poll thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The poll thread unwound, typically from a panicking callback
    #[error("Poll thread panicked")]
    PollThreadPanicked,
}

/// Result type for subscription registry operations
pub type Result<T> = std::result::Result<T, SubscribeError>;
