use std::fmt;

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub enum PoolError {
    InvalidConfiguration,
    PoolClosed,
    ThreadSpawnFailed(String),
    Panic(String),
    ChannelClosed,
    Timeout,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidConfiguration => {
                write!(f, "cannot construct a thread pool with 0 threads")
            }
            PoolError::PoolClosed => {
                write!(f, "cannot post tasks on a thread pool that has been stopped")
            }
            PoolError::ThreadSpawnFailed(e) => write!(f, "failed to spawn worker thread: {}", e),
            PoolError::Panic(msg) => write!(f, "task panicked: {}", msg),
            PoolError::ChannelClosed => write!(f, "result channel closed without a value"),
            PoolError::Timeout => write!(f, "timed out waiting for task result"),
        }
    }
}

impl std::error::Error for PoolError {}
