/// The Result type for tuichase.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error("io error")]
    StdIOError(#[from] std::io::Error),

    #[error("log error")]
    LogError(#[from] log::SetLoggerError),

    #[error("{source:?}")]
    AnyhowError {
        #[from]
        source: anyhow::Error,
    },

    #[error("{source}")]
    EngineError {
        #[from]
        source: crate::engine::error::EngineError,
    },
}
