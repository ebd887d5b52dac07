//! All possible errors.

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error(transparent)]
    Api(#[from] tc_api::Error),

    #[error(transparent)]
    Turn(#[from] tc_turn::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
