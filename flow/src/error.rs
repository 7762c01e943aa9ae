use ageproof_types::ParamsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("flow has shut down")]
    Closed,
}
