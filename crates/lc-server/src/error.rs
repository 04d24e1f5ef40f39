use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("contract error: {0}")]
    Contract(#[from] lc_chaincode::ContractError),

    #[error("malformed contract payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;
