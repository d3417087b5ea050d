use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("staking error: {0}")]
    Staking(#[from] vetme_staking::StakingError),

    #[error("token error: {0}")]
    Token(#[from] vetme_token::TokenError),

    #[error("invalid value: {0}")]
    Types(#[from] vetme_types::TypesError),

    #[error("store error: {0}")]
    Store(#[from] vetme_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("report encoding error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
