use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("model `{0}` is already registered")]
    AlreadyRegistered(&'static str),

    #[error("model `{0}` is not registered")]
    NotRegistered(String),

    #[error("`{field}` is not a filter of `{model}`")]
    UnknownFilter { model: &'static str, field: String },
}
