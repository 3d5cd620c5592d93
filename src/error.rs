use crate::parse::ParseError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RollError {
    #[error(transparent)]
    SyntaxError(#[from] ParseError),
    #[error("{0}")]
    ValueError(String),
    #[error("too many dice rolled")]
    TooManyRolls,
}

impl RollError {
    pub fn value_error(msg: impl ToString) -> Self {
        Self::ValueError(msg.to_string())
    }
}
