use thiserror::Error;

/// Raised when an alignment keyword is not one of left/center/right.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("unrecognized alignment: {0}")]
pub struct ParseAlignError(pub String);
