use thiserror::Error;

/// Fatal per-fight parsing failures. Either the document shape broke a
/// structural assumption, or a captured value failed its expected lexical
/// shape. Both abort the affected fight only; the batch keeps going.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("page structure: {0}")]
    Structure(String),

    #[error("field format: {0}")]
    Format(String),
}

impl ParseError {
    pub fn structure(msg: impl Into<String>) -> Self {
        ParseError::Structure(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        ParseError::Format(msg.into())
    }
}
