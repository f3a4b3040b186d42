use thiserror::Error;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("invalid ticket rule: {0}")]
    InvalidRule(String),

    #[error("invalid market pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TicketError>;
