use thiserror::Error;

/// Errors produced by the learning core and the smartcab world
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid value for `{name}`: {value} is not in the interval {interval}")]
    OutOfInterval {
        name: &'static str,
        value: f32,
        interval: String,
    },

    #[error("invalid decay schedule: {0}")]
    InvalidDecay(String),

    #[error("percept is missing the `{0}` field")]
    MissingPercept(&'static str),

    #[error("invalid value '{value}' for percept field `{field}`")]
    InvalidPercept { field: &'static str, value: String },

    #[error("invalid action '{0}' (expected one of: none, forward, left, right)")]
    InvalidAction(String),

    #[error("reward must be finite, got {0}")]
    NonFiniteReward(f32),

    #[error("invalid world layout: {0}")]
    InvalidWorld(String),
}

pub type Result<T> = std::result::Result<T, Error>;
