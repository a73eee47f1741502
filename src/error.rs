pub type LayerKitResult<T> = Result<T, LayerKitError>;

#[derive(thiserror::Error, Debug)]
pub enum LayerKitError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("ambiguity error: {0}")]
    Ambiguity(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerKitError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn missing_dependency(msg: impl Into<String>) -> Self {
        Self::MissingDependency(msg.into())
    }

    pub fn ambiguity(msg: impl Into<String>) -> Self {
        Self::Ambiguity(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
