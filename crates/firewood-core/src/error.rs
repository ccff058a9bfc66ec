use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Reasons a form draft is rejected. Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("enter a location name")]
    MissingName,

    #[error("enter the type of firewood")]
    MissingWoodType,

    #[error("enter a price")]
    MissingPrice,

    #[error("price must be a non-negative number, got \"{0}\"")]
    InvalidPrice(String),

    #[error("enter valid coordinates")]
    InvalidCoordinates,

    #[error("latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),

    #[error("fill in every field")]
    IncompleteContact,
}
