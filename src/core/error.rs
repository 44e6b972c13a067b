use thiserror::Error;

#[derive(Error, Debug)]
pub enum MudError {
    #[error("Character not found: {0}")]
    CharacterNotFound(crate::core::types::CharId),

    #[error("Room not found: {0}")]
    RoomNotFound(crate::core::types::RoomId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Evolution file error: {0}")]
    EvolutionFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MudError>;
