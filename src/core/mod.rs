pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::Clock;
pub use config::GameConfig;
pub use error::{MudError, Result};
