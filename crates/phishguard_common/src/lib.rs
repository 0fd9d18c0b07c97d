//! PhishGuard Common - Shared core for the PhishGuard training backend
//!
//! Domain types, the embedded entity store, the training progression engine,
//! analytics rollups, and the generative-AI client. Both the daemon and the
//! control CLI build on this crate.

pub mod analytics;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod genai;
pub mod progression;
pub mod seed;
pub mod store;
pub mod types;

pub use config::GuardConfig;
pub use error::GuardError;
pub use genai::GenAiClient;
pub use store::GuardStore;
pub use types::*;
