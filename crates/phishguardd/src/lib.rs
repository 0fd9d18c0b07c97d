//! PhishGuard daemon library.
//!
//! HTTP API over the training core: simulation generation, response
//! judging, attempt recording, and analytics.

pub mod judge;
pub mod prompts;
pub mod routes;
pub mod server;
