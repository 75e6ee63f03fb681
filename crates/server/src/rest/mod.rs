mod agents;
mod commands;
mod error;
mod health;
mod router;

pub use router::{router, AppState};
