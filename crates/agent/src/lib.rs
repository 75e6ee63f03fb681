pub mod cli;
pub mod client;
pub mod collector;
pub mod config;
pub mod executor;
pub mod reporter;
pub mod run;
