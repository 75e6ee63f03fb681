pub mod channel;
pub mod config;
pub mod dispatch;
pub mod grpc;
pub mod rest;
pub mod store;
