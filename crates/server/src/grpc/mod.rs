mod command_stream;
mod register;
mod report_result;
mod service;
mod telemetry;

pub use service::FleetServiceImpl;
