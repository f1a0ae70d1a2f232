// Library target shared by the binary, the integration tests and the criterion
// benchmarks. main.rs only owns terminal setup and key dispatch.

pub mod app;
pub mod card;
pub mod config;
pub mod engine;
pub mod event;
pub mod session;
pub mod speech;
pub mod store;
pub mod ui;
