pub mod app;
pub mod config;
pub mod constants;
pub mod engine;
pub mod files;
pub mod formats;
pub mod logging;
pub mod ui;
pub mod worker;
