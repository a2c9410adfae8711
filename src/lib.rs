pub mod account;
pub mod app;
pub mod config;
pub mod error;
pub mod session;
pub mod stats;
pub mod storage;
pub mod task;
pub mod task_store;

pub use error::{Error, Result};
