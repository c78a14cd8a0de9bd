pub mod config;
pub mod domain;
pub mod error;
pub mod flow;
pub mod infra;
pub mod session;
pub mod timer;
