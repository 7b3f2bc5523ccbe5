#[macro_use]
extern crate tracing;

pub mod config;
pub mod danmaku;
pub mod error;
pub mod host;
pub mod session;
pub mod utils;
