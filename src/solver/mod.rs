//! Sequential model-based optimization service.

mod bo;
mod config;

pub use bo::{Bo, BoBuilder};
pub use config::BoConfig;
