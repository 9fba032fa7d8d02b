//! Environment settings for metric-evolve: the default location of
//! generation logs (under `METRIC_EVOLVE_DIR`) and the timing switch.

pub mod constants;
pub mod env_utils;

pub use constants::*;
pub use env_utils::*;
