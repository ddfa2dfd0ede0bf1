//! Shared helpers for logging and timing

mod logger;
mod timer;

pub use logger::init_logger;
pub use timer::{Stopwatch, Timer};
