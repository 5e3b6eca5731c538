//! Logging, progress and console summaries
//!
//! Shared helpers so every stage reports in the same format.

pub mod console;
pub mod log;
pub mod progress;

pub use console::{format_ranking, print_ranking};
pub use log::{log_operation_complete, log_operation_start, log_warning};
pub use progress::{create_main_progress_bar, finish_progress_bar};
