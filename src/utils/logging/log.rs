//! Logging utilities
//!
//! This module provides standardized logging functions for operations.

use std::fmt::Display;
use std::time::Duration;

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `target` - What the operation acts on (data source, table, view)
pub fn log_operation_start(operation: &str, target: &dyn Display) {
    log::info!("{operation} {target}");
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `target` - What the operation acted on
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    target: &dyn Display,
    items: usize,
    elapsed: Option<Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!("Successfully {operation} {items} items from {target} in {duration:?}");
    } else {
        log::info!("Successfully {operation} {items} items from {target}");
    }
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `target` - Optional target related to the warning
pub fn log_warning(message: &str, target: Option<&dyn Display>) {
    if let Some(target) = target {
        log::warn!("{message}: {target}");
    } else {
        log::warn!("{message}");
    }
}
