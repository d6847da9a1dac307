//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{DropReason, DropStats};

/// Prints the non-zero drop counters to the log.
pub fn print_drop_statistics(stats: &DropStats) {
    let total = stats.total();
    if total == 0 {
        return;
    }
    info!("Dropped Inputs ({} total):", total);
    for reason in DropReason::iter() {
        let count = stats.get_count(reason);
        if count > 0 {
            info!("   {}: {}", reason.as_str(), count);
        }
    }
}
