//! Progress logging utilities.

use log::info;

/// Logs how many input lines were processed and at what rate.
pub fn log_progress(start_time: std::time::Instant, processed: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        processed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {} lines in {:.2} seconds (~{:.2} lines/sec)",
        processed, elapsed_secs, rate
    );
}
