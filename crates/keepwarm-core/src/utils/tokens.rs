//! Human-readable token counts

/// Format a token count for one-line status output.
///
/// Below 1000 the exact count is shown, below 10k one decimal of
/// thousands, above that thousands rounded half to even.
pub fn format_tokens(count: u64) -> String {
    if count < 1_000 {
        count.to_string()
    } else if count < 10_000 {
        format!("{:.1}k", count as f64 / 1_000.0)
    } else {
        format!("{}k", (count as f64 / 1_000.0).round_ties_even() as u64)
    }
}
