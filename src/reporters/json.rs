//! JSON reporter
//!
//! Outputs the full result, including its log, as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use super::Report;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &Report<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
