use std::path::Path;

use crate::analysis::BassReport;
use crate::error::BassError;

/// Serialize a report to a JSON string.
pub fn report_to_json(report: &BassReport, pretty: bool) -> Result<String, BassError> {
    let content = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(content)
}

/// Write a report to a JSON file.
pub fn write_json(
    report: &BassReport,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), BassError> {
    std::fs::write(path.as_ref(), report_to_json(report, pretty)?)?;
    Ok(())
}

/// Parse a report from a JSON string. The embedded series is validated.
pub fn report_from_json(content: &str) -> Result<BassReport, BassError> {
    Ok(serde_json::from_str(content)?)
}

/// Read a report previously written with [`write_json`].
pub fn read_json(path: impl AsRef<Path>) -> Result<BassReport, BassError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    report_from_json(&content)
}
