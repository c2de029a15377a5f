use radar_core::{normalize_ticker, RadarError};
use std::path::Path;

/// One ticker per line. Blank lines, `#` comments and lines with inner
/// whitespace are skipped; duplicates are kept.
pub fn parse_universe(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(normalize_ticker)
        .collect()
}

pub fn load_universe(path: impl AsRef<Path>) -> Result<Vec<String>, RadarError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_universe(&contents))
}
