use std::path::Path;

use super::error::GameError;

/// Splits map text into rows. Both `\n` and `\r\n` endings are accepted.
pub fn parse_map(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

pub fn load_map_lines(path: &Path) -> Result<Vec<String>, GameError> {
    let content = std::fs::read_to_string(path).map_err(|source| GameError::MapNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_map(&content))
}
