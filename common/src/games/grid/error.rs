use std::path::PathBuf;

use crate::PlayerId;

#[derive(Debug)]
pub enum GameError {
    MapNotFound {
        path: PathBuf,
        source: std::io::Error,
    },
    EmptyMap,
    InvalidPlayerCount(usize),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::MapNotFound { path, source } => {
                write!(f, "Map file {} could not be read: {}", path.display(), source)
            }
            GameError::EmptyMap => write!(f, "Map contains no rows"),
            GameError::InvalidPlayerCount(count) => write!(
                f,
                "Invalid player count {}: expected 1 to {}",
                count,
                PlayerId::MAX_PLAYERS
            ),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::MapNotFound { source, .. } => Some(source),
            _ => None,
        }
    }
}
