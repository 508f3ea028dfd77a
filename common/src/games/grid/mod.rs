mod board;
mod error;
mod figure;
mod game_state;
mod map;
mod player;
mod types;

pub use board::Board;
pub use error::GameError;
pub use figure::Figure;
pub use game_state::{FigureHandle, GridGameState};
pub use map::{load_map_lines, parse_map};
pub use player::Player;
pub use types::{FigureId, Marker, MoveOutcome, ObstacleOutcome, Position};
