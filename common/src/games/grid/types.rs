use std::fmt;

use crate::PlayerId;

pub type FigureId = u32;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Marker {
    Plain,
    Obstacle,
    Target,
    /// Cell occupied by a figure of this player.
    Figure(PlayerId),
    /// Any other character found in the map file, kept verbatim.
    Other(char),
}

impl Marker {
    pub const PLAIN: char = 'P';
    pub const OBSTACLE: char = 'O';
    pub const TARGET: char = 'T';

    pub fn from_char(c: char) -> Self {
        match c {
            Self::PLAIN => Marker::Plain,
            Self::OBSTACLE => Marker::Obstacle,
            Self::TARGET => Marker::Target,
            _ => PlayerId::new(c).map_or(Marker::Other(c), Marker::Figure),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Marker::Plain => Self::PLAIN,
            Marker::Obstacle => Self::OBSTACLE,
            Marker::Target => Self::TARGET,
            Marker::Figure(player) => player.letter(),
            Marker::Other(c) => c,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Signed offset; `None` when the result would fall above or left of the board.
    pub fn offset(self, d_row: i64, d_col: i64) -> Option<Self> {
        let row = isize::try_from(d_row).ok()?;
        let col = isize::try_from(d_col).ok()?;
        Some(Self {
            row: self.row.checked_add_signed(row)?,
            col: self.col.checked_add_signed(col)?,
        })
    }

    /// Converts signed user coordinates; negatives have no position.
    pub fn from_signed(row: i64, col: i64) -> Option<Self> {
        Some(Self {
            row: usize::try_from(row).ok()?,
            col: usize::try_from(col).ok()?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Moved {
        from: Position,
        to: Position,
        next_player: PlayerId,
    },
    Won {
        winner: PlayerId,
        at: Position,
    },
    NotPossible,
    GameOver,
    UnknownFigure,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObstacleOutcome {
    Moved { from: Position, to: Position },
    NotPossible,
    /// Source cell holds no obstacle; nothing happens.
    NoObstacle,
}
