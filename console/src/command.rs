use std::fmt;
use std::str::FromStr;

use common::SessionId;
use common::games::grid::FigureId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    Quit,
    StartSession {
        id: SessionId,
        players: Option<usize>,
        seed: Option<u64>,
    },
    ShowSessions,
    SwitchSession(SessionId),
    DeleteSession(SessionId),
    ShowBoard,
    RollDice,
    Move {
        player: char,
        figure_id: FigureId,
        d_row: i64,
        d_col: i64,
    },
    MoveObstacle {
        row: i64,
        col: i64,
        d_row: i64,
        d_col: i64,
    },
    SkipTurn,
    Rematch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    Usage(&'static str),
    InvalidNumber {
        usage: &'static str,
        value: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(_) => write!(
                f,
                "Unknown command. Type 'help' to see the list of available commands."
            ),
            CommandError::Usage(usage) => write!(f, "Invalid command. Use '{}'.", usage),
            CommandError::InvalidNumber { usage, value } => {
                write!(f, "'{}' is not a valid number. Use '{}'.", value, usage)
            }
        }
    }
}

impl std::error::Error for CommandError {}

const START_USAGE: &str = "start session <sessionId> [players] [seed]";
const SWITCH_USAGE: &str = "switch session <sessionId>";
const DELETE_USAGE: &str = "delete session <sessionId>";
const ROLL_USAGE: &str = "roll dice";
const MOVE_USAGE: &str = "move <playerId> <figureId> <dRow> <dCol>";
const OBSTACLE_USAGE: &str = "moveobstacle <row> <col> <dRow> <dCol>";
const SKIP_USAGE: &str = "skip turn";

fn parse_number<T: FromStr>(value: &str, usage: &'static str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        usage,
        value: value.to_string(),
    })
}

fn session_id(parts: &[&str], usage: &'static str) -> Result<SessionId, CommandError> {
    match parts {
        [_, "session", id] => Ok(SessionId::from(*id)),
        _ => Err(CommandError::Usage(usage)),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return Ok(Command::Empty);
        };

        match first.to_lowercase().as_str() {
            "help" => Ok(Command::Help),
            "quit" => Ok(Command::Quit),
            "start" => match parts.as_slice() {
                [_, "session", id, rest @ ..] if rest.len() <= 2 => Ok(Command::StartSession {
                    id: SessionId::from(*id),
                    players: rest.first().map(|p| parse_number(p, START_USAGE)).transpose()?,
                    seed: rest.get(1).map(|s| parse_number(s, START_USAGE)).transpose()?,
                }),
                _ => Err(CommandError::Usage(START_USAGE)),
            },
            "show" => match parts.get(1) {
                Some(&"session") | Some(&"sessions") => Ok(Command::ShowSessions),
                _ => Ok(Command::ShowBoard),
            },
            "switch" => session_id(&parts, SWITCH_USAGE).map(Command::SwitchSession),
            "delete" => session_id(&parts, DELETE_USAGE).map(Command::DeleteSession),
            "roll" => match parts.as_slice() {
                [_, "dice"] => Ok(Command::RollDice),
                _ => Err(CommandError::Usage(ROLL_USAGE)),
            },
            "move" => match parts.as_slice() {
                [_, player, figure_id, d_row, d_col] => {
                    let mut letters = player.chars();
                    let (Some(player), None) = (letters.next(), letters.next()) else {
                        return Err(CommandError::Usage(MOVE_USAGE));
                    };
                    Ok(Command::Move {
                        player,
                        figure_id: parse_number(figure_id, MOVE_USAGE)?,
                        d_row: parse_number(d_row, MOVE_USAGE)?,
                        d_col: parse_number(d_col, MOVE_USAGE)?,
                    })
                }
                _ => Err(CommandError::Usage(MOVE_USAGE)),
            },
            "moveobstacle" => match parts.as_slice() {
                [_, row, col, d_row, d_col] => Ok(Command::MoveObstacle {
                    row: parse_number(row, OBSTACLE_USAGE)?,
                    col: parse_number(col, OBSTACLE_USAGE)?,
                    d_row: parse_number(d_row, OBSTACLE_USAGE)?,
                    d_col: parse_number(d_col, OBSTACLE_USAGE)?,
                }),
                _ => Err(CommandError::Usage(OBSTACLE_USAGE)),
            },
            "skip" => match parts.as_slice() {
                [_, "turn"] => Ok(Command::SkipTurn),
                _ => Err(CommandError::Usage(SKIP_USAGE)),
            },
            "rematch" => Ok(Command::Rematch),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
