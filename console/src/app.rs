use std::io::{self, BufRead, Write};

use common::games::grid::{MoveOutcome, ObstacleOutcome, Position};
use common::{PlayerId, SessionId, debug_log};

use crate::command::Command;
use crate::session_registry::{RegistryError, SessionRegistry};

const WELCOME: &str = "Welcome to the Grid Adventure Game! Type 'help' for a list of commands.";
const PROMPT: &str = "> ";

const HELP: &[&str] = &[
    "Available commands:",
    "- help: Display this help message.",
    "- quit: Exit the game.",
    "- start session <sessionId> [players] [seed]: Start a new game session.",
    "- show session: List all sessions.",
    "- switch session <sessionId>: Switch to a different game session.",
    "- delete session <sessionId>: Delete a session.",
    "- show: Display the current game board.",
    "- roll dice: Roll the dice.",
    "- move <playerId> <figureId> <dRow> <dCol>: Move a player's figure.",
    "- moveobstacle <row> <col> <dRow> <dCol>: Move an obstacle.",
    "- skip turn: Skip the current player's turn.",
    "- rematch: Restart the game with the same players and board.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Console front end: owns the sessions and turns commands into text.
#[derive(Debug)]
pub struct App {
    registry: SessionRegistry,
}

impl App {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Reads commands line by line until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        writeln!(output, "{}", WELCOME)?;
        let mut lines = input.lines();

        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            let Some(line) = lines.next() else {
                writeln!(output)?;
                return Ok(());
            };
            if self.handle_line(&line?, &mut output)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    pub fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> io::Result<Flow> {
        match line.trim().parse::<Command>() {
            Ok(command) => self.execute(command, output),
            Err(e) => {
                debug_log!("Rejected input '{}': {:?}", line.trim(), e);
                writeln!(output, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute<W: Write>(&mut self, command: Command, output: &mut W) -> io::Result<Flow> {
        match command {
            Command::Empty => {}
            Command::Help => {
                for line in HELP {
                    writeln!(output, "{}", line)?;
                }
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::StartSession { id, players, seed } => {
                self.start_session(id, players, seed, output)?
            }
            Command::ShowSessions => self.show_sessions(output)?,
            Command::SwitchSession(id) => match self.registry.switch(&id) {
                Ok(()) => writeln!(output, "Switched to session: {}", id)?,
                Err(e) => writeln!(output, "{}", e)?,
            },
            Command::DeleteSession(id) => match self.registry.delete(&id) {
                Ok(was_active) => {
                    writeln!(output, "Deleted session: {}", id)?;
                    if was_active {
                        writeln!(output, "No active session now.")?;
                    }
                }
                Err(e) => writeln!(output, "{}", e)?,
            },
            Command::ShowBoard => match self.registry.active() {
                Some(session) => {
                    writeln!(output, "Game Board:")?;
                    write!(output, "{}", session.game().board())?;
                }
                None => writeln!(output, "No active session to display.")?,
            },
            Command::RollDice => match self.registry.active_mut() {
                Some(session) => writeln!(output, "Rolled a {}", session.game_mut().roll_dice())?,
                None => writeln!(output, "No active session to roll dice in.")?,
            },
            Command::Move {
                player,
                figure_id,
                d_row,
                d_col,
            } => self.move_figure(player, figure_id, d_row, d_col, output)?,
            Command::MoveObstacle {
                row,
                col,
                d_row,
                d_col,
            } => self.move_obstacle(row, col, d_row, d_col, output)?,
            Command::SkipTurn => match self.registry.active_mut() {
                Some(session) => {
                    let next = session.game_mut().advance_turn();
                    writeln!(output, "Player {}'s turn!", next)?;
                }
                None => writeln!(output, "No active session to skip a turn in.")?,
            },
            Command::Rematch => match self.registry.rematch() {
                Ok(session) => {
                    writeln!(output, "Rematch setup for session with ID: {}", session.id())?
                }
                Err(RegistryError::NoActiveSession) => {
                    writeln!(output, "No active session to rematch.")?
                }
                Err(e) => writeln!(output, "{}", e)?,
            },
        }
        Ok(Flow::Continue)
    }

    fn start_session<W: Write>(
        &mut self,
        id: SessionId,
        players: Option<usize>,
        seed: Option<u64>,
        output: &mut W,
    ) -> io::Result<()> {
        match self.registry.start(id, players, seed) {
            Ok(session) => writeln!(output, "Started new session with ID: {}", session.id()),
            Err(e) => writeln!(output, "{}", e),
        }
    }

    fn show_sessions<W: Write>(&self, output: &mut W) -> io::Result<()> {
        if self.registry.is_empty() {
            return writeln!(output, "No active sessions.");
        }
        writeln!(output, "Active sessions:")?;
        for id in self.registry.ids() {
            let marker = if self.registry.active_id() == Some(id) { " (active)" } else { "" };
            writeln!(output, "Session ID: {}{}", id, marker)?;
        }
        Ok(())
    }

    fn move_figure<W: Write>(
        &mut self,
        player: char,
        figure_id: u32,
        d_row: i64,
        d_col: i64,
        output: &mut W,
    ) -> io::Result<()> {
        let Some(session) = self.registry.active_mut() else {
            return writeln!(output, "No active session to move in.");
        };
        let game = session.game_mut();

        let Some(handle) = PlayerId::new(player).and_then(|p| game.find_figure(p, figure_id)) else {
            return writeln!(output, "Figure not found.");
        };

        match game.move_figure(handle, d_row, d_col) {
            MoveOutcome::Moved { next_player, .. } => {
                writeln!(output, "Player {}'s turn!", next_player)
            }
            MoveOutcome::Won { winner, .. } => writeln!(output, "Player {} wins!", winner),
            MoveOutcome::NotPossible => writeln!(output, "Move not possible!"),
            MoveOutcome::GameOver => {
                writeln!(output, "The game is over. No more moves can be made.")
            }
            MoveOutcome::UnknownFigure => writeln!(output, "Figure not found."),
        }
    }

    fn move_obstacle<W: Write>(
        &mut self,
        row: i64,
        col: i64,
        d_row: i64,
        d_col: i64,
        output: &mut W,
    ) -> io::Result<()> {
        let Some(session) = self.registry.active_mut() else {
            return writeln!(output, "No active session to move an obstacle in.");
        };

        // Negative coordinates cannot hold an obstacle.
        let Some(from) = Position::from_signed(row, col) else {
            return Ok(());
        };

        match session.game_mut().move_obstacle(from, d_row, d_col) {
            ObstacleOutcome::Moved { from, to } => {
                writeln!(output, "Obstacle moved from {} to {}.", from, to)
            }
            ObstacleOutcome::NotPossible => writeln!(output, "Obstacle move not possible!"),
            ObstacleOutcome::NoObstacle => Ok(()),
        }
    }
}
