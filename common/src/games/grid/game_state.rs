use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::games::SessionRng;
use crate::{PlayerId, debug_log, log, warn_log};

use super::board::Board;
use super::error::GameError;
use super::figure::Figure;
use super::map::load_map_lines;
use super::player::Player;
use super::types::{FigureId, Marker, MoveOutcome, ObstacleOutcome, Position};

static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Reference to a figure inside the game that issued it via `find_figure`.
/// Any other game, including a rematch of the same session, rejects it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FigureHandle {
    game_id: u64,
    player_index: usize,
    figure_index: usize,
}

/// Turn-based state of one grid game.
///
/// Figures are mirrored on the board as their player's letter. Every
/// operation either applies completely or leaves the state untouched.
#[derive(Debug)]
pub struct GridGameState {
    game_id: u64,
    board: Board,
    players: Vec<Player>,
    current_player_index: usize,
    winner: Option<PlayerId>,
    rng: SessionRng,
}

impl GridGameState {
    /// Builds a game from map rows. Player `a` through the `num_players`-th
    /// letter each get one figure per cell carrying their letter.
    pub fn new<S: AsRef<str>>(
        lines: &[S],
        num_players: usize,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        if num_players == 0 || num_players > PlayerId::MAX_PLAYERS {
            return Err(GameError::InvalidPlayerCount(num_players));
        }

        let board = Board::from_lines(lines)?;
        let players = Self::create_players(&board, num_players);
        let rng = SessionRng::from_optional_seed(seed);

        log!(
            "New grid game: {}x{} board, {} players, {} figures, seed {}",
            board.height(),
            board.width(),
            players.len(),
            players.iter().map(|p| p.figures().len()).sum::<usize>(),
            rng.seed()
        );
        if board.count(Marker::Target) == 0 {
            warn_log!("Map has no target cell; nobody can win this game");
        }

        Ok(Self {
            game_id: NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed),
            board,
            players,
            current_player_index: 0,
            winner: None,
            rng,
        })
    }

    pub fn from_map_file(
        path: &Path,
        num_players: usize,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        if num_players == 0 || num_players > PlayerId::MAX_PLAYERS {
            return Err(GameError::InvalidPlayerCount(num_players));
        }
        let lines = load_map_lines(path)?;
        Self::new(&lines, num_players, seed)
    }

    // Player-major, then row-major: all of `a`'s figures are numbered before `b`'s.
    fn create_players(board: &Board, num_players: usize) -> Vec<Player> {
        let mut next_figure_id: FigureId = 1;

        (0..num_players)
            .filter_map(PlayerId::from_index)
            .map(|player_id| {
                let mut player = Player::new(player_id);
                for (pos, marker) in board.cells() {
                    if marker == Marker::Figure(player_id) {
                        player.add_figure(Figure::new(player_id, next_figure_id, pos));
                        next_figure_id += 1;
                    }
                }
                player
            })
            .collect()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.and_then(|id| self.player(id))
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.players.iter().flat_map(|p| p.figures().iter())
    }

    pub fn figure(&self, handle: FigureHandle) -> Option<&Figure> {
        if handle.game_id != self.game_id {
            return None;
        }
        self.players
            .get(handle.player_index)?
            .figures()
            .get(handle.figure_index)
    }

    /// `None` means no such figure; callers treat it as bad input.
    pub fn find_figure(&self, player: PlayerId, figure_id: FigureId) -> Option<FigureHandle> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.id() == player)
            .find_map(|(player_index, p)| {
                p.figure_index(figure_id).map(|figure_index| FigureHandle {
                    game_id: self.game_id,
                    player_index,
                    figure_index,
                })
            })
    }

    pub fn roll_dice(&mut self) -> u32 {
        self.rng.roll_dice()
    }

    /// Moves a figure by the given delta.
    ///
    /// The destination must be on the board and not an obstacle. Landing on
    /// a target wins the game for the figure's owner; the target stays
    /// visible and the turn does not pass. Any other move stamps the owner's
    /// letter on the destination and passes the turn. The vacated cell always
    /// becomes plain.
    pub fn move_figure(&mut self, handle: FigureHandle, d_row: i64, d_col: i64) -> MoveOutcome {
        if self.is_over() {
            debug_log!("Move rejected: game is over");
            return MoveOutcome::GameOver;
        }

        let Some(figure) = self.figure(handle) else {
            warn_log!("Move rejected: handle {:?} does not belong to this game", handle);
            return MoveOutcome::UnknownFigure;
        };
        let player = figure.player();
        let from = figure.position();

        let Some((to, destination)) = self.legal_destination(from, d_row, d_col) else {
            debug_log!(
                "Move rejected: figure {}/{} at {} by ({}, {})",
                player,
                figure.id(),
                from,
                d_row,
                d_col
            );
            return MoveOutcome::NotPossible;
        };

        self.board.set_cell(from, Marker::Plain);
        self.players[handle.player_index].figures_mut()[handle.figure_index].move_to(to);

        if destination == Marker::Target {
            self.winner = Some(player);
            log!("Player {} wins by reaching {}", player, to);
            return MoveOutcome::Won { winner: player, at: to };
        }

        self.board.set_cell(to, Marker::Figure(player));
        let next_player = self.advance_turn();
        MoveOutcome::Moved {
            from,
            to,
            next_player,
        }
    }

    fn legal_destination(
        &self,
        from: Position,
        d_row: i64,
        d_col: i64,
    ) -> Option<(Position, Marker)> {
        let to = from.offset(d_row, d_col)?;
        match self.board.cell_at(to)? {
            Marker::Obstacle => None,
            marker => Some((to, marker)),
        }
    }

    /// Pushes the obstacle at `from` onto a plain cell. Does not use a turn
    /// and is allowed after the game is over.
    pub fn move_obstacle(&mut self, from: Position, d_row: i64, d_col: i64) -> ObstacleOutcome {
        if self.board.cell_at(from) != Some(Marker::Obstacle) {
            return ObstacleOutcome::NoObstacle;
        }

        let target = from
            .offset(d_row, d_col)
            .filter(|&to| self.board.cell_at(to) == Some(Marker::Plain));

        match target {
            Some(to) => {
                self.board.set_cell(from, Marker::Plain);
                self.board.set_cell(to, Marker::Obstacle);
                debug_log!("Obstacle moved from {} to {}", from, to);
                ObstacleOutcome::Moved { from, to }
            }
            None => {
                debug_log!("Obstacle move rejected: {} by ({}, {})", from, d_row, d_col);
                ObstacleOutcome::NotPossible
            }
        }
    }

    /// Passes the turn to the next player, wrapping around. Not gated on the
    /// game being over.
    pub fn advance_turn(&mut self) -> PlayerId {
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        let current = self.current_player().id();
        debug_log!("Player {}'s turn", current);
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_game(lines: &[&str], players: usize) -> GridGameState {
        GridGameState::new(lines, players, Some(42)).unwrap()
    }

    fn player(letter: char) -> PlayerId {
        PlayerId::new(letter).unwrap()
    }

    fn cell(game: &GridGameState, row: usize, col: usize) -> char {
        game.board().cell_at(Position::new(row, col)).unwrap().to_char()
    }

    fn handle(game: &GridGameState, letter: char, id: FigureId) -> FigureHandle {
        game.find_figure(player(letter), id).unwrap()
    }

    fn assert_board_matches_figures(game: &GridGameState) {
        for figure in game.figures() {
            if game.winner().is_some_and(|w| w.id() == figure.player()) {
                continue;
            }
            assert_eq!(
                game.board().cell_at(figure.position()),
                Some(Marker::Figure(figure.player())),
                "figure {} not shown on board",
                figure.id()
            );
        }
    }

    #[test]
    fn test_invalid_player_count() {
        assert!(matches!(
            GridGameState::new(&["P"], 0, None),
            Err(GameError::InvalidPlayerCount(0))
        ));
        assert!(matches!(
            GridGameState::new(&["P"], 27, None),
            Err(GameError::InvalidPlayerCount(27))
        ));
    }

    #[test]
    fn test_missing_map_file() {
        let path = std::env::temp_dir().join("grid_map_that_does_not_exist_7f3a.txt");
        let result = GridGameState::from_map_file(&path, 2, None);
        assert!(matches!(result, Err(GameError::MapNotFound { .. })));
    }

    #[test]
    fn test_figure_ids_are_player_major() {
        let game = create_game(&["bPa", "aPb"], 2);
        let figures_of = |letter| -> Vec<_> {
            let figures = game.player(player(letter)).unwrap().figures();
            figures.iter().map(|f| (f.id(), f.position())).collect()
        };
        let a = figures_of('a');
        let b = figures_of('b');

        assert_eq!(a, vec![(1, Position::new(0, 2)), (2, Position::new(1, 0))]);
        assert_eq!(b, vec![(3, Position::new(0, 0)), (4, Position::new(1, 2))]);
    }

    #[test]
    fn test_letters_beyond_player_count_get_no_figures() {
        let game = create_game(&["aPc"], 2);
        assert_eq!(game.figures().count(), 1);
        assert!(game.find_figure(player('c'), 2).is_none());
    }

    #[test]
    fn test_find_figure_requires_matching_player() {
        let game = create_game(&["aPb"], 2);
        assert!(game.find_figure(player('a'), 1).is_some());
        assert!(game.find_figure(player('a'), 2).is_none());
        assert!(game.find_figure(player('b'), 2).is_some());
        assert!(game.find_figure(player('c'), 1).is_none());
    }

    #[test]
    fn test_handle_from_another_game_is_unknown() {
        let small = create_game(&["aP"], 1);
        let foreign = handle(&small, 'a', 1);
        let mut game = create_game(&["PPa"], 1);
        let before = game.board().clone();

        assert!(game.figure(foreign).is_none());
        assert_eq!(game.move_figure(foreign, 0, -1), MoveOutcome::UnknownFigure);
        assert_eq!(game.board(), &before);
        assert_eq!(game.figure(handle(&game, 'a', 1)).unwrap().position(), Position::new(0, 2));
        assert_eq!(game.current_player().id(), player('a'));
    }

    #[test]
    fn test_handle_rejected_after_rebuild_from_same_map() {
        let lines = ["aPT", "bPP"];
        let first = create_game(&lines, 2);
        let old = handle(&first, 'b', 2);
        let mut rebuilt = create_game(&lines, 2);

        assert_eq!(rebuilt.move_figure(old, 0, 1), MoveOutcome::UnknownFigure);
        assert_eq!(rebuilt.board().to_string(), "a P T\nb P P\n");
    }

    #[test]
    fn test_map_without_target_still_plays() {
        let mut game = create_game(&["aPP"], 1);
        assert_eq!(game.board().count(Marker::Target), 0);
        let a1 = handle(&game, 'a', 1);
        assert!(matches!(game.move_figure(a1, 0, 2), MoveOutcome::Moved { .. }));
        assert!(!game.is_over());
    }

    #[test]
    fn test_simple_move() {
        let mut game = create_game(&["aPO", "PPP", "PPT"], 1);
        let a1 = handle(&game, 'a', 1);

        let outcome = game.move_figure(a1, 0, 1);

        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Position::new(0, 0),
                to: Position::new(0, 1),
                next_player: player('a'),
            }
        );
        assert_eq!(game.figure(a1).unwrap().position(), Position::new(0, 1));
        assert_eq!(cell(&game, 0, 0), 'P');
        assert_eq!(cell(&game, 0, 1), 'a');
        assert_board_matches_figures(&game);
    }

    #[test]
    fn test_move_into_obstacle_is_rejected() {
        let mut game = create_game(&["aPO", "PPP", "PPT"], 1);
        let a1 = handle(&game, 'a', 1);
        assert!(matches!(game.move_figure(a1, 0, 1), MoveOutcome::Moved { .. }));

        let before = game.board().clone();
        assert_eq!(game.move_figure(a1, 0, 1), MoveOutcome::NotPossible);
        assert_eq!(game.board(), &before);
        assert_eq!(game.figure(a1).unwrap().position(), Position::new(0, 1));
    }

    #[test]
    fn test_move_off_board_is_rejected() {
        let mut game = create_game(&["aP", "PP"], 2);
        let a1 = handle(&game, 'a', 1);
        let before = game.board().clone();

        assert_eq!(game.move_figure(a1, -1, 0), MoveOutcome::NotPossible);
        assert_eq!(game.move_figure(a1, 0, 2), MoveOutcome::NotPossible);
        assert_eq!(game.move_figure(a1, i64::MAX, 0), MoveOutcome::NotPossible);
        assert_eq!(game.board(), &before);
        assert_eq!(game.current_player().id(), player('a'));
    }

    #[test]
    fn test_ragged_rows_use_their_own_width() {
        let mut game = create_game(&["aPPP", "PP"], 1);
        let a1 = handle(&game, 'a', 1);
        assert!(matches!(game.move_figure(a1, 0, 3), MoveOutcome::Moved { .. }));
        assert_eq!(game.move_figure(a1, 1, 0), MoveOutcome::NotPossible);
    }

    #[test]
    fn test_winning_move_keeps_target_visible() {
        let mut game = create_game(&["aPO", "PPP", "PPT"], 2);
        let a1 = handle(&game, 'a', 1);

        let outcome = game.move_figure(a1, 2, 2);

        assert_eq!(
            outcome,
            MoveOutcome::Won {
                winner: player('a'),
                at: Position::new(2, 2)
            }
        );
        assert!(game.is_over());
        assert_eq!(game.winner().map(Player::id), Some(player('a')));
        assert_eq!(game.figure(a1).unwrap().position(), Position::new(2, 2));
        assert_eq!(cell(&game, 0, 0), 'P');
        assert_eq!(cell(&game, 2, 2), 'T');
        assert_eq!(game.current_player().id(), player('a'));
    }

    #[test]
    fn test_moves_after_game_over_change_nothing() {
        let mut game = create_game(&["aPT", "bPP"], 2);
        let a1 = handle(&game, 'a', 1);
        let b2 = handle(&game, 'b', 2);
        assert!(matches!(game.move_figure(a1, 0, 2), MoveOutcome::Won { .. }));

        let board_before = game.board().clone();
        let positions_before: Vec<_> = game.figures().map(Figure::position).collect();

        assert_eq!(game.move_figure(b2, 0, 1), MoveOutcome::GameOver);
        assert_eq!(game.move_figure(a1, 0, -1), MoveOutcome::GameOver);

        assert_eq!(game.board(), &board_before);
        let positions_after: Vec<_> = game.figures().map(Figure::position).collect();
        assert_eq!(positions_after, positions_before);
        assert_eq!(game.winner().map(Player::id), Some(player('a')));
    }

    #[test]
    fn test_moving_onto_another_figure_overwrites_marker() {
        let mut game = create_game(&["abP"], 2);
        let a1 = handle(&game, 'a', 1);

        assert!(matches!(game.move_figure(a1, 0, 1), MoveOutcome::Moved { .. }));
        assert_eq!(cell(&game, 0, 0), 'P');
        assert_eq!(cell(&game, 0, 1), 'a');
        // The hidden figure keeps its own position.
        assert_eq!(
            game.figure(handle(&game, 'b', 2)).unwrap().position(),
            Position::new(0, 1)
        );
    }

    #[test]
    fn test_vacated_cell_always_becomes_plain() {
        let mut game = create_game(&["aP"], 1);
        let a1 = handle(&game, 'a', 1);
        game.board.set_cell(Position::new(0, 0), Marker::Other('#'));

        assert!(matches!(game.move_figure(a1, 0, 1), MoveOutcome::Moved { .. }));
        assert_eq!(cell(&game, 0, 0), 'P');
    }

    #[test]
    fn test_turn_cycles_after_player_count_moves() {
        let mut game = create_game(&["aPPPP", "bPPPP", "cPPPP"], 3);
        let start = game.current_player().id();

        for (letter, id) in [('a', 1), ('b', 2), ('c', 3)] {
            let h = handle(&game, letter, id);
            assert!(matches!(game.move_figure(h, 0, 1), MoveOutcome::Moved { .. }));
        }
        assert_eq!(game.current_player().id(), start);

        for (letter, id) in [('a', 1), ('b', 2)] {
            let h = handle(&game, letter, id);
            game.move_figure(h, 0, 1);
        }
        assert_eq!(game.current_player().id(), player('c'));
        assert_board_matches_figures(&game);
    }

    #[test]
    fn test_rejected_move_keeps_turn() {
        let mut game = create_game(&["aO", "bP"], 2);
        let a1 = handle(&game, 'a', 1);
        assert_eq!(game.move_figure(a1, 0, 1), MoveOutcome::NotPossible);
        assert_eq!(game.current_player().id(), player('a'));
    }

    #[test]
    fn test_advance_turn_single_player_wraps_to_itself() {
        let mut game = create_game(&["aP"], 1);
        assert_eq!(game.advance_turn(), player('a'));
        assert_eq!(game.current_player().id(), player('a'));
    }

    #[test]
    fn test_advance_turn_allowed_after_game_over() {
        let mut game = create_game(&["aT", "bP"], 2);
        let a1 = handle(&game, 'a', 1);
        assert!(matches!(game.move_figure(a1, 0, 1), MoveOutcome::Won { .. }));
        assert_eq!(game.advance_turn(), player('b'));
        assert!(game.is_over());
    }

    #[test]
    fn test_move_obstacle_onto_plain() {
        let mut game = create_game(&["aPP", "POP", "PPT"], 1);
        let outcome = game.move_obstacle(Position::new(1, 1), 0, 1);
        assert_eq!(
            outcome,
            ObstacleOutcome::Moved {
                from: Position::new(1, 1),
                to: Position::new(1, 2)
            }
        );
        assert_eq!(cell(&game, 1, 1), 'P');
        assert_eq!(cell(&game, 1, 2), 'O');
        assert_eq!(game.current_player().id(), player('a'));
    }

    #[test]
    fn test_move_obstacle_onto_non_plain_is_rejected() {
        let mut game = create_game(&["aPP", "POO", "PPT"], 1);
        let before = game.board().clone();

        // Target tile, another obstacle, a figure, off the board.
        assert_eq!(game.move_obstacle(Position::new(1, 2), 1, 0), ObstacleOutcome::NotPossible);
        assert_eq!(game.move_obstacle(Position::new(1, 1), 0, 1), ObstacleOutcome::NotPossible);
        assert_eq!(game.move_obstacle(Position::new(1, 1), -1, -1), ObstacleOutcome::NotPossible);
        assert_eq!(game.move_obstacle(Position::new(1, 2), 0, 1), ObstacleOutcome::NotPossible);

        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_move_obstacle_without_obstacle_is_noop() {
        let mut game = create_game(&["aPP", "POP"], 1);
        let before = game.board().clone();
        assert_eq!(game.move_obstacle(Position::new(0, 1), 0, 1), ObstacleOutcome::NoObstacle);
        assert_eq!(game.move_obstacle(Position::new(9, 9), 0, 1), ObstacleOutcome::NoObstacle);
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_move_obstacle_ignores_game_over() {
        let mut game = create_game(&["aT", "OP"], 1);
        let a1 = handle(&game, 'a', 1);
        assert!(matches!(game.move_figure(a1, 0, 1), MoveOutcome::Won { .. }));
        assert!(matches!(
            game.move_obstacle(Position::new(1, 0), 0, 1),
            ObstacleOutcome::Moved { .. }
        ));
    }

    #[test]
    fn test_random_walk_keeps_board_and_figures_in_sync() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(9);
        let mut game = create_game(&["aPPOPPPb", "PPOPPPPP", "PPPPPOPP", "cPPPPPPP"], 3);
        let handles = [handle(&game, 'a', 1), handle(&game, 'b', 2), handle(&game, 'c', 3)];
        // Once two figures share a cell the board can only show one of them.
        let mut ever_stacked = false;

        for _ in 0..500 {
            let h = handles[rng.random_range(0..handles.len())];
            let d_row = rng.random_range(-2..=2);
            let d_col = rng.random_range(-2..=2);

            let board_before = game.board().clone();
            let turn_before = game.current_player().id();
            let from = game.figure(h).unwrap().position();

            match game.move_figure(h, d_row, d_col) {
                MoveOutcome::Moved { from: moved_from, to, .. } => {
                    assert_eq!(moved_from, from);
                    assert_eq!(Some(to), from.offset(d_row, d_col));
                    assert_eq!(game.figure(h).unwrap().position(), to);
                    if to != from {
                        assert_eq!(game.board().cell_at(from), Some(Marker::Plain));
                    }
                    assert_eq!(
                        game.board().cell_at(to),
                        Some(Marker::Figure(game.figure(h).unwrap().player()))
                    );
                }
                MoveOutcome::NotPossible => {
                    assert_eq!(game.board(), &board_before);
                    assert_eq!(game.figure(h).unwrap().position(), from);
                    assert_eq!(game.current_player().id(), turn_before);
                }
                other => panic!("unexpected outcome {:?}", other),
            }

            let positions: Vec<Position> = game.figures().map(Figure::position).collect();
            ever_stacked |= (1..positions.len()).any(|i| positions[..i].contains(&positions[i]));
            if !ever_stacked {
                assert_board_matches_figures(&game);
            }
        }
    }

    #[test]
    fn test_dice_is_deterministic_for_seed() {
        let mut first = GridGameState::new(&["aP"], 1, Some(2024)).unwrap();
        let mut second = GridGameState::new(&["aP"], 1, Some(2024)).unwrap();
        let rolls_first: Vec<u32> = (0..50).map(|_| first.roll_dice()).collect();
        let rolls_second: Vec<u32> = (0..50).map(|_| second.roll_dice()).collect();
        assert_eq!(rolls_first, rolls_second);
        assert!(rolls_first.iter().all(|r| (1..=6).contains(r)));
        assert_eq!(first.seed(), 2024);
    }

    #[test]
    fn test_dice_does_not_touch_board() {
        let mut game = create_game(&["aPT"], 1);
        let before = game.board().clone();
        game.roll_dice();
        assert_eq!(game.board(), &before);
        assert!(!game.is_over());
    }
}
