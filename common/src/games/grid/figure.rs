use crate::PlayerId;

use super::types::{FigureId, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Figure {
    player: PlayerId,
    id: FigureId,
    position: Position,
}

impl Figure {
    pub fn new(player: PlayerId, id: FigureId, position: Position) -> Self {
        Self {
            player,
            id,
            position,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Unique across the whole game, not just within the owning player.
    pub fn id(&self) -> FigureId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn move_to(&mut self, position: Position) {
        self.position = position;
    }
}
