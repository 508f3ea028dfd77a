use crate::PlayerId;

use super::figure::Figure;
use super::types::FigureId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    figures: Vec<Figure>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            figures: Vec::new(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Figures in creation order.
    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub(crate) fn figure_index(&self, id: FigureId) -> Option<usize> {
        self.figures.iter().position(|figure| figure.id() == id)
    }

    pub(crate) fn figures_mut(&mut self) -> &mut [Figure] {
        &mut self.figures
    }

    pub(crate) fn add_figure(&mut self, figure: Figure) {
        self.figures.push(figure);
    }
}
