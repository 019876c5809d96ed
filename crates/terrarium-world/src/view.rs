//! Read-only perception window for a deciding entity.

use crate::grid::Grid;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use terrarium_core::{Coordinate, Direction, BOUNDARY_GLYPH, EMPTY_GLYPH};

/// One-cell neighborhood around an origin, bound to a single decision step.
///
/// The origin cell itself is never inspected; only the eight adjacent cells
/// are queried, by the symbol of whatever occupies them.
pub struct View<'a> {
    grid: &'a Grid,
    origin: Coordinate,
}

impl<'a> View<'a> {
    pub fn new(grid: &'a Grid, origin: Coordinate) -> Self {
        assert!(grid.is_inside(origin), "view origin outside the grid");
        Self { grid, origin }
    }

    /// Symbol one step away, or the boundary symbol outside the grid
    pub fn look(&self, direction: Direction) -> char {
        let target = self.origin.step(direction);

        if !self.grid.is_inside(target) {
            return BOUNDARY_GLYPH;
        }

        match self.grid.get(target) {
            Some(entity) => entity.glyph,
            None => EMPTY_GLYPH,
        }
    }

    /// Directions whose occupant symbol matches, in compass order
    pub fn find_all(&self, glyph: char) -> Vec<Direction> {
        Direction::all()
            .into_iter()
            .filter(|&direction| self.look(direction) == glyph)
            .collect()
    }

    /// Uniformly random direction whose occupant symbol matches
    pub fn find(&self, glyph: char, rng: &mut ChaCha8Rng) -> Option<Direction> {
        self.find_all(glyph).choose(rng).copied()
    }
}
