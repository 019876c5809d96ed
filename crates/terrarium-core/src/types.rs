//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Symbol rendered for an empty cell
pub const EMPTY_GLYPH: char = ' ';

/// Symbol a view reports for cells outside the grid; agents treat it like a wall
pub const BOUNDARY_GLYPH: char = '#';

/// Symbol plants render as; herbivores scan their neighborhood for it
pub const PLANT_GLYPH: char = '*';

/// Unique identifier for an entity instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 2D grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Derive a new coordinate by offsetting this one
    pub fn plus(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The coordinate one cell away in the given direction
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.plus(dx, dy)
    }
}

/// Compass direction to an adjacent cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Unit offset for this direction; y grows downward
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// All eight directions in clockwise compass order
    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
    }
}

/// Intent produced by an entity's decision step, consumed immediately by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Grow,
    Move { direction: Direction },
    Eat { direction: Direction },
    Reproduce { direction: Direction },
}

/// Resolution policy a world runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ruleset {
    /// Movement only; no energy accounting
    Basic,
    /// Full energy economy: growth, feeding, reproduction, starvation
    Lifelike,
}
