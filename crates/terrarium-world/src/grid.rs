//! Bounded 2D grid of entity cells.

use crate::entity::Entity;
use terrarium_core::Coordinate;

/// A dense rectangular grid holding at most one entity per cell
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<Entity>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        let size = (width * height) as usize;

        Self {
            width,
            height,
            cells: vec![None; size],
        }
    }

    /// Whether the coordinate lies within the grid bounds
    pub fn is_inside(&self, coord: Coordinate) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    /// Borrow the occupant at a coordinate
    pub fn get(&self, coord: Coordinate) -> Option<&Entity> {
        let index = self.coord_to_index(coord);
        self.cells[index].as_ref()
    }

    /// Mutably borrow the occupant at a coordinate
    pub fn get_mut(&mut self, coord: Coordinate) -> Option<&mut Entity> {
        let index = self.coord_to_index(coord);
        self.cells[index].as_mut()
    }

    /// Place an entity, replacing any previous occupant
    pub fn put(&mut self, coord: Coordinate, entity: Entity) {
        let index = self.coord_to_index(coord);
        self.cells[index] = Some(entity);
    }

    /// Remove and return the occupant at a coordinate
    pub fn take(&mut self, coord: Coordinate) -> Option<Entity> {
        let index = self.coord_to_index(coord);
        self.cells[index].take()
    }

    fn coord_to_index(&self, coord: Coordinate) -> usize {
        assert!(
            self.is_inside(coord),
            "coordinate ({}, {}) outside {}x{} grid",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        (coord.y * self.width + coord.x) as usize
    }

    fn index_to_coord(&self, index: usize) -> Coordinate {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Coordinate::new(x, y)
    }

    /// All coordinates in row-major scan order (y outer, x inner)
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_coord(i))
    }

    /// Occupied cells with their coordinates, in row-major scan order
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Entity)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_ref().map(|e| (self.index_to_coord(i), e)))
    }
}
