//! Grid-world simulation engine.
//!
//! Implements the bounded 2D grid, entity perception, and the per-turn
//! action-resolution protocol.

pub mod grid;
pub mod view;
pub mod entity;
pub mod legend;
pub mod layout;
pub mod world;

pub use entity::{Entity, EntityKind, Species};
pub use grid::Grid;
pub use layout::generate_valley;
pub use legend::Legend;
pub use view::View;
pub use world::{Census, World};
