//! Maze arena generator for Crownhunt.
//!
//! The arena is a grid of [`Tile`]s with odd width and height. Odd sizes let
//! the generator treat every odd coordinate as a "room" cell and every even
//! coordinate as a potential wall between rooms, so the carved maze always
//! has a solid border.
//!
//! ```text
//! # # # # # # #
//! # . . . # . #
//! # # # . # . #
//! # . . . . . #
//! # # # # # # #
//! ```
//!
//! The map is built once when a game is created and never mutated after
//! that; the coordinator shares it behind an `Arc`.

mod error;
mod maze;

pub use error::MapError;
pub use maze::{new_map, new_map_seeded};

use serde::{Deserialize, Serialize};

/// Default arena width used by the server.
pub const DEFAULT_WIDTH: u32 = 99;

/// Default arena height used by the server.
pub const DEFAULT_HEIGHT: u32 = 99;

/// Largest arena accepted, in tiles (a little over 4095x4095).
pub const MAX_TILES: usize = 1 << 24;

/// A single cell of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tile {
    Wall,
    Floor,
}

/// An immutable arena description.
///
/// Tiles are stored row-major: the tile at `(x, z)` lives at
/// `tiles[z * width + x]`. `x` runs along the width and `z` along the
/// height, matching the horizontal axes of player positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
}

impl Map {
    /// Returns the tile at `(x, z)`, or `None` when out of bounds.
    pub fn tile(&self, x: u32, z: u32) -> Option<Tile> {
        if x >= self.width || z >= self.height {
            return None;
        }
        let index = z as usize * self.width as usize + x as usize;
        self.tiles.get(index).copied()
    }

    /// Returns `true` if `(x, z)` is inside the arena and walkable.
    pub fn is_floor(&self, x: u32, z: u32) -> bool {
        self.tile(x, z) == Some(Tile::Floor)
    }

    /// Number of walkable tiles.
    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|t| **t == Tile::Floor).count()
    }
}
