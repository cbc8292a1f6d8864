//! Recursive-backtracking maze carver.
//!
//! Runs iteratively with an explicit stack so a 99x99 arena (2 401 room
//! cells) never comes close to the thread's stack limit.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{MAX_TILES, Map, MapError, Tile};

/// Steps between room cells: two tiles, with the wall tile in between.
const DIRECTIONS: [(i64, i64); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// Generates a fresh random maze of the given size.
///
/// # Errors
/// Returns [`MapError::InvalidDimensions`] unless both sides are odd and
/// at least 3, and [`MapError::TooLarge`] past [`MAX_TILES`].
pub fn new_map(width: u32, height: u32) -> Result<Map, MapError> {
    let seed: u64 = rand::rng().random();
    new_map_seeded(width, height, seed)
}

/// Generates a maze from a fixed seed. The same seed and size always
/// produce the same map.
pub fn new_map_seeded(
    width: u32,
    height: u32,
    seed: u64,
) -> Result<Map, MapError> {
    if width < 3 || height < 3 || width % 2 == 0 || height % 2 == 0 {
        return Err(MapError::InvalidDimensions { width, height });
    }

    let area = (width as usize)
        .checked_mul(height as usize)
        .filter(|area| *area <= MAX_TILES)
        .ok_or(MapError::TooLarge { width, height })?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut tiles = vec![Tile::Wall; area];
    let index = |x: i64, z: i64| (z * width as i64 + x) as usize;
    let in_rooms = |x: i64, z: i64| {
        x > 0 && z > 0 && x < width as i64 - 1 && z < height as i64 - 1
    };

    tiles[index(1, 1)] = Tile::Floor;
    let mut stack: Vec<(i64, i64)> = vec![(1, 1)];

    while let Some(&(x, z)) = stack.last() {
        let mut dirs = DIRECTIONS;
        dirs.shuffle(&mut rng);

        let next = dirs.iter().map(|(dx, dz)| (x + dx, z + dz)).find(
            |&(nx, nz)| in_rooms(nx, nz) && tiles[index(nx, nz)] == Tile::Wall,
        );

        match next {
            Some((nx, nz)) => {
                // Knock down the wall between the two rooms.
                tiles[index((x + nx) / 2, (z + nz) / 2)] = Tile::Floor;
                tiles[index(nx, nz)] = Tile::Floor;
                stack.push((nx, nz));
            }
            None => {
                stack.pop();
            }
        }
    }

    tracing::debug!(width, height, seed, "map generated");

    Ok(Map {
        width,
        height,
        tiles,
    })
}
