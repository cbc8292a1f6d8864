//! Game configuration.

use crownhunt_mapgen::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crownhunt_tick::TickConfig;

/// Configuration for one game instance.
///
/// The defaults reproduce the standard game: a 99x99 arena, an elimination
/// check every 500 ms, and a kill radius of 1.0.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Arena width in tiles. Must be odd.
    pub map_width: u32,

    /// Arena height in tiles. Must be odd.
    pub map_height: u32,

    /// Fixed maze seed. `None` picks a random one.
    pub map_seed: Option<u64>,

    /// Elimination tick settings.
    pub tick: TickConfig,

    /// A player strictly closer than this to the monster (on the X/Z
    /// plane) is eliminated.
    pub elimination_radius: f64,

    /// Capacity of each player's outbound sink. A player whose sink is full
    /// when the coordinator delivers to it is disconnected.
    pub outbound_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: DEFAULT_WIDTH,
            map_height: DEFAULT_HEIGHT,
            map_seed: None,
            tick: TickConfig::default(),
            elimination_radius: 1.0,
            outbound_capacity: 256,
        }
    }
}
