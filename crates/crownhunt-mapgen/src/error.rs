//! Error types for map generation.

/// Errors returned by the map generator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// Width and height must both be odd and at least 3.
    #[error("invalid map dimensions {width}x{height}: both must be odd and >= 3")]
    InvalidDimensions { width: u32, height: u32 },

    /// The arena would have more than [`MAX_TILES`](crate::MAX_TILES) tiles.
    #[error("map {width}x{height} is too large: at most {max} tiles allowed", max = crate::MAX_TILES)]
    TooLarge { width: u32, height: u32 },
}
