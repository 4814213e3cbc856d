//! Edge-aware soil tile selection.
//!
//! A tilled tile's artwork depends on which of its four axis neighbors are
//! also tilled. The 16 neighbor combinations map onto a closed set of
//! variants through a lookup table, so resolution is a total pure function
//! — no combination falls through to a default.

/// Which edge/corner graphic a tilled tile displays. Variants are named by
/// the set of tilled neighbors they connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilVariant {
    /// No tilled neighbors.
    Isolated,
    // One neighbor — run caps.
    North,
    South,
    East,
    West,
    // Opposite pairs — straight runs.
    NorthSouth,
    EastWest,
    // Adjacent pairs — corners.
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    // Three neighbors — T junctions.
    NorthSouthEast,
    NorthSouthWest,
    NorthEastWest,
    SouthEastWest,
    /// Tilled on all four sides.
    All,
}

impl SoilVariant {
    /// Index into the tilled-dirt atlas (one sprite per variant, in table
    /// order).
    pub fn atlas_index(self) -> usize {
        NEIGHBOR_VARIANTS
            .iter()
            .position(|&v| v == self)
            .unwrap_or(0)
    }
}

/// Lookup table indexed by the neighbor bitmask:
/// bit 0 = north, bit 1 = south, bit 2 = east, bit 3 = west.
const NEIGHBOR_VARIANTS: [SoilVariant; 16] = [
    SoilVariant::Isolated,       // 0b0000
    SoilVariant::North,          // 0b0001
    SoilVariant::South,          // 0b0010
    SoilVariant::NorthSouth,     // 0b0011
    SoilVariant::East,           // 0b0100
    SoilVariant::NorthEast,      // 0b0101
    SoilVariant::SouthEast,      // 0b0110
    SoilVariant::NorthSouthEast, // 0b0111
    SoilVariant::West,           // 0b1000
    SoilVariant::NorthWest,      // 0b1001
    SoilVariant::SouthWest,      // 0b1010
    SoilVariant::NorthSouthWest, // 0b1011
    SoilVariant::EastWest,       // 0b1100
    SoilVariant::NorthEastWest,  // 0b1101
    SoilVariant::SouthEastWest,  // 0b1110
    SoilVariant::All,            // 0b1111
];

/// Resolve a tilled tile's variant from its four neighbors' tilled flags.
/// Callers pass `false` for neighbors outside the grid.
pub fn resolve_variant(north: bool, south: bool, east: bool, west: bool) -> SoilVariant {
    let mask = (north as usize)
        | (south as usize) << 1
        | (east as usize) << 2
        | (west as usize) << 3;
    NEIGHBOR_VARIANTS[mask]
}
