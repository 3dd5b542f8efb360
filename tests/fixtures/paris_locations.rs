//! Real Paris locations for realistic test fixtures.
//!
//! Coordinates are rounded public landmark positions.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> route_sequencer::Coordinate {
        route_sequencer::Coordinate::new(self.lat, self.lng)
    }
}

// ============================================================================
// Depots (good for driver start positions)
// ============================================================================

pub const DEPOTS: &[Location] = &[
    Location::new("Gare de Lyon", 48.8443, 2.3744),
    Location::new("Gare du Nord", 48.8809, 2.3553),
];

// ============================================================================
// Delivery stops
// ============================================================================

pub const STOPS: &[Location] = &[
    Location::new("Louvre", 48.8606, 2.3376),
    Location::new("Notre-Dame", 48.8530, 2.3499),
    Location::new("Pantheon", 48.8462, 2.3464),
    Location::new("Bastille", 48.8532, 2.3691),
    Location::new("Republique", 48.8675, 2.3637),
    Location::new("Opera Garnier", 48.8720, 2.3316),
    Location::new("Arc de Triomphe", 48.8738, 2.2950),
    Location::new("Tour Eiffel", 48.8584, 2.2945),
];
