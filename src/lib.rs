//! Gyrowheel - a rotating-wheel lane puzzle core
//!
//! Core modules:
//! - `board`: Wheel topology (rings, channels, gates, nodes) and board objects
//! - `sim`: Deterministic fixed-step simulation (resolver, victory, events)
//! - `persistence`: Puzzle snapshot/restore
//!
//! Rendering, input capture and spatial indexing live in the host; this crate
//! only talks to them through the `OverlapQuery` and `Presenter` traits.

pub mod board;
pub mod persistence;
pub mod sim;

pub use board::{BoardObject, BoardObjectKind, FacetColor, Wheel};
pub use sim::{Game, GamePhase, Presenter, TickInput};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use crate::board::FacetColor;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Ring layout
    pub const MAX_RINGS: usize = 4;
    pub const CENTER_RING_CHANNELS: usize = 12;
    pub const OUTER_RING_CHANNELS: usize = 48;

    /// Radius of the central hub; ring 0 starts here
    pub const HUB_RADIUS: f32 = 60.0;
    /// Radial depth of one ring band
    pub const RING_DEPTH: f32 = 80.0;
    /// Start/End nodes sit this far inside their ring band edge
    pub const NODE_INSET: f32 = 8.0;
    /// Bumpers sit this far beyond their ring's outer radius
    pub const BUMPER_OFFSET: f32 = 10.0;

    /// Collider radii
    pub const MOVER_RADIUS: f32 = 8.0;
    pub const NODE_RADIUS: f32 = 6.0;
    /// Radius handed to the host overlap query each tick
    pub const OVERLAP_RADIUS: f32 = 18.0;
    /// A temporarily-ignored hazard is forgotten once the player has
    /// separated by this much beyond touching distance
    pub const SEPARATION_MARGIN: f32 = 4.0;

    /// Mover defaults
    pub const PLAYER_BASE_SPEED: f32 = 120.0;
    pub const ENEMY_BASE_SPEED: f32 = 80.0;

    /// Player inventory queues (shields, facet collectors) cap out here;
    /// pickups touched while full are left on the board
    pub const MAX_INVENTORY: usize = 12;

    /// Point awards
    pub const FACET_POINTS: u64 = 100;
    pub const PICKUP_POINTS: u64 = 50;
    pub const MOD_POINTS: u64 = 25;

    /// Number of facet colors, including the sentinel
    pub const COLOR_COUNT: usize = 6;
    /// Color excluded from victory evaluation. Historically the unused
    /// "white" slot; kept as an explicit constant rather than an
    /// off-by-one in the victory loop.
    pub const SENTINEL_COLOR: FacetColor = FacetColor::White;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Rotate a vector by `delta` radians about the origin
#[inline]
pub fn rotate_vec(v: Vec2, delta: f32) -> Vec2 {
    let (s, c) = delta.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}
