//! Board topology and board objects
//!
//! The wheel is a fixed graph: rings own channels, channels own two gates
//! and three nodes. Everything dynamic (the player, facets, hazards,
//! pickups) lives in the object arena and references the graph by id,
//! never by pointer.

pub mod graph;
pub mod object;

pub use graph::{
    BuildError, Bumper, BumperGroup, BumperId, BumperKind, Channel, ChannelId, Gate, GateSlot,
    Node, NodeId, NodeSlot, Ring, RingSpec, Wheel,
};
pub use object::{
    BoardObject, BoardObjectKind, FacetColor, HazardKind, ObjectId, PlayerState, PointModKind,
    ShieldKind, SpeedModKind, TravelDirection,
};
