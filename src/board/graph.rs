//! Wheel topology: rings, channels, gates, nodes and bumpers
//!
//! The graph is built once per puzzle and never changes shape afterward.
//! Channels are named deterministically (`rNN-cNN`) so that lexicographic
//! name order equals build order; persistence and runtime lookups both walk
//! channels in that order and therefore always agree on positional
//! correspondence.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use thiserror::Error;

use super::object::{FacetColor, ObjectId};
use crate::consts::*;
use crate::polar_to_cartesian;

/// Rings are addressed by their index in the wheel; ring 0 is the hub.
pub type RingId = usize;

/// Stable address of a channel within the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    pub ring: RingId,
    pub index: usize,
}

/// The three fixed points of a channel, inner to outer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeSlot {
    Start,
    Mid,
    End,
}

/// Stable address of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub channel: ChannelId,
    pub slot: NodeSlot,
}

/// The two gate positions of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateSlot {
    Inner,
    Outer,
}

/// Togglable blocker at one end of a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    /// When active the gate blocks (collides and renders); inactive gates
    /// open the lane segment they guard.
    pub active: bool,
}

/// A fixed point on a channel where movers are detected and objects spawn.
///
/// Only the Mid node may legally hold a spawned object; the setter refuses
/// (and logs) attempts against Start/End so the invariant cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub slot: NodeSlot,
    occupant: Option<ObjectId>,
}

impl Node {
    fn new(slot: NodeSlot) -> Self {
        Self {
            slot,
            occupant: None,
        }
    }

    /// Object spawned on this node, if any.
    pub fn occupant(&self) -> Option<ObjectId> {
        self.occupant
    }

    /// Attach a spawned object. Returns false (and warns) for non-Mid
    /// nodes and for nodes that already hold an occupant; the existing
    /// occupant is never overwritten.
    pub fn set_occupant(&mut self, id: ObjectId) -> bool {
        if self.slot != NodeSlot::Mid {
            log::warn!("refusing to occupy {:?} node with object {id}", self.slot);
            return false;
        }
        if let Some(existing) = self.occupant {
            log::warn!("node already holds object {existing}, refusing object {id}");
            return false;
        }
        self.occupant = Some(id);
        true
    }

    /// Clear occupancy (object picked up, killed or reset).
    pub fn clear_occupant(&mut self) {
        self.occupant = None;
    }
}

/// One radial lane segment of a ring, gated at both ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    name: String,
    pub id: ChannelId,
    /// Inner, outer. Both always present once built.
    gates: [Gate; 2],
    /// Start, mid, end. All three always present once built.
    nodes: [Node; 3],
}

impl Channel {
    fn new(id: ChannelId) -> Self {
        Self {
            name: format!("r{:02}-c{:02}", id.ring, id.index),
            id,
            gates: [Gate { active: true }, Gate { active: true }],
            nodes: [
                Node::new(NodeSlot::Start),
                Node::new(NodeSlot::Mid),
                Node::new(NodeSlot::End),
            ],
        }
    }

    /// Generated name; lexicographic order matches build order.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gate(&self, slot: GateSlot) -> &Gate {
        match slot {
            GateSlot::Inner => &self.gates[0],
            GateSlot::Outer => &self.gates[1],
        }
    }

    pub fn gate_mut(&mut self, slot: GateSlot) -> &mut Gate {
        match slot {
            GateSlot::Inner => &mut self.gates[0],
            GateSlot::Outer => &mut self.gates[1],
        }
    }

    pub fn node(&self, slot: NodeSlot) -> &Node {
        match slot {
            NodeSlot::Start => &self.nodes[0],
            NodeSlot::Mid => &self.nodes[1],
            NodeSlot::End => &self.nodes[2],
        }
    }

    pub fn node_mut(&mut self, slot: NodeSlot) -> &mut Node {
        match slot {
            NodeSlot::Start => &mut self.nodes[0],
            NodeSlot::Mid => &mut self.nodes[1],
            NodeSlot::End => &mut self.nodes[2],
        }
    }

    /// Traversal eligibility of one of this channel's nodes:
    /// - Start is on-path when the inner gate is open
    /// - End is on-path when the outer gate is open
    /// - Mid is on-path when either gate is open
    pub fn can_be_on_path(&self, slot: NodeSlot) -> bool {
        let inner_open = !self.gate(GateSlot::Inner).active;
        let outer_open = !self.gate(GateSlot::Outer).active;
        match slot {
            NodeSlot::Start => inner_open,
            NodeSlot::End => outer_open,
            NodeSlot::Mid => inner_open || outer_open,
        }
    }
}

/// Edge-of-ring deflector behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BumperKind {
    /// Deflects, no side effect
    Regular,
    /// Consumes a carried facet of this color (player only)
    ColorMatch(FacetColor),
    /// Ends the game on contact
    Death,
}

/// One deflector on an outer ring's rim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bumper {
    pub kind: BumperKind,
}

/// Stable address of a bumper: one per channel of its ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BumperId {
    pub ring: RingId,
    pub index: usize,
}

/// All bumpers of one outer ring. Only the outermost active ring's group
/// is live; the rest are deactivated by `toggle_rings_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BumperGroup {
    pub active: bool,
    pub bumpers: Vec<Bumper>,
}

impl BumperGroup {
    fn new(count: usize) -> Self {
        Self {
            active: false,
            bumpers: (0..count)
                .map(|_| Bumper {
                    kind: BumperKind::Regular,
                })
                .collect(),
        }
    }
}

/// One concentric lane-ring of the wheel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    pub index: RingId,
    /// Auto-rotation, degrees per second, signed
    pub rotation_speed_deg: f32,
    /// Current rotation (radians)
    pub angle: f32,
    pub active: bool,
    channels: Vec<Channel>,
    /// Absent for the hub ring
    pub bumpers: Option<BumperGroup>,
}

impl Ring {
    /// Inner radius of this ring's band.
    pub fn inner_radius(&self) -> f32 {
        HUB_RADIUS + self.index as f32 * RING_DEPTH
    }

    /// Outer radius of this ring's band.
    pub fn outer_radius(&self) -> f32 {
        self.inner_radius() + RING_DEPTH
    }

    /// Current world angle of a channel's lane axis.
    pub fn channel_angle(&self, index: usize) -> f32 {
        self.angle + index as f32 * TAU / self.channels.len() as f32
    }

    /// Channels in deterministic name order (== build order).
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }
}

/// Authored shape of one ring.
#[derive(Debug, Clone, Copy)]
pub struct RingSpec {
    pub channels: usize,
    pub rotation_speed_deg: f32,
}

/// Fatal topology configuration errors. The build aborts; nothing is
/// silently truncated.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("ring {ring} authored with {found} channels, expected {expected}")]
    ChannelCountMismatch {
        ring: RingId,
        expected: usize,
        found: usize,
    },
    #[error("wheel needs 1..={max} rings, got {found}")]
    RingCountOutOfRange { max: usize, found: usize },
}

/// Expected channel count for a ring: 12 for the hub, 48 otherwise.
pub fn expected_channels(ring: RingId) -> usize {
    if ring == 0 {
        CENTER_RING_CHANNELS
    } else {
        OUTER_RING_CHANNELS
    }
}

/// The entire game board; one per puzzle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wheel {
    rings: Vec<Ring>,
    /// Rings 0..active_rings participate in play
    pub active_rings: usize,
}

impl Wheel {
    /// Build the full lane topology, hub outward, channels in index order.
    ///
    /// A spec whose channel count mismatches the expected constant is a
    /// fatal configuration error.
    pub fn build(specs: &[RingSpec]) -> Result<Self, BuildError> {
        if specs.is_empty() || specs.len() > MAX_RINGS {
            return Err(BuildError::RingCountOutOfRange {
                max: MAX_RINGS,
                found: specs.len(),
            });
        }

        let mut rings = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let expected = expected_channels(index);
            if spec.channels != expected {
                return Err(BuildError::ChannelCountMismatch {
                    ring: index,
                    expected,
                    found: spec.channels,
                });
            }

            let channels = (0..spec.channels)
                .map(|c| Channel::new(ChannelId { ring: index, index: c }))
                .collect();
            rings.push(Ring {
                index,
                rotation_speed_deg: spec.rotation_speed_deg,
                angle: 0.0,
                active: true,
                channels,
                bumpers: (index > 0).then(|| BumperGroup::new(spec.channels)),
            });
        }

        let mut wheel = Self {
            active_rings: rings.len(),
            rings,
        };
        wheel.toggle_rings_active(wheel.active_rings);
        Ok(wheel)
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn ring(&self, id: RingId) -> &Ring {
        &self.rings[id]
    }

    pub fn ring_mut(&mut self, id: RingId) -> &mut Ring {
        &mut self.rings[id]
    }

    /// Deterministic, name-ordered channels of a ring. Persistence and
    /// runtime lookups both go through here.
    pub fn channels_of(&self, ring: RingId) -> &[Channel] {
        self.rings[ring].channels()
    }

    pub fn channel(&self, id: ChannelId) -> &Channel {
        &self.rings[id.ring].channels[id.index]
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> &mut Channel {
        &mut self.rings[id.ring].channels[id.index]
    }

    /// Resolve a channel by its generated name.
    pub fn channel_by_name(&self, name: &str) -> Option<ChannelId> {
        self.rings.iter().find_map(|ring| {
            ring.channels
                .iter()
                .find(|c| c.name() == name)
                .map(|c| c.id)
        })
    }

    /// Traversal eligibility of a node (see `Channel::can_be_on_path`).
    pub fn can_be_on_path(&self, node: NodeId) -> bool {
        self.channel(node.channel).can_be_on_path(node.slot)
    }

    /// World position of a node, following the ring's current rotation.
    pub fn node_pos(&self, node: NodeId) -> Vec2 {
        let ring = self.ring(node.channel.ring);
        let theta = ring.channel_angle(node.channel.index);
        let r = match node.slot {
            NodeSlot::Start => ring.inner_radius() + NODE_INSET,
            NodeSlot::Mid => ring.inner_radius() + RING_DEPTH / 2.0,
            NodeSlot::End => ring.outer_radius() - NODE_INSET,
        };
        polar_to_cartesian(r, theta)
    }

    /// World position of a gate (at the exact band edge).
    pub fn gate_pos(&self, channel: ChannelId, slot: GateSlot) -> Vec2 {
        let ring = self.ring(channel.ring);
        let theta = ring.channel_angle(channel.index);
        let r = match slot {
            GateSlot::Inner => ring.inner_radius(),
            GateSlot::Outer => ring.outer_radius(),
        };
        polar_to_cartesian(r, theta)
    }

    /// World position of a bumper (just beyond its ring's rim).
    pub fn bumper_pos(&self, id: BumperId) -> Vec2 {
        let ring = self.ring(id.ring);
        let theta = ring.channel_angle(id.index);
        polar_to_cartesian(ring.outer_radius() + BUMPER_OFFSET, theta)
    }

    /// Index of the outermost active ring.
    pub fn outermost_active(&self) -> RingId {
        self.active_rings.saturating_sub(1)
    }

    /// Activate rings 0..n and deactivate the rest. The hub is always
    /// active. Only the outermost active ring keeps a live bumper group.
    pub fn toggle_rings_active(&mut self, n: usize) {
        let n = n.clamp(1, self.rings.len());
        self.active_rings = n;
        for ring in &mut self.rings {
            ring.active = ring.index < n;
            if let Some(group) = &mut ring.bumpers {
                group.active = ring.active && ring.index == n - 1;
            }
        }
    }

    /// Drop every node occupancy (level reset).
    pub fn clear_occupants(&mut self) {
        for ring in &mut self.rings {
            for channel in &mut ring.channels {
                for slot in [NodeSlot::Start, NodeSlot::Mid, NodeSlot::End] {
                    channel.node_mut(slot).clear_occupant();
                }
            }
        }
    }

    /// Close every gate (blank-slate state for restore pass 1).
    pub fn reset_gates(&mut self) {
        for ring in &mut self.rings {
            for channel in &mut ring.channels {
                channel.gate_mut(GateSlot::Inner).active = true;
                channel.gate_mut(GateSlot::Outer).active = true;
            }
        }
    }
}
