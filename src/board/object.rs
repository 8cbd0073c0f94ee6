//! Board objects: the player, facets, hazards and pickups
//!
//! Objects live in a flat arena owned by the `Game`, sorted by id for
//! deterministic iteration, and reference the graph by `ChannelId`/`NodeId`.
//! Behavior dispatch is keyed on the closed `BoardObjectKind` enum;
//! every dispatch site match is exhaustive.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::graph::{ChannelId, NodeId, NodeSlot, Wheel};
use crate::consts::*;

/// Arena key for a board object.
pub type ObjectId = u32;

/// Facet and bumper colors. `White` is the reserved sentinel slot and is
/// never evaluated for victory (see `consts::SENTINEL_COLOR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    White,
}

impl FacetColor {
    /// All colors in counter-index order.
    pub const ALL: [FacetColor; COLOR_COUNT] = [
        FacetColor::Red,
        FacetColor::Green,
        FacetColor::Blue,
        FacetColor::Yellow,
        FacetColor::Purple,
        FacetColor::White,
    ];

    /// Index into the per-color counter arrays.
    pub fn index(self) -> usize {
        match self {
            FacetColor::Red => 0,
            FacetColor::Green => 1,
            FacetColor::Blue => 2,
            FacetColor::Yellow => 3,
            FacetColor::Purple => 4,
            FacetColor::White => 5,
        }
    }
}

/// Hazard behavior. Enemy is the only mobile subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Enemy,
    Dynamite,
    Glue,
}

/// Shield behavior when a hazard collision is absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldKind {
    /// Absorbs one hit; the hazard survives and is debounced
    Hit,
    /// Destroys the hazard along with itself
    SingleKill,
}

/// What a speed modifier adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedModKind {
    PlayerSpeed,
    EnemySpeed,
    RingSpeed,
}

/// What a point modifier grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointModKind {
    ExtraPoints,
    PointsMultiplier,
}

/// Forward travel direction along a channel's lane axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelDirection {
    Outward,
    Inward,
}

impl TravelDirection {
    pub fn reversed(self) -> Self {
        match self {
            TravelDirection::Outward => TravelDirection::Inward,
            TravelDirection::Inward => TravelDirection::Outward,
        }
    }
}

/// Closed variant tag for everything that can sit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoardObjectKind {
    Player,
    Facet {
        color: FacetColor,
    },
    Hazard {
        kind: HazardKind,
        /// Glue immobilization time (seconds); unused by other subtypes
        effect_time: f32,
    },
    FacetCollect,
    Shield {
        kind: ShieldKind,
    },
    SpeedMod {
        kind: SpeedModKind,
        magnitude: f32,
    },
    PointMod {
        kind: PointModKind,
        value: u64,
        duration: f32,
    },
}

impl BoardObjectKind {
    /// Movers are advanced by the resolver each tick: the player and
    /// mobile hazards. Everything else sits where it spawned.
    pub fn is_mover(&self) -> bool {
        matches!(
            self,
            BoardObjectKind::Player
                | BoardObjectKind::Hazard {
                    kind: HazardKind::Enemy,
                    ..
                }
        )
    }
}

/// Any entity on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardObject {
    pub id: ObjectId,
    pub kind: BoardObjectKind,
    /// Channel currently traversed (traversal reference, not ownership)
    pub channel: ChannelId,
    /// Mid node this object spawned on; cleared from the node on removal
    pub spawn_node: Option<NodeId>,
    pub direction: TravelDirection,
    /// Scalar speed along `heading`, world units per second
    pub speed: f32,
    pub pos: Vec2,
    /// Unit forward vector
    pub heading: Vec2,
}

impl BoardObject {
    /// Factory: bind a freshly spawned object to a channel's Mid node.
    ///
    /// Positions the object on the node, marks the node occupied and
    /// orients the object along its travel direction. If the node is
    /// already occupied the refusal is logged upstream and the object
    /// spawns unbound (`spawn_node: None`), so destroying it can never
    /// clear another object's occupancy.
    pub fn init_for_channel_node(
        id: ObjectId,
        kind: BoardObjectKind,
        wheel: &mut Wheel,
        channel: ChannelId,
        direction: TravelDirection,
        speed: f32,
    ) -> Self {
        let node = NodeId {
            channel,
            slot: NodeSlot::Mid,
        };
        let bound = wheel
            .channel_mut(channel)
            .node_mut(NodeSlot::Mid)
            .set_occupant(id);
        let pos = wheel.node_pos(node);
        let heading = lane_heading(wheel, channel, direction);
        Self {
            id,
            kind,
            channel,
            spawn_node: bound.then_some(node),
            direction,
            speed,
            pos,
            heading,
        }
    }

    /// Reverse orientation in place (generic bounce, bumper deflection).
    pub fn reverse(&mut self) {
        self.heading = -self.heading;
        self.direction = self.direction.reversed();
    }
}

/// Unit vector along a channel's lane axis for a travel direction.
pub fn lane_heading(wheel: &Wheel, channel: ChannelId, direction: TravelDirection) -> Vec2 {
    let ring = wheel.ring(channel.ring);
    let theta = ring.channel_angle(channel.index);
    let outward = Vec2::new(theta.cos(), theta.sin());
    match direction {
        TravelDirection::Outward => outward,
        TravelDirection::Inward => -outward,
    }
}

/// Transient player-only state: inventory queues, the active shield, the
/// glue countdown and the hazard hit-debounce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// FIFO of queued shields, popped on explicit activation
    pub queued_shields: VecDeque<ShieldKind>,
    /// FIFO of queued facet collectors, popped on explicit activation
    pub queued_collectors: VecDeque<()>,
    /// At most one shield instance is live at a time
    pub active_shield: Option<ShieldKind>,
    /// Facet carried toward a color-match bumper
    pub carried_facet: Option<FacetColor>,
    /// Remaining glue immobilization (seconds)
    pub glue_timer: f32,
    /// Speed to restore when the glue timer runs out
    pub stashed_speed: f32,
    /// Hazard skipped by interaction handling until physical separation
    pub ignored_hazard: Option<ObjectId>,
}

impl PlayerState {
    /// Queue a shield pickup. Full queue: the pickup is not consumed.
    pub fn queue_shield(&mut self, kind: ShieldKind) -> bool {
        if self.queued_shields.len() >= MAX_INVENTORY {
            return false;
        }
        self.queued_shields.push_back(kind);
        true
    }

    /// Queue a facet collector pickup. Full queue: not consumed.
    pub fn queue_collector(&mut self) -> bool {
        if self.queued_collectors.len() >= MAX_INVENTORY {
            return false;
        }
        self.queued_collectors.push_back(());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::graph::{RingSpec, expected_channels};

    fn test_wheel() -> Wheel {
        Wheel::build(&[RingSpec {
            channels: expected_channels(0),
            rotation_speed_deg: 0.0,
        }])
        .unwrap()
    }

    #[test]
    fn test_factory_occupies_mid_node() {
        let mut wheel = test_wheel();
        let channel = ChannelId { ring: 0, index: 2 };
        let obj = BoardObject::init_for_channel_node(
            1,
            BoardObjectKind::Facet {
                color: FacetColor::Red,
            },
            &mut wheel,
            channel,
            TravelDirection::Outward,
            0.0,
        );
        assert_eq!(
            wheel.channel(channel).node(NodeSlot::Mid).occupant(),
            Some(1)
        );
        assert_eq!(obj.spawn_node.unwrap().slot, NodeSlot::Mid);
        let mid = wheel.node_pos(obj.spawn_node.unwrap());
        assert!((obj.pos - mid).length() < 1e-3);
    }

    #[test]
    fn test_mover_classification() {
        assert!(BoardObjectKind::Player.is_mover());
        assert!(
            BoardObjectKind::Hazard {
                kind: HazardKind::Enemy,
                effect_time: 0.0
            }
            .is_mover()
        );
        assert!(
            !BoardObjectKind::Hazard {
                kind: HazardKind::Glue,
                effect_time: 2.0
            }
            .is_mover()
        );
        assert!(
            !BoardObjectKind::Facet {
                color: FacetColor::Blue
            }
            .is_mover()
        );
    }

    #[test]
    fn test_reverse_flips_heading_and_direction() {
        let mut wheel = test_wheel();
        let mut obj = BoardObject::init_for_channel_node(
            1,
            BoardObjectKind::Player,
            &mut wheel,
            ChannelId { ring: 0, index: 0 },
            TravelDirection::Outward,
            100.0,
        );
        let heading = obj.heading;
        obj.reverse();
        assert_eq!(obj.direction, TravelDirection::Inward);
        assert!((obj.heading + heading).length() < 1e-6);
    }

    #[test]
    fn test_inventory_queue_bounds() {
        let mut player = PlayerState::default();
        for _ in 0..MAX_INVENTORY {
            assert!(player.queue_shield(ShieldKind::Hit));
        }
        assert!(!player.queue_shield(ShieldKind::SingleKill));
        assert_eq!(player.queued_shields.len(), MAX_INVENTORY);
    }
}
