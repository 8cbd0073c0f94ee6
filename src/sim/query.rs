//! Host overlap-query boundary
//!
//! The core never implements spatial partitioning; each tick it asks the
//! host what sits near a mover and classifies the returned handles. The
//! `BruteForceQuery` below is the reference implementation used by the
//! headless demo and the test suite - real hosts plug in their own index.

use glam::Vec2;

use crate::board::{BoardObject, BumperId, GateSlot, NodeId, NodeSlot, ObjectId, Wheel};

/// What a collider handle resolves to. `Wall` is the layer tag for
/// blocking geometry (active gates); everything else is a gameplay entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderKind {
    Node(NodeId),
    Bumper(BumperId),
    Object(ObjectId),
    Wall,
}

/// One overlap result: where it is and what it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub pos: Vec2,
    pub kind: ColliderKind,
}

/// Host-provided spatial query.
pub trait OverlapQuery {
    /// Everything within `radius` of `pos`. Order is not significant; the
    /// resolver applies its own priority and nearest-first rules.
    fn query_nearby(
        &self,
        wheel: &Wheel,
        objects: &[BoardObject],
        pos: Vec2,
        radius: f32,
    ) -> Vec<Collider>;
}

/// Reference implementation: a full scan over the wheel's geometry and the
/// object arena. Fine for tests and the demo; hosts should do better.
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteForceQuery;

impl OverlapQuery for BruteForceQuery {
    fn query_nearby(
        &self,
        wheel: &Wheel,
        objects: &[BoardObject],
        pos: Vec2,
        radius: f32,
    ) -> Vec<Collider> {
        let mut hits = Vec::new();
        let within = |p: Vec2| (p - pos).length() <= radius;

        for ring in wheel.rings().iter().filter(|r| r.active) {
            for channel in ring.channels() {
                for slot in [NodeSlot::Start, NodeSlot::Mid, NodeSlot::End] {
                    let node = NodeId {
                        channel: channel.id,
                        slot,
                    };
                    let p = wheel.node_pos(node);
                    if within(p) {
                        hits.push(Collider {
                            pos: p,
                            kind: ColliderKind::Node(node),
                        });
                    }
                }
                for slot in [GateSlot::Inner, GateSlot::Outer] {
                    if channel.gate(slot).active {
                        let p = wheel.gate_pos(channel.id, slot);
                        if within(p) {
                            hits.push(Collider {
                                pos: p,
                                kind: ColliderKind::Wall,
                            });
                        }
                    }
                }
            }

            if let Some(group) = &ring.bumpers {
                if group.active {
                    for index in 0..group.bumpers.len() {
                        let id = BumperId {
                            ring: ring.index,
                            index,
                        };
                        let p = wheel.bumper_pos(id);
                        if within(p) {
                            hits.push(Collider {
                                pos: p,
                                kind: ColliderKind::Bumper(id),
                            });
                        }
                    }
                }
            }
        }

        for obj in objects {
            if within(obj.pos) {
                hits.push(Collider {
                    pos: obj.pos,
                    kind: ColliderKind::Object(obj.id),
                });
            }
        }

        hits
    }
}
