//! Puzzle snapshot/restore
//!
//! The persisted blob is a serde_json rendering of `PuzzleSaveData`. A
//! snapshot captures only reconstructable state: gate flags, mid-node
//! objects, bumper types and the player's lane - never topology shape.
//! Restore requires an already-built wheel and runs as an explicit
//! two-step protocol:
//!
//! 1. `reconstruct_topology` - blank-slate the wheel (all gates on, no
//!    occupants), apply ring count/victory condition/gate flags and
//!    instantiate every saved object;
//! 2. `wire_cross_references` - run only once every object exists,
//!    position and orient each one from the now-complete graph (an
//!    enemy's facing needs its channel's Start/End nodes resolved).
//!
//! The two passes are structural, not an accident of loop ordering: a
//! single pass cannot express "look at my neighbor" initialization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::object::lane_heading;
use crate::board::{
    BoardObjectKind, BumperKind, FacetColor, GateSlot, HazardKind, NodeId, NodeSlot,
    PointModKind, ShieldKind, SpeedModKind, TravelDirection,
};
use crate::sim::tick::Game;
use crate::sim::victory::VictoryCondition;

/// Minimal reconstructable fields of one saved board object, keyed by the
/// object's type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectPayload {
    Facet {
        color: FacetColor,
    },
    Hazard {
        kind: HazardKind,
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

/// One saved board object: shared traversal fields plus the typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardObjectSave {
    /// Owning channel, by generated name
    pub channel: String,
    pub direction: TravelDirection,
    pub speed: f32,
    pub payload: ObjectPayload,
}

/// One saved channel, in name order within its ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSave {
    pub channel: String,
    pub inner_active: bool,
    pub outer_active: bool,
    pub mid_object: Option<BoardObjectSave>,
}

/// One saved bumper; the kind carries the target color for color-match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumperSave {
    pub kind: BumperKind,
}

/// One saved ring. `bumpers` is absent for the hub ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingSave {
    pub rotation_speed_deg: f32,
    pub channels: Vec<ChannelSave>,
    pub bumpers: Option<Vec<BumperSave>>,
}

/// Saved player lane state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSave {
    pub channel: String,
    pub direction: TravelDirection,
    pub speed: f32,
}

/// The persisted snapshot of an entire puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleSaveData {
    pub name: String,
    pub victory_condition: VictoryCondition,
    pub active_rings: usize,
    pub rings: Vec<RingSave>,
    pub player: PlayerSave,
}

/// Fatal restore configuration errors. Validation runs before any
/// mutation, so a failed restore leaves prior state intact.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("save has {found} rings, wheel has {expected}")]
    RingCountMismatch { expected: usize, found: usize },
    #[error("ring {ring}: save has {found} channels, wheel has {expected}")]
    ChannelCountMismatch {
        ring: usize,
        expected: usize,
        found: usize,
    },
    #[error("ring {ring}: save has {found} bumpers, wheel has {expected}")]
    BumperCountMismatch {
        ring: usize,
        expected: usize,
        found: usize,
    },
    #[error("save channel '{found}' does not match wheel channel '{expected}'")]
    ChannelNameMismatch { expected: String, found: String },
    #[error("unknown channel '{name}' in save data")]
    UnknownChannel { name: String },
    #[error("active ring count {found} out of range 1..={max}")]
    ActiveRingsOutOfRange { max: usize, found: usize },
    #[error("malformed save blob: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot the whole puzzle: rings outward from the hub, channels and
/// bumpers in name order within each ring.
pub fn snapshot(game: &Game) -> PuzzleSaveData {
    let mut rings = Vec::with_capacity(game.wheel.rings().len());
    for ring in game.wheel.rings() {
        let channels = game
            .wheel
            .channels_of(ring.index)
            .iter()
            .map(|channel| ChannelSave {
                channel: channel.name().to_string(),
                inner_active: channel.gate(GateSlot::Inner).active,
                outer_active: channel.gate(GateSlot::Outer).active,
                mid_object: channel
                    .node(NodeSlot::Mid)
                    .occupant()
                    .and_then(|id| game.object(id))
                    .and_then(|obj| {
                        payload_of(&obj.kind).map(|payload| BoardObjectSave {
                            channel: channel.name().to_string(),
                            direction: obj.direction,
                            speed: obj.speed,
                            payload,
                        })
                    }),
            })
            .collect();
        rings.push(RingSave {
            rotation_speed_deg: ring.rotation_speed_deg,
            channels,
            bumpers: ring.bumpers.as_ref().map(|group| {
                group
                    .bumpers
                    .iter()
                    .map(|b| BumperSave { kind: b.kind })
                    .collect()
            }),
        });
    }

    let player = game.player_obj();
    PuzzleSaveData {
        name: game.name.clone(),
        victory_condition: game.tracker.condition,
        active_rings: game.wheel.active_rings,
        rings,
        player: PlayerSave {
            channel: game.wheel.channel(player.channel).name().to_string(),
            direction: player.direction,
            speed: player.speed,
        },
    }
}

/// Restore a snapshot into an already-built game. Two-pass: see the
/// module docs. Configuration mismatches abort before any mutation.
pub fn restore(game: &mut Game, data: &PuzzleSaveData) -> Result<(), RestoreError> {
    validate(game, data)?;
    reconstruct_topology(game, data)?;
    wire_cross_references(game);
    game.set_initial(data.clone());
    log::info!(
        "restored puzzle '{}' ({} rings active)",
        data.name,
        data.active_rings
    );
    Ok(())
}

/// Serialize a snapshot to the persisted JSON form.
pub fn to_json(data: &PuzzleSaveData) -> Result<String, RestoreError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Parse the persisted JSON form.
pub fn from_json(blob: &str) -> Result<PuzzleSaveData, RestoreError> {
    Ok(serde_json::from_str(blob)?)
}

/// Everything that can fail is checked here, before `reconstruct_topology`
/// touches the wheel.
fn validate(game: &Game, data: &PuzzleSaveData) -> Result<(), RestoreError> {
    let rings = game.wheel.rings();
    if data.rings.len() != rings.len() {
        return Err(RestoreError::RingCountMismatch {
            expected: rings.len(),
            found: data.rings.len(),
        });
    }
    if data.active_rings == 0 || data.active_rings > rings.len() {
        return Err(RestoreError::ActiveRingsOutOfRange {
            max: rings.len(),
            found: data.active_rings,
        });
    }
    for (ring, save) in rings.iter().zip(&data.rings) {
        let channels = game.wheel.channels_of(ring.index);
        if save.channels.len() != channels.len() {
            return Err(RestoreError::ChannelCountMismatch {
                ring: ring.index,
                expected: channels.len(),
                found: save.channels.len(),
            });
        }
        for (channel, channel_save) in channels.iter().zip(&save.channels) {
            if channel.name() != channel_save.channel {
                return Err(RestoreError::ChannelNameMismatch {
                    expected: channel.name().to_string(),
                    found: channel_save.channel.clone(),
                });
            }
        }
        // A missing bumper list on a ring that has one (or vice versa) is
        // as fatal as a wrong count; pass 1 must never inherit stale kinds
        match (&ring.bumpers, &save.bumpers) {
            (Some(group), Some(bumpers)) if bumpers.len() == group.bumpers.len() => {}
            (None, None) => {}
            (group, bumpers) => {
                return Err(RestoreError::BumperCountMismatch {
                    ring: ring.index,
                    expected: group.as_ref().map_or(0, |g| g.bumpers.len()),
                    found: bumpers.as_ref().map_or(0, |b| b.len()),
                });
            }
        }
    }
    if game.wheel.channel_by_name(&data.player.channel).is_none() {
        return Err(RestoreError::UnknownChannel {
            name: data.player.channel.clone(),
        });
    }
    Ok(())
}

/// Pass 1: blank slate, then recreate gate states, objects and bumpers.
fn reconstruct_topology(game: &mut Game, data: &PuzzleSaveData) -> Result<(), RestoreError> {
    game.objects.clear();
    game.wheel.clear_occupants();
    game.wheel.reset_gates();
    game.reset_transients();
    game.name = data.name.clone();
    game.tracker.reset(data.victory_condition);
    game.wheel.toggle_rings_active(data.active_rings);

    for (ring_index, ring_save) in data.rings.iter().enumerate() {
        {
            let ring = game.wheel.ring_mut(ring_index);
            ring.rotation_speed_deg = ring_save.rotation_speed_deg;
            ring.angle = 0.0;
            if let (Some(group), Some(saved)) = (&mut ring.bumpers, &ring_save.bumpers) {
                for (bumper, save) in group.bumpers.iter_mut().zip(saved) {
                    bumper.kind = save.kind;
                }
            }
        }

        for (index, channel_save) in ring_save.channels.iter().enumerate() {
            let id = crate::board::ChannelId {
                ring: ring_index,
                index,
            };
            let channel = game.wheel.channel_mut(id);
            channel.gate_mut(GateSlot::Inner).active = channel_save.inner_active;
            channel.gate_mut(GateSlot::Outer).active = channel_save.outer_active;

            if let Some(saved) = &channel_save.mid_object {
                let _ = game.spawn_object(
                    kind_of(&saved.payload),
                    id,
                    saved.direction,
                    saved.speed,
                );
            }
        }
    }

    let player_channel = game
        .wheel
        .channel_by_name(&data.player.channel)
        .ok_or_else(|| RestoreError::UnknownChannel {
            name: data.player.channel.clone(),
        })?;
    let _ = game.spawn_player(player_channel, data.player.direction, data.player.speed);
    Ok(())
}

/// Pass 2: every object from the snapshot now exists, so sibling-dependent
/// initialization (lane positions, enemy facing) can resolve.
fn wire_cross_references(game: &mut Game) {
    let wheel = &game.wheel;
    for obj in &mut game.objects {
        let node = obj.spawn_node.unwrap_or(NodeId {
            channel: obj.channel,
            slot: NodeSlot::Mid,
        });
        obj.pos = wheel.node_pos(node);
        obj.heading = lane_heading(wheel, obj.channel, obj.direction);
    }
}

/// Payload for a persistable object kind; the player is saved separately.
fn payload_of(kind: &BoardObjectKind) -> Option<ObjectPayload> {
    match *kind {
        BoardObjectKind::Player => None,
        BoardObjectKind::Facet { color } => Some(ObjectPayload::Facet { color }),
        BoardObjectKind::Hazard { kind, effect_time } => {
            Some(ObjectPayload::Hazard { kind, effect_time })
        }
        BoardObjectKind::FacetCollect => Some(ObjectPayload::FacetCollect),
        BoardObjectKind::Shield { kind } => Some(ObjectPayload::Shield { kind }),
        BoardObjectKind::SpeedMod { kind, magnitude } => {
            Some(ObjectPayload::SpeedMod { kind, magnitude })
        }
        BoardObjectKind::PointMod {
            kind,
            value,
            duration,
        } => Some(ObjectPayload::PointMod {
            kind,
            value,
            duration,
        }),
    }
}

fn kind_of(payload: &ObjectPayload) -> BoardObjectKind {
    match *payload {
        ObjectPayload::Facet { color } => BoardObjectKind::Facet { color },
        ObjectPayload::Hazard { kind, effect_time } => {
            BoardObjectKind::Hazard { kind, effect_time }
        }
        ObjectPayload::FacetCollect => BoardObjectKind::FacetCollect,
        ObjectPayload::Shield { kind } => BoardObjectKind::Shield { kind },
        ObjectPayload::SpeedMod { kind, magnitude } => {
            BoardObjectKind::SpeedMod { kind, magnitude }
        }
        ObjectPayload::PointMod {
            kind,
            value,
            duration,
        } => BoardObjectKind::PointMod {
            kind,
            value,
            duration,
        },
    }
}
