//! Fixed timestep simulation tick
//!
//! The motion/collision resolver. Each fixed tick every mover (the player
//! and mobile hazards) advances along its channel's lane axis, then the
//! host overlap query is classified and resolved in fixed priority order:
//! channel transition, generic bounce, bumpers, typed interactions.

use glam::Vec2;

use super::events::{EffectKind, GameEndReason, Presenter, SoundCue};
use super::query::{Collider, ColliderKind, OverlapQuery};
use super::victory::{VictoryCondition, VictoryTracker};
use crate::board::object::lane_heading;
use crate::board::{
    BoardObject, BoardObjectKind, BumperKind, ChannelId, FacetColor, HazardKind, NodeSlot,
    ObjectId, PlayerState, PointModKind, RingSpec, ShieldKind, SpeedModKind, TravelDirection,
    Wheel,
};
use crate::consts::*;
use crate::persistence::{self, PuzzleSaveData};
use crate::{cartesian_to_polar, normalize_angle, rotate_vec};

/// Current phase of gameplay. Every per-tick operation is gated on this;
/// entering `GameOver` halts movement and interactions from the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Built and loaded, waiting for start
    PreGame,
    /// Active play
    Running,
    /// Run ended (death or victory)
    GameOver,
}

/// Input commands for a single tick (deterministic).
///
/// Drag fields are sampled by the variable-rate `update`; the rest are
/// consumed once by the next fixed tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Finger/cursor landed on a ring
    pub ring_touch_begin: Option<(usize, Vec2)>,
    /// Finger/cursor moved while dragging
    pub ring_touch_drag: Option<Vec2>,
    /// Drag released
    pub ring_touch_end: bool,
    /// Pop and apply the oldest queued shield
    pub activate_shield: bool,
    /// Pop and apply the oldest queued facet collector
    pub activate_collector: bool,
    /// Leave PreGame
    pub start: bool,
    /// Restore the initial puzzle snapshot
    pub reset: bool,
}

/// In-flight ring drag (variable-rate input state).
#[derive(Debug, Clone, Copy)]
struct DragState {
    ring: usize,
    last_theta: f32,
}

/// Complete game: the wheel, the object arena and all per-run state.
#[derive(Debug, Clone)]
pub struct Game {
    pub name: String,
    pub wheel: Wheel,
    /// Active board objects, sorted by id for deterministic iteration
    pub objects: Vec<BoardObject>,
    pub player_id: ObjectId,
    pub player: PlayerState,
    pub tracker: VictoryTracker,
    pub score: u64,
    pub phase: GamePhase,
    pub time_ticks: u64,
    /// Point-multiplier window
    multiplier_value: u64,
    multiplier_timer: f32,
    /// Manual ring rotation accumulated by `update`, applied next tick
    pending_spin: Vec<f32>,
    drag: Option<DragState>,
    /// Snapshot restored on reset
    initial: Option<PuzzleSaveData>,
    next_id: ObjectId,
}

impl Game {
    /// Create a game around a built wheel, with the player on the hub
    /// ring's first channel.
    pub fn new(name: impl Into<String>, wheel: Wheel, condition: VictoryCondition) -> Self {
        let ring_count = wheel.rings().len();
        let mut game = Self {
            name: name.into(),
            wheel,
            objects: Vec::new(),
            player_id: 0,
            player: PlayerState::default(),
            tracker: VictoryTracker::new(condition),
            score: 0,
            phase: GamePhase::PreGame,
            time_ticks: 0,
            multiplier_value: 1,
            multiplier_timer: 0.0,
            pending_spin: vec![0.0; ring_count],
            drag: None,
            initial: None,
            next_id: 1,
        };
        game.player_id = game.spawn_player(
            ChannelId { ring: 0, index: 0 },
            TravelDirection::Outward,
            PLAYER_BASE_SPEED,
        );
        game
    }

    /// Convenience: a default wheel of `rings` rings.
    pub fn with_rings(
        name: impl Into<String>,
        rings: usize,
        condition: VictoryCondition,
    ) -> Result<Self, crate::board::BuildError> {
        let specs: Vec<_> = (0..rings)
            .map(|i| RingSpec {
                channels: crate::board::graph::expected_channels(i),
                rotation_speed_deg: 0.0,
            })
            .collect();
        Ok(Self::new(name, Wheel::build(&specs)?, condition))
    }

    fn alloc_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place the player on a channel's Mid node. The player never claims
    /// node occupancy; that is reserved for spawned board objects.
    pub fn spawn_player(
        &mut self,
        channel: ChannelId,
        direction: TravelDirection,
        speed: f32,
    ) -> ObjectId {
        let id = self.alloc_id();
        let node = crate::board::NodeId {
            channel,
            slot: NodeSlot::Mid,
        };
        let pos = self.wheel.node_pos(node);
        let heading = lane_heading(&self.wheel, channel, direction);
        self.objects.push(BoardObject {
            id,
            kind: BoardObjectKind::Player,
            channel,
            spawn_node: None,
            direction,
            speed,
            pos,
            heading,
        });
        self.player_id = id;
        self.normalize_order();
        id
    }

    /// Spawn a board object bound to a channel's Mid node.
    pub fn spawn_object(
        &mut self,
        kind: BoardObjectKind,
        channel: ChannelId,
        direction: TravelDirection,
        speed: f32,
    ) -> ObjectId {
        let id = self.alloc_id();
        if let BoardObjectKind::Facet { color } = kind {
            self.tracker.register_spawn(color);
        }
        let obj =
            BoardObject::init_for_channel_node(id, kind, &mut self.wheel, channel, direction, speed);
        self.objects.push(obj);
        self.normalize_order();
        id
    }

    /// Record the current state as the puzzle's reset point.
    pub fn commit_initial(&mut self) {
        self.initial = Some(persistence::snapshot(self));
    }

    pub(crate) fn set_initial(&mut self, data: PuzzleSaveData) {
        self.initial = Some(data);
    }

    pub fn object(&self, id: ObjectId) -> Option<&BoardObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut BoardObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn player_obj(&self) -> &BoardObject {
        self.object(self.player_id)
            .expect("player object always present")
    }

    /// Ensure deterministic iteration order.
    fn normalize_order(&mut self) {
        self.objects.sort_by_key(|o| o.id);
    }

    /// Variable-rate update: raw drag sampling only. Deltas accumulate in
    /// `pending_spin` and take effect on the next fixed tick, keeping all
    /// graph mutation on the tick thread.
    pub fn update(&mut self, input: &TickInput) {
        if let Some((ring, pos)) = input.ring_touch_begin {
            if ring < self.wheel.rings().len() && self.wheel.ring(ring).active {
                let (_, theta) = cartesian_to_polar(pos);
                self.drag = Some(DragState {
                    ring,
                    last_theta: theta,
                });
            }
        }
        if let Some(pos) = input.ring_touch_drag {
            if let Some(drag) = &mut self.drag {
                let (_, theta) = cartesian_to_polar(pos);
                let delta = normalize_angle(theta - drag.last_theta);
                drag.last_theta = theta;
                self.pending_spin[drag.ring] += delta;
            }
        }
        if input.ring_touch_end {
            self.drag = None;
        }
    }

    /// Advance the game by one fixed timestep.
    pub fn tick(
        &mut self,
        input: &TickInput,
        dt: f32,
        query: &impl OverlapQuery,
        presenter: &mut impl Presenter,
    ) {
        if input.reset {
            self.reset_puzzle();
        }
        if input.start && self.phase == GamePhase::PreGame {
            log::info!("puzzle '{}' started", self.name);
            self.phase = GamePhase::Running;
        }
        if self.phase != GamePhase::Running {
            return;
        }

        self.time_ticks += 1;

        if input.activate_shield {
            self.activate_shield();
        }
        if input.activate_collector {
            self.activate_collector(presenter);
        }

        self.rotate_rings(dt);
        self.run_countdowns(dt);

        // Movers in id order; the player holds the lowest id
        let movers: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| o.kind.is_mover())
            .map(|o| o.id)
            .collect();
        for id in movers {
            if self.phase != GamePhase::Running {
                break;
            }
            self.advance_mover(id, dt, query, presenter);
        }

        self.clear_separated_hazard();
        self.normalize_order();
    }

    /// Auto-rotation plus accumulated manual drag; everything riding a
    /// ring (movers and spawned objects alike) co-rotates with it.
    fn rotate_rings(&mut self, dt: f32) {
        for ring_index in 0..self.wheel.rings().len() {
            let ring = self.wheel.ring_mut(ring_index);
            if !ring.active {
                continue;
            }
            let delta =
                ring.rotation_speed_deg.to_radians() * dt + self.pending_spin[ring_index];
            self.pending_spin[ring_index] = 0.0;
            if delta == 0.0 {
                continue;
            }
            ring.angle = normalize_angle(ring.angle + delta);
            for obj in &mut self.objects {
                if obj.channel.ring == ring_index {
                    obj.pos = rotate_vec(obj.pos, delta);
                    obj.heading = rotate_vec(obj.heading, delta);
                }
            }
        }
    }

    /// Glue and point-multiplier windows are plain countdowns re-checked
    /// once per tick; nothing in the core spans ticks any other way.
    fn run_countdowns(&mut self, dt: f32) {
        if self.player.glue_timer > 0.0 {
            self.player.glue_timer -= dt;
            if self.player.glue_timer <= 0.0 {
                self.player.glue_timer = 0.0;
                let speed = self.player.stashed_speed;
                let id = self.player_id;
                if let Some(player) = self.object_mut(id) {
                    player.speed = speed;
                }
            }
        }
        if self.multiplier_timer > 0.0 {
            self.multiplier_timer -= dt;
            if self.multiplier_timer <= 0.0 {
                self.multiplier_timer = 0.0;
                self.multiplier_value = 1;
            }
        }
    }

    /// One mover, one tick: cruise forward, then classify the overlap set.
    fn advance_mover(
        &mut self,
        id: ObjectId,
        dt: f32,
        query: &impl OverlapQuery,
        presenter: &mut impl Presenter,
    ) {
        // May have been destroyed earlier this tick
        let Some(mover) = self.object(id) else {
            return;
        };
        let is_player = id == self.player_id;
        let channel = mover.channel;
        let new_pos = mover.pos + mover.heading * mover.speed * dt;
        let heading = mover.heading;

        if let Some(mover) = self.object_mut(id) {
            mover.pos = new_pos;
        }

        let colliders = query.query_nearby(&self.wheel, &self.objects, new_pos, OVERLAP_RADIUS);

        // 1. Channel transition: eligible nodes of a different channel,
        // ahead of the mover, nearest first.
        let transitioned = self.try_channel_transition(id, channel, new_pos, heading, &colliders);

        // 2. Generic bounce, suppressed by a transition this tick (the
        // transition already repositioned the mover; bouncing against the
        // stale position would be wrong).
        if !transitioned {
            let wall_ahead = colliders
                .iter()
                .any(|c| c.kind == ColliderKind::Wall && (c.pos - new_pos).dot(heading) > 0.0);
            if wall_ahead {
                if let Some(mover) = self.object_mut(id) {
                    mover.reverse();
                }
                presenter.sound_triggered(SoundCue::Bounce);
            }
        }

        // 3. Bumpers: resolved by type; any hit reverses the mover.
        for collider in &colliders {
            let ColliderKind::Bumper(bumper_id) = collider.kind else {
                continue;
            };
            let kind = self.wheel.ring(bumper_id.ring).bumpers.as_ref().map(|g| {
                g.bumpers[bumper_id.index].kind
            });
            let Some(kind) = kind else { continue };

            presenter.effect_triggered(EffectKind::BumperHit, collider.pos);
            presenter.sound_triggered(SoundCue::Bumper);
            match kind {
                BumperKind::Death => {
                    self.end_game(GameEndReason::DeathBumper, presenter);
                }
                BumperKind::ColorMatch(color) => {
                    if is_player
                        && self.tracker.condition == VictoryCondition::ColorMatch
                        && self.player.carried_facet == Some(color)
                    {
                        self.match_carried_facet(color, presenter);
                    }
                }
                BumperKind::Regular => {}
            }
            if let Some(mover) = self.object_mut(id) {
                mover.reverse();
            }
            break;
        }

        // 4. Typed interactions, player only.
        if is_player && self.phase == GamePhase::Running {
            for collider in &colliders {
                if self.phase != GamePhase::Running {
                    break;
                }
                let ColliderKind::Object(other) = collider.kind else {
                    continue;
                };
                if other == id || self.player.ignored_hazard == Some(other) {
                    continue;
                }
                self.interact(other, presenter);
            }
        }
    }

    /// Step 1 of the resolver. Returns true when the mover changed channel.
    fn try_channel_transition(
        &mut self,
        id: ObjectId,
        current: ChannelId,
        pos: Vec2,
        heading: Vec2,
        colliders: &[Collider],
    ) -> bool {
        let mut candidates: Vec<(crate::board::NodeId, Vec2, f32)> = colliders
            .iter()
            .filter_map(|c| match c.kind {
                ColliderKind::Node(node)
                    if node.channel != current
                        && self.wheel.can_be_on_path(node)
                        && (c.pos - pos).dot(heading) > 0.0 =>
                {
                    Some((node, c.pos, (c.pos - pos).length()))
                }
                _ => None,
            })
            .collect();
        if candidates.is_empty() {
            return false;
        }
        if candidates.len() > 1 {
            // Invariant violation: resolved by the deterministic
            // nearest-first fallback, the game stays playable
            log::warn!(
                "{} transition targets for object {id}, taking nearest",
                candidates.len()
            );
        }
        candidates.sort_by(|a, b| a.2.total_cmp(&b.2));
        let (node, node_pos, _) = candidates[0];

        // Face away from the node just entered: toward End when entering
        // via Start, toward Start otherwise
        let direction = match node.slot {
            NodeSlot::Start => TravelDirection::Outward,
            NodeSlot::Mid | NodeSlot::End => TravelDirection::Inward,
        };
        let heading = lane_heading(&self.wheel, node.channel, direction);
        if let Some(mover) = self.object_mut(id) {
            mover.channel = node.channel;
            mover.pos = node_pos;
            mover.direction = direction;
            mover.heading = heading;
        }
        true
    }

    /// Step 4 dispatch, keyed on the closed object-kind tag.
    fn interact(&mut self, other: ObjectId, presenter: &mut impl Presenter) {
        let Some(obj) = self.object(other) else {
            return;
        };
        let pos = obj.pos;
        match obj.kind {
            BoardObjectKind::Player => {}
            BoardObjectKind::Facet { color } => self.touch_facet(other, color, pos, presenter),
            BoardObjectKind::Hazard { kind, effect_time } => {
                self.touch_hazard(other, kind, effect_time, pos, presenter)
            }
            BoardObjectKind::Shield { kind } => {
                if self.player.queue_shield(kind) {
                    self.destroy_object(other);
                    self.award_points(PICKUP_POINTS, presenter);
                    presenter.sound_triggered(SoundCue::Pickup);
                }
                // Full queue: the pickup stays on the board
            }
            BoardObjectKind::FacetCollect => {
                if self.player.queue_collector() {
                    self.destroy_object(other);
                    self.award_points(PICKUP_POINTS, presenter);
                    presenter.sound_triggered(SoundCue::Pickup);
                }
            }
            BoardObjectKind::PointMod {
                kind,
                value,
                duration,
            } => {
                self.destroy_object(other);
                match kind {
                    PointModKind::ExtraPoints => self.award_points(value, presenter),
                    PointModKind::PointsMultiplier => {
                        self.multiplier_value = value.max(1);
                        self.multiplier_timer = duration;
                    }
                }
                presenter.sound_triggered(SoundCue::Pickup);
            }
            BoardObjectKind::SpeedMod { kind, magnitude } => {
                self.destroy_object(other);
                self.apply_speed_mod(kind, magnitude);
                self.award_points(MOD_POINTS, presenter);
                presenter.sound_triggered(SoundCue::Pickup);
            }
        }
    }

    fn touch_facet(
        &mut self,
        id: ObjectId,
        color: FacetColor,
        pos: Vec2,
        presenter: &mut impl Presenter,
    ) {
        match self.tracker.condition {
            VictoryCondition::Collection => {
                self.destroy_object(id);
                self.count_and_check(color, pos, EffectKind::FacetPickup, presenter);
            }
            VictoryCondition::ColorMatch => {
                // One carried facet at a time; it rides the player until
                // matched at a same-color bumper
                if self.player.carried_facet.is_none() {
                    self.destroy_object(id);
                    self.player.carried_facet = Some(color);
                    presenter.sound_triggered(SoundCue::Pickup);
                }
            }
        }
    }

    fn touch_hazard(
        &mut self,
        id: ObjectId,
        kind: HazardKind,
        effect_time: f32,
        pos: Vec2,
        presenter: &mut impl Presenter,
    ) {
        if let Some(shield) = self.player.active_shield {
            self.player.active_shield = None;
            match shield {
                ShieldKind::Hit => {
                    // Debounced until the colliders physically separate;
                    // no points for the hazard itself
                    self.player.ignored_hazard = Some(id);
                    presenter.effect_triggered(EffectKind::ShieldBreak, pos);
                }
                ShieldKind::SingleKill => {
                    self.destroy_object(id);
                    presenter.effect_triggered(EffectKind::HazardKilled, pos);
                }
            }
            return;
        }

        match kind {
            HazardKind::Enemy => self.end_game(GameEndReason::KilledByEnemy, presenter),
            HazardKind::Dynamite => self.end_game(GameEndReason::KilledByDynamite, presenter),
            HazardKind::Glue => {
                let player_id = self.player_id;
                if self.player.glue_timer <= 0.0 {
                    let speed = self.player_obj().speed;
                    self.player.stashed_speed = speed;
                    if let Some(player) = self.object_mut(player_id) {
                        player.speed = 0.0;
                    }
                }
                self.player.glue_timer = effect_time;
                self.destroy_object(id);
                presenter.effect_triggered(EffectKind::GlueSplash, pos);
            }
        }
    }

    fn apply_speed_mod(&mut self, kind: SpeedModKind, magnitude: f32) {
        match kind {
            SpeedModKind::PlayerSpeed => {
                if self.player.glue_timer > 0.0 {
                    self.player.stashed_speed = (self.player.stashed_speed + magnitude).max(0.0);
                } else {
                    let id = self.player_id;
                    if let Some(player) = self.object_mut(id) {
                        player.speed = (player.speed + magnitude).max(0.0);
                    }
                }
            }
            SpeedModKind::EnemySpeed => {
                for obj in &mut self.objects {
                    if matches!(
                        obj.kind,
                        BoardObjectKind::Hazard {
                            kind: HazardKind::Enemy,
                            ..
                        }
                    ) {
                        obj.speed = (obj.speed + magnitude).max(0.0);
                    }
                }
            }
            SpeedModKind::RingSpeed => {
                let ring = self.player_obj().channel.ring;
                self.wheel.ring_mut(ring).rotation_speed_deg += magnitude;
            }
        }
    }

    /// Count one facet of `color`, notify, award and re-evaluate the win.
    fn count_and_check(
        &mut self,
        color: FacetColor,
        pos: Vec2,
        effect: EffectKind,
        presenter: &mut impl Presenter,
    ) {
        let collected = self.tracker.count_facet(color);
        presenter.facet_count_changed(color, collected);
        presenter.effect_triggered(effect, pos);
        self.award_points(FACET_POINTS, presenter);
        if self.tracker.check_victory() {
            self.end_game(GameEndReason::Victory, presenter);
        }
    }

    fn match_carried_facet(&mut self, color: FacetColor, presenter: &mut impl Presenter) {
        self.player.carried_facet = None;
        let pos = self.player_obj().pos;
        self.count_and_check(color, pos, EffectKind::FacetMatch, presenter);
    }

    /// Pop the oldest queued shield. Empty queue or an already-active
    /// shield: silent no-op.
    fn activate_shield(&mut self) {
        if self.player.active_shield.is_some() {
            return;
        }
        if let Some(kind) = self.player.queued_shields.pop_front() {
            self.player.active_shield = Some(kind);
        }
    }

    /// Pop the oldest queued collector and collect the nearest board
    /// facet through the tracker. Empty queue or no facets: no-op.
    fn activate_collector(&mut self, presenter: &mut impl Presenter) {
        if self.player.queued_collectors.is_empty() {
            return;
        }
        let player_pos = self.player_obj().pos;
        let nearest = self
            .objects
            .iter()
            .filter_map(|o| match o.kind {
                BoardObjectKind::Facet { color } => {
                    Some((o.id, color, o.pos, (o.pos - player_pos).length()))
                }
                _ => None,
            })
            .min_by(|a, b| a.3.total_cmp(&b.3));
        let Some((id, color, pos, _)) = nearest else {
            return;
        };
        let _ = self.player.queued_collectors.pop_front();
        self.destroy_object(id);
        self.count_and_check(color, pos, EffectKind::FacetPickup, presenter);
    }

    /// Remove an object from the arena and clear its spawn node. The node
    /// is only cleared when it still names this object as its occupant.
    pub(crate) fn destroy_object(&mut self, id: ObjectId) {
        if let Some(obj) = self.object(id) {
            if let Some(node) = obj.spawn_node {
                let node_ref = self.wheel.channel_mut(node.channel).node_mut(node.slot);
                if node_ref.occupant() == Some(id) {
                    node_ref.clear_occupant();
                }
            }
        }
        self.objects.retain(|o| o.id != id);
    }

    /// The hit-debounce lives until the player physically separates from
    /// the ignored hazard.
    fn clear_separated_hazard(&mut self) {
        let Some(hazard_id) = self.player.ignored_hazard else {
            return;
        };
        let player_pos = self.player_obj().pos;
        let separated = match self.object(hazard_id) {
            None => true,
            Some(hazard) => {
                (hazard.pos - player_pos).length() > 2.0 * MOVER_RADIUS + SEPARATION_MARGIN
            }
        };
        if separated {
            self.player.ignored_hazard = None;
        }
    }

    /// Award points through the multiplier window.
    fn award_points(&mut self, points: u64, presenter: &mut impl Presenter) {
        let scaled = if self.multiplier_timer > 0.0 {
            points * self.multiplier_value
        } else {
            points
        };
        self.score += scaled;
        presenter.score_changed(self.score);
    }

    /// Transition to GameOver exactly once; later calls are no-ops so a
    /// second lethal overlap in the same tick cannot double-fire.
    fn end_game(&mut self, reason: GameEndReason, presenter: &mut impl Presenter) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        let victory = reason == GameEndReason::Victory;
        log::info!("game over: {} (victory: {victory})", reason.as_str());
        presenter.game_ended(reason, victory);
        presenter.sound_triggered(if victory {
            SoundCue::Victory
        } else {
            SoundCue::Death
        });
    }

    /// Restore the initial snapshot and return to PreGame.
    pub fn reset_puzzle(&mut self) {
        let Some(data) = self.initial.clone() else {
            log::warn!("reset requested but no initial snapshot recorded");
            return;
        };
        if let Err(err) = persistence::restore(self, &data) {
            log::error!("reset failed: {err}");
        }
    }

    /// Drop all per-run transient state (restore pass 1 support).
    pub(crate) fn reset_transients(&mut self) {
        self.phase = GamePhase::PreGame;
        self.score = 0;
        self.time_ticks = 0;
        self.multiplier_value = 1;
        self.multiplier_timer = 0.0;
        self.pending_spin.iter_mut().for_each(|s| *s = 0.0);
        self.drag = None;
        self.player = PlayerState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::NullPresenter;
    use crate::sim::query::BruteForceQuery;

    fn game() -> Game {
        Game::with_rings("test", 2, VictoryCondition::Collection).unwrap()
    }

    #[test]
    fn test_pre_game_ticks_are_inert() {
        let mut g = game();
        let before = g.player_obj().pos;
        g.tick(
            &TickInput::default(),
            SIM_DT,
            &BruteForceQuery,
            &mut NullPresenter,
        );
        assert_eq!(g.time_ticks, 0);
        assert_eq!(g.player_obj().pos, before);
    }

    #[test]
    fn test_start_enters_running_and_moves_player() {
        let mut g = game();
        let before = g.player_obj().pos;
        g.tick(
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
            &BruteForceQuery,
            &mut NullPresenter,
        );
        assert_eq!(g.phase, GamePhase::Running);
        assert!((g.player_obj().pos - before).length() > 0.0);
    }

    #[test]
    fn test_shield_activation_is_fifo() {
        let mut g = game();
        g.player.queue_shield(ShieldKind::Hit);
        g.player.queue_shield(ShieldKind::SingleKill);
        g.activate_shield();
        assert_eq!(g.player.active_shield, Some(ShieldKind::Hit));
        // Second activation is a no-op while a shield is live
        g.activate_shield();
        assert_eq!(g.player.queued_shields.len(), 1);
    }

    #[test]
    fn test_activation_on_empty_inventory_is_noop() {
        let mut g = game();
        g.activate_shield();
        assert_eq!(g.player.active_shield, None);
        g.activate_collector(&mut NullPresenter);
        assert_eq!(g.score, 0);
    }

    #[test]
    fn test_multiplier_window_scales_awards() {
        let mut g = game();
        g.multiplier_value = 3;
        g.multiplier_timer = 5.0;
        g.award_points(100, &mut NullPresenter);
        assert_eq!(g.score, 300);
        g.multiplier_timer = 0.0;
        g.award_points(100, &mut NullPresenter);
        assert_eq!(g.score, 400);
    }

    #[test]
    fn test_drag_accumulates_manual_spin() {
        let mut g = game();
        g.phase = GamePhase::Running;
        let r = g.wheel.ring(1).inner_radius() + 10.0;
        g.update(&TickInput {
            ring_touch_begin: Some((1, Vec2::new(r, 0.0))),
            ..Default::default()
        });
        g.update(&TickInput {
            ring_touch_drag: Some(Vec2::new(0.0, r)),
            ..Default::default()
        });
        assert!((g.pending_spin[1] - std::f32::consts::FRAC_PI_2).abs() < 1e-4);

        let angle_before = g.wheel.ring(1).angle;
        g.tick(
            &TickInput::default(),
            SIM_DT,
            &BruteForceQuery,
            &mut NullPresenter,
        );
        assert!((g.wheel.ring(1).angle - angle_before).abs() > 1.0);
        assert_eq!(g.pending_spin[1], 0.0);
    }

    #[test]
    fn test_ring_rotation_carries_riders() {
        let mut g = game();
        g.phase = GamePhase::Running;
        g.wheel.ring_mut(1).rotation_speed_deg = 90.0;
        let facet = g.spawn_object(
            BoardObjectKind::Facet {
                color: FacetColor::Red,
            },
            ChannelId { ring: 1, index: 0 },
            TravelDirection::Outward,
            0.0,
        );
        let before = g.object(facet).unwrap().pos;
        g.tick(
            &TickInput::default(),
            SIM_DT,
            &BruteForceQuery,
            &mut NullPresenter,
        );
        let after = g.object(facet).unwrap().pos;
        assert!((before.length() - after.length()).abs() < 1e-3);
        assert!((before - after).length() > 0.0);
    }
}
