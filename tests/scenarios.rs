//! End-to-end gameplay scenarios driven through the public API only.

use glam::Vec2;

use gyrowheel::board::{
    BoardObjectKind, BumperKind, ChannelId, FacetColor, GateSlot, HazardKind, NodeId, NodeSlot,
    ShieldKind, TravelDirection,
};
use gyrowheel::consts::{PLAYER_BASE_SPEED, SIM_DT};
use gyrowheel::sim::{
    BruteForceQuery, EffectKind, GameEndReason, Presenter, SoundCue, VictoryCondition,
};
use gyrowheel::{Game, GamePhase, TickInput};

/// Presenter that records every callback for later assertions.
#[derive(Default)]
struct RecordingPresenter {
    facet_counts: Vec<(FacetColor, u32)>,
    scores: Vec<u64>,
    ends: Vec<(GameEndReason, bool)>,
    effects: Vec<EffectKind>,
    sounds: Vec<SoundCue>,
}

impl Presenter for RecordingPresenter {
    fn facet_count_changed(&mut self, color: FacetColor, collected: u32) {
        self.facet_counts.push((color, collected));
    }
    fn score_changed(&mut self, score: u64) {
        self.scores.push(score);
    }
    fn game_ended(&mut self, reason: GameEndReason, victory: bool) {
        self.ends.push((reason, victory));
    }
    fn effect_triggered(&mut self, kind: EffectKind, _pos: Vec2) {
        self.effects.push(kind);
    }
    fn sound_triggered(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }
}

fn tick(game: &mut Game, input: TickInput, presenter: &mut RecordingPresenter) {
    game.tick(&input, SIM_DT, &BruteForceQuery, presenter);
}

fn start_input() -> TickInput {
    TickInput {
        start: true,
        ..Default::default()
    }
}

#[test]
fn test_gate_state_drives_node_eligibility() {
    // Inner gate active, outer inactive: Start is off-path, Mid and End on
    let mut game = Game::with_rings("gates", 2, VictoryCondition::Collection).unwrap();
    let channel = ChannelId { ring: 1, index: 20 };
    game.wheel
        .channel_mut(channel)
        .gate_mut(GateSlot::Outer)
        .active = false;

    let node = |slot| NodeId { channel, slot };
    assert!(!game.wheel.can_be_on_path(node(NodeSlot::Start)));
    assert!(game.wheel.can_be_on_path(node(NodeSlot::Mid)));
    assert!(game.wheel.can_be_on_path(node(NodeSlot::End)));

    // Opening the inner gate too makes all three eligible
    game.wheel
        .channel_mut(channel)
        .gate_mut(GateSlot::Inner)
        .active = false;
    assert!(game.wheel.can_be_on_path(node(NodeSlot::Start)));
}

#[test]
fn test_player_transitions_outward_without_bouncing() {
    let mut game = Game::with_rings("transition", 2, VictoryCondition::Collection).unwrap();
    let hub_channel = ChannelId { ring: 0, index: 0 };
    let outer_channel = ChannelId { ring: 1, index: 0 };
    game.wheel
        .channel_mut(hub_channel)
        .gate_mut(GateSlot::Outer)
        .active = false;
    game.wheel
        .channel_mut(outer_channel)
        .gate_mut(GateSlot::Inner)
        .active = false;

    let mut presenter = RecordingPresenter::default();
    tick(&mut game, start_input(), &mut presenter);
    for _ in 0..60 {
        if game.player_obj().channel != hub_channel {
            break;
        }
        tick(&mut game, TickInput::default(), &mut presenter);
    }

    let player = game.player_obj();
    assert_eq!(player.channel, outer_channel);
    // Entered via the Start node, so still heading outward
    assert_eq!(player.direction, TravelDirection::Outward);
    let inner = game.wheel.ring(1).inner_radius();
    assert!(player.pos.length() > inner);
    // The transition suppressed the generic bounce on the crossing tick
    assert!(!presenter.sounds.contains(&SoundCue::Bounce));
    assert_eq!(game.phase, GamePhase::Running);
}

#[test]
fn test_unshielded_enemy_contact_ends_the_game() {
    let mut game = Game::with_rings("enemy", 1, VictoryCondition::Collection).unwrap();
    let _ = game.spawn_object(
        BoardObjectKind::Hazard {
            kind: HazardKind::Enemy,
            effect_time: 0.0,
        },
        ChannelId { ring: 0, index: 0 },
        TravelDirection::Inward,
        80.0,
    );

    let mut presenter = RecordingPresenter::default();
    tick(&mut game, start_input(), &mut presenter);

    assert_eq!(game.phase, GamePhase::GameOver);
    assert_eq!(presenter.ends, vec![(GameEndReason::KilledByEnemy, false)]);
    assert_eq!(
        GameEndReason::KilledByEnemy.as_str(),
        "Killed By Enemy"
    );

    // GameOver ticks are inert
    let ticks = game.time_ticks;
    tick(&mut game, TickInput::default(), &mut presenter);
    assert_eq!(game.time_ticks, ticks);
    assert_eq!(presenter.ends.len(), 1);
}

#[test]
fn test_hit_shield_absorbs_dynamite_without_points() {
    let mut game = Game::with_rings("shielded", 1, VictoryCondition::Collection).unwrap();
    let dynamite = game.spawn_object(
        BoardObjectKind::Hazard {
            kind: HazardKind::Dynamite,
            effect_time: 0.0,
        },
        ChannelId { ring: 0, index: 0 },
        TravelDirection::Outward,
        0.0,
    );
    game.player.queue_shield(ShieldKind::Hit);

    let mut presenter = RecordingPresenter::default();
    tick(
        &mut game,
        TickInput {
            start: true,
            activate_shield: true,
            ..Default::default()
        },
        &mut presenter,
    );
    tick(&mut game, TickInput::default(), &mut presenter);

    // Shield consumed, player alive, hazard survives, no score awarded
    assert_eq!(game.phase, GamePhase::Running);
    assert_eq!(game.player.active_shield, None);
    assert!(game.object(dynamite).is_some());
    assert_eq!(game.score, 0);
    assert!(presenter.effects.contains(&EffectKind::ShieldBreak));
    assert!(presenter.ends.is_empty());
    // Debounced until the pair physically separates
    assert_eq!(game.player.ignored_hazard, Some(dynamite));
}

#[test]
fn test_collection_victory_fires_exactly_once() {
    let mut game = Game::with_rings("collect", 1, VictoryCondition::Collection).unwrap();
    for index in [3, 6] {
        let _ = game.spawn_object(
            BoardObjectKind::Facet {
                color: FacetColor::Red,
            },
            ChannelId { ring: 0, index },
            TravelDirection::Outward,
            0.0,
        );
    }
    assert!(game.player.queue_collector());
    assert!(game.player.queue_collector());

    let mut presenter = RecordingPresenter::default();
    tick(
        &mut game,
        TickInput {
            start: true,
            activate_collector: true,
            ..Default::default()
        },
        &mut presenter,
    );
    assert_eq!(game.phase, GamePhase::Running);
    assert_eq!(presenter.facet_counts, vec![(FacetColor::Red, 1)]);

    tick(
        &mut game,
        TickInput {
            activate_collector: true,
            ..Default::default()
        },
        &mut presenter,
    );

    assert_eq!(game.phase, GamePhase::GameOver);
    assert_eq!(presenter.ends, vec![(GameEndReason::Victory, true)]);
    assert_eq!(presenter.facet_counts.last(), Some(&(FacetColor::Red, 2)));
    assert!(presenter.sounds.contains(&SoundCue::Victory));

    // A lingering tick cannot re-fire the end callback
    tick(&mut game, TickInput::default(), &mut presenter);
    assert_eq!(presenter.ends.len(), 1);
}

/// Open a straight lane from the hub's channel 0 out to ring 1's rim.
fn open_outward_lane(game: &mut Game) {
    let hub = ChannelId { ring: 0, index: 0 };
    let outer = ChannelId { ring: 1, index: 0 };
    game.wheel.channel_mut(hub).gate_mut(GateSlot::Outer).active = false;
    game.wheel
        .channel_mut(outer)
        .gate_mut(GateSlot::Inner)
        .active = false;
    game.wheel
        .channel_mut(outer)
        .gate_mut(GateSlot::Outer)
        .active = false;
}

fn run_until_game_over(game: &mut Game, presenter: &mut RecordingPresenter, max_ticks: u32) {
    tick(game, start_input(), presenter);
    for _ in 0..max_ticks {
        if game.phase == GamePhase::GameOver {
            break;
        }
        tick(game, TickInput::default(), presenter);
    }
}

#[test]
fn test_carried_facet_matches_at_color_bumper() {
    let mut game = Game::with_rings("match", 2, VictoryCondition::ColorMatch).unwrap();
    open_outward_lane(&mut game);
    let _ = game.spawn_object(
        BoardObjectKind::Facet {
            color: FacetColor::Red,
        },
        ChannelId { ring: 0, index: 0 },
        TravelDirection::Outward,
        0.0,
    );
    if let Some(group) = &mut game.wheel.ring_mut(1).bumpers {
        group.bumpers[0].kind = BumperKind::ColorMatch(FacetColor::Red);
    }

    let mut presenter = RecordingPresenter::default();
    run_until_game_over(&mut game, &mut presenter, 120);

    // Picked up on the way out, consumed at the rim, and that was the win
    assert_eq!(presenter.ends, vec![(GameEndReason::Victory, true)]);
    assert!(presenter.effects.contains(&EffectKind::FacetMatch));
    assert!(presenter.effects.contains(&EffectKind::BumperHit));
    assert_eq!(game.player.carried_facet, None);
    assert_eq!(game.tracker.collected(FacetColor::Red), 1);
    assert_eq!(game.score, 100);
}

#[test]
fn test_death_bumper_ends_the_game() {
    let mut game = Game::with_rings("rim", 2, VictoryCondition::Collection).unwrap();
    open_outward_lane(&mut game);
    if let Some(group) = &mut game.wheel.ring_mut(1).bumpers {
        group.bumpers[0].kind = BumperKind::Death;
    }

    let mut presenter = RecordingPresenter::default();
    run_until_game_over(&mut game, &mut presenter, 120);

    assert_eq!(presenter.ends, vec![(GameEndReason::DeathBumper, false)]);
    assert_eq!(GameEndReason::DeathBumper.as_str(), "Crushed By Bumper");
    assert!(presenter.sounds.contains(&SoundCue::Death));
}

#[test]
fn test_mover_bounces_off_active_gate() {
    // All gates closed: the outward player meets its channel's outer gate
    let mut game = Game::with_rings("walled", 1, VictoryCondition::Collection).unwrap();

    let mut presenter = RecordingPresenter::default();
    tick(&mut game, start_input(), &mut presenter);
    for _ in 0..30 {
        if game.player_obj().direction == TravelDirection::Inward {
            break;
        }
        tick(&mut game, TickInput::default(), &mut presenter);
    }

    let player = game.player_obj();
    assert_eq!(player.direction, TravelDirection::Inward);
    // Heading now points back toward the hub
    assert!(player.heading.dot(player.pos) < 0.0);
    assert!(presenter.sounds.contains(&SoundCue::Bounce));
    assert_eq!(game.phase, GamePhase::Running);
}

#[test]
fn test_glue_freezes_then_restores_player_speed() {
    let mut game = Game::with_rings("gluey", 1, VictoryCondition::Collection).unwrap();
    let glue = game.spawn_object(
        BoardObjectKind::Hazard {
            kind: HazardKind::Glue,
            effect_time: 0.1,
        },
        ChannelId { ring: 0, index: 0 },
        TravelDirection::Outward,
        0.0,
    );

    let mut presenter = RecordingPresenter::default();
    tick(&mut game, start_input(), &mut presenter);

    // Stuck: speed zeroed, the glue blob is spent
    assert_eq!(game.player_obj().speed, 0.0);
    assert!(game.player.glue_timer > 0.0);
    assert!(game.object(glue).is_none());
    assert!(presenter.effects.contains(&EffectKind::GlueSplash));

    let frozen = game.player_obj().pos;
    for _ in 0..3 {
        tick(&mut game, TickInput::default(), &mut presenter);
    }
    assert_eq!(game.player_obj().pos, frozen);

    // Ride out the rest of the timer; speed comes back and motion resumes
    for _ in 0..10 {
        tick(&mut game, TickInput::default(), &mut presenter);
    }
    assert_eq!(game.player.glue_timer, 0.0);
    assert_eq!(game.player_obj().speed, PLAYER_BASE_SPEED);
    tick(&mut game, TickInput::default(), &mut presenter);
    assert!((game.player_obj().pos - frozen).length() > 0.0);
}

#[test]
fn test_saved_glue_hazard_survives_reload() {
    use gyrowheel::persistence::{self, ObjectPayload};

    let mut game = Game::with_rings("glue", 3, VictoryCondition::Collection).unwrap();
    let channel = ChannelId { ring: 2, index: 5 };
    game.wheel
        .channel_mut(channel)
        .gate_mut(GateSlot::Inner)
        .active = false;
    let _ = game.spawn_object(
        BoardObjectKind::Hazard {
            kind: HazardKind::Glue,
            effect_time: 1.75,
        },
        channel,
        TravelDirection::Outward,
        0.0,
    );

    let blob = persistence::to_json(&persistence::snapshot(&game)).unwrap();
    let data = persistence::from_json(&blob).unwrap();
    let saved = data.rings[2].channels[5].mid_object.as_ref().unwrap();
    assert_eq!(saved.channel, "r02-c05");
    assert_eq!(
        saved.payload,
        ObjectPayload::Hazard {
            kind: HazardKind::Glue,
            effect_time: 1.75
        }
    );

    let mut reloaded = Game::with_rings("blank", 3, VictoryCondition::ColorMatch).unwrap();
    persistence::restore(&mut reloaded, &data).unwrap();

    let occupant = reloaded
        .wheel
        .channel(channel)
        .node(NodeSlot::Mid)
        .occupant()
        .unwrap();
    let hazard = reloaded.object(occupant).unwrap();
    assert_eq!(
        hazard.kind,
        BoardObjectKind::Hazard {
            kind: HazardKind::Glue,
            effect_time: 1.75
        }
    );
    // The restored gate state came along too
    assert!(!reloaded.wheel.channel(channel).gate(GateSlot::Inner).active);
    assert_eq!(reloaded.tracker.condition, VictoryCondition::Collection);
}

#[test]
fn test_double_spawn_keeps_first_occupant_through_collection() {
    use gyrowheel::persistence;

    // Two facets authored onto the same Mid node: the second spawn is
    // refused occupancy, so destroying either can never orphan the other
    let mut game = Game::with_rings("crowded", 1, VictoryCondition::Collection).unwrap();
    let channel = ChannelId { ring: 0, index: 6 };
    let first = game.spawn_object(
        BoardObjectKind::Facet {
            color: FacetColor::Red,
        },
        channel,
        TravelDirection::Outward,
        0.0,
    );
    let _second = game.spawn_object(
        BoardObjectKind::Facet {
            color: FacetColor::Green,
        },
        channel,
        TravelDirection::Outward,
        0.0,
    );
    assert_eq!(
        game.wheel.channel(channel).node(NodeSlot::Mid).occupant(),
        Some(first)
    );

    assert!(game.player.queue_collector());
    let mut presenter = RecordingPresenter::default();
    tick(&mut game, start_input(), &mut presenter);
    tick(
        &mut game,
        TickInput {
            activate_collector: true,
            ..Default::default()
        },
        &mut presenter,
    );

    // One facet was collected; the survivor still holds its node and is
    // still present in the snapshot
    let facets = game
        .objects
        .iter()
        .filter(|o| matches!(o.kind, BoardObjectKind::Facet { .. }))
        .count();
    assert_eq!(facets, 1);
    let occupant = game.wheel.channel(channel).node(NodeSlot::Mid).occupant();
    assert!(occupant.is_some());
    let data = persistence::snapshot(&game);
    assert!(data.rings[0].channels[6].mid_object.is_some());
}

#[test]
fn test_reset_restores_the_committed_snapshot() {
    let mut game = Game::with_rings("resettable", 1, VictoryCondition::Collection).unwrap();
    let _ = game.spawn_object(
        BoardObjectKind::Facet {
            color: FacetColor::Blue,
        },
        ChannelId { ring: 0, index: 4 },
        TravelDirection::Outward,
        0.0,
    );
    game.commit_initial();

    let mut presenter = RecordingPresenter::default();
    tick(&mut game, start_input(), &mut presenter);
    assert!(game.player.queue_collector());
    tick(
        &mut game,
        TickInput {
            activate_collector: true,
            ..Default::default()
        },
        &mut presenter,
    );
    // Victory has been reached; reset rewinds to the committed snapshot
    assert_eq!(game.phase, GamePhase::GameOver);

    tick(
        &mut game,
        TickInput {
            reset: true,
            ..Default::default()
        },
        &mut presenter,
    );
    assert_eq!(game.phase, GamePhase::PreGame);
    assert_eq!(game.score, 0);
    assert_eq!(game.time_ticks, 0);
    assert_eq!(game.tracker.collected(FacetColor::Blue), 0);
    assert_eq!(game.tracker.on_board(FacetColor::Blue), 1);
    // The facet is back on its Mid node
    let facets = game
        .objects
        .iter()
        .filter(|o| matches!(o.kind, BoardObjectKind::Facet { .. }))
        .count();
    assert_eq!(facets, 1);
}
