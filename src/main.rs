//! Headless demo host
//!
//! Builds a small demo puzzle, runs the fixed-step loop for a few
//! simulated seconds and prints what the presenter hears. Real hosts
//! drive `Game::update`/`Game::tick` from their own loop and supply a
//! proper spatial index.

use glam::Vec2;

use gyrowheel::board::{BoardObjectKind, BumperKind, ChannelId, FacetColor, GateSlot, HazardKind,
    TravelDirection};
use gyrowheel::consts::SIM_DT;
use gyrowheel::persistence;
use gyrowheel::sim::{
    BruteForceQuery, EffectKind, GameEndReason, Presenter, SoundCue, VictoryCondition,
};
use gyrowheel::{Game, GamePhase, TickInput};

/// Presenter that narrates to stdout.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn facet_count_changed(&mut self, color: FacetColor, collected: u32) {
        println!("facets: {color:?} -> {collected}");
    }
    fn score_changed(&mut self, score: u64) {
        println!("score: {score}");
    }
    fn game_ended(&mut self, reason: GameEndReason, victory: bool) {
        println!("game over: {} (victory: {victory})", reason.as_str());
    }
    fn effect_triggered(&mut self, kind: EffectKind, pos: Vec2) {
        println!("effect {kind:?} at ({:.0}, {:.0})", pos.x, pos.y);
    }
    fn sound_triggered(&mut self, _cue: SoundCue) {}
}

fn build_demo() -> Game {
    let mut game = Game::with_rings("demo", 3, VictoryCondition::Collection)
        .expect("demo wheel spec is valid");

    // Open a lane from the hub outward and scatter a few objects
    for (ring, index) in [(0usize, 0usize), (1, 0), (2, 0)] {
        let id = ChannelId { ring, index };
        game.wheel.channel_mut(id).gate_mut(GateSlot::Inner).active = false;
        game.wheel.channel_mut(id).gate_mut(GateSlot::Outer).active = false;
    }
    let _ = game.spawn_object(
        BoardObjectKind::Facet {
            color: FacetColor::Red,
        },
        ChannelId { ring: 1, index: 0 },
        TravelDirection::Outward,
        0.0,
    );
    let _ = game.spawn_object(
        BoardObjectKind::Facet {
            color: FacetColor::Blue,
        },
        ChannelId { ring: 2, index: 0 },
        TravelDirection::Outward,
        0.0,
    );
    let _ = game.spawn_object(
        BoardObjectKind::Hazard {
            kind: HazardKind::Glue,
            effect_time: 1.5,
        },
        ChannelId { ring: 1, index: 24 },
        TravelDirection::Outward,
        0.0,
    );
    game.wheel.ring_mut(1).rotation_speed_deg = 15.0;
    if let Some(group) = &mut game.wheel.ring_mut(2).bumpers {
        group.bumpers[12].kind = BumperKind::Death;
    }
    game.commit_initial();
    game
}

fn main() {
    env_logger::init();

    let mut game = build_demo();
    let blob = persistence::to_json(&persistence::snapshot(&game)).expect("snapshot serializes");
    log::info!("demo puzzle blob is {} bytes", blob.len());

    let mut presenter = ConsolePresenter;
    let query = BruteForceQuery;

    game.tick(
        &TickInput {
            start: true,
            ..Default::default()
        },
        SIM_DT,
        &query,
        &mut presenter,
    );

    // Ten simulated seconds or until the run ends
    for _ in 0..(10.0 / SIM_DT) as u32 {
        if game.phase == GamePhase::GameOver {
            break;
        }
        game.tick(&TickInput::default(), SIM_DT, &query, &mut presenter);
    }

    println!(
        "done after {} ticks, score {}, phase {:?}",
        game.time_ticks, game.score, game.phase
    );
}
