//! Outbound presentation callbacks
//!
//! The core fires these and moves on; it never depends on their completion.
//! Hosts hook up UI text, particles and audio here. The resolver and
//! victory tracker receive the presenter by parameter - there are no
//! global effect singletons in this crate.

use glam::Vec2;

use crate::board::FacetColor;

/// Visual effect requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    FacetPickup,
    FacetMatch,
    ShieldBreak,
    HazardKilled,
    GlueSplash,
    BumperHit,
}

/// Audio cue requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Pickup,
    Bounce,
    Bumper,
    Death,
    Victory,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    Victory,
    KilledByEnemy,
    KilledByDynamite,
    DeathBumper,
}

impl GameEndReason {
    /// End-of-game banner text.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameEndReason::Victory => "Victory",
            GameEndReason::KilledByEnemy => "Killed By Enemy",
            GameEndReason::KilledByDynamite => "Killed By Dynamite",
            GameEndReason::DeathBumper => "Crushed By Bumper",
        }
    }
}

/// Fire-and-forget presentation sink.
pub trait Presenter {
    fn facet_count_changed(&mut self, color: FacetColor, collected: u32);
    fn score_changed(&mut self, score: u64);
    fn game_ended(&mut self, reason: GameEndReason, victory: bool);
    fn effect_triggered(&mut self, kind: EffectKind, pos: Vec2);
    fn sound_triggered(&mut self, cue: SoundCue);
}

/// Presenter that swallows everything (headless runs, benchmarks).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn facet_count_changed(&mut self, _color: FacetColor, _collected: u32) {}
    fn score_changed(&mut self, _score: u64) {}
    fn game_ended(&mut self, _reason: GameEndReason, _victory: bool) {}
    fn effect_triggered(&mut self, _kind: EffectKind, _pos: Vec2) {}
    fn sound_triggered(&mut self, _cue: SoundCue) {}
}
