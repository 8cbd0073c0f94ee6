//! Deterministic simulation module
//!
//! All gameplay logic lives here and only ever runs on the fixed-rate
//! tick:
//! - Fixed timestep only
//! - Stable iteration order (by object id)
//! - No rendering, audio or spatial-index dependencies; hosts plug in
//!   through `OverlapQuery` and `Presenter`

pub mod events;
pub mod query;
pub mod tick;
pub mod victory;

pub use events::{EffectKind, GameEndReason, NullPresenter, Presenter, SoundCue};
pub use query::{BruteForceQuery, Collider, ColliderKind, OverlapQuery};
pub use tick::{Game, GamePhase, TickInput};
pub use victory::{VictoryCondition, VictoryTracker};
