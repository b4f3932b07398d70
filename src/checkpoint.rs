//! Lapse checkpoints and trigger sets.
//!
//! A checkpoint is a named point in the turn-resolution sequence. Each tag
//! registers the checkpoints it cares about in a [`TriggerSet`]; the lapse
//! dispatcher only invokes a tag at checkpoints it registered.
//!
//! `Custom` is special: it is never swept by a generic phase pass. Call sites
//! with checkpoint-specific semantics (a protected battler being targeted, a
//! faint resolving) lapse `Custom` tags explicitly by kind.

/// A point in turn resolution at which tags may lapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Checkpoint {
    /// The holder fainted.
    Faint,
    /// The holder is about to act this turn (after move selection, before
    /// pre-move interruptions).
    Move,
    /// Immediately before the holder's selected move executes.
    PreMove,
    /// Immediately after the holder's move finished executing.
    AfterMove,
    /// While a move's effect is being applied to the holder.
    MoveEffect,
    /// End-of-turn sweep.
    TurnEnd,
    /// The holder was hit by a move.
    Hit,
    /// After a hit on the holder fully resolved.
    AfterHit,
    /// Explicit call-site-specific lapse; never dispatched generically.
    Custom,
}

impl Checkpoint {
    const ALL: [Checkpoint; 9] = [
        Checkpoint::Faint,
        Checkpoint::Move,
        Checkpoint::PreMove,
        Checkpoint::AfterMove,
        Checkpoint::MoveEffect,
        Checkpoint::TurnEnd,
        Checkpoint::Hit,
        Checkpoint::AfterHit,
        Checkpoint::Custom,
    ];

    fn bit(self) -> u16 {
        1 << match self {
            Checkpoint::Faint => 0,
            Checkpoint::Move => 1,
            Checkpoint::PreMove => 2,
            Checkpoint::AfterMove => 3,
            Checkpoint::MoveEffect => 4,
            Checkpoint::TurnEnd => 5,
            Checkpoint::Hit => 6,
            Checkpoint::AfterHit => 7,
            Checkpoint::Custom => 8,
        }
    }
}

/// A small set of checkpoints, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "Vec<Checkpoint>", from = "Vec<Checkpoint>")
)]
pub struct TriggerSet(u16);

impl TriggerSet {
    pub const EMPTY: TriggerSet = TriggerSet(0);

    /// Build a set from a list of checkpoints.
    pub const fn of(checkpoints: &[Checkpoint]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < checkpoints.len() {
            bits |= 1 << match checkpoints[i] {
                Checkpoint::Faint => 0,
                Checkpoint::Move => 1,
                Checkpoint::PreMove => 2,
                Checkpoint::AfterMove => 3,
                Checkpoint::MoveEffect => 4,
                Checkpoint::TurnEnd => 5,
                Checkpoint::Hit => 6,
                Checkpoint::AfterHit => 7,
                Checkpoint::Custom => 8,
            };
            i += 1;
        }
        TriggerSet(bits)
    }

    pub fn contains(self, checkpoint: Checkpoint) -> bool {
        self.0 & checkpoint.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<TriggerSet> for Vec<Checkpoint> {
    fn from(set: TriggerSet) -> Self {
        Checkpoint::ALL
            .into_iter()
            .filter(|c| set.contains(*c))
            .collect()
    }
}

impl From<Vec<Checkpoint>> for TriggerSet {
    fn from(checkpoints: Vec<Checkpoint>) -> Self {
        TriggerSet::of(&checkpoints)
    }
}
