//! Battle context: the battler arena, the in-flight move phase, scheduled
//! phases, and the collaborator seams (RNG, move dex, ability hooks,
//! presentation queues).
//!
//! The in-flight move is explicit state passed around by the turn engine, not
//! ambient: tags receive it through the context handed to `lapse` and mutate
//! it through the context's phase operations. Effects that would trigger a
//! nested lapse pass (a forced faint, a delayed status) are scheduled as
//! phases instead of being resolved inline.

use std::collections::VecDeque;

use crate::abilities::{AbilityHook, AbilityHookTable, AbilityHooks, HookOut};
use crate::battler::Battler;
use crate::ids::{BattlerId, MoveId};
use crate::messages::PresentationQueue;
use crate::moves::MoveDex;
use crate::rng::BattleRng;
use crate::types::{StatusCondition, TerrainKind, WeatherKind};

/// The move currently resolving, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePhase {
    pub user: BattlerId,
    pub targets: Vec<BattlerId>,
    pub move_id: MoveId,
    pub cancelled: bool,
    /// Remaining sub-hits for multi-hit moves; protection truncates this.
    pub hits_remaining: u32,
    /// Damage the current hit would deal, set by the damage pipeline before
    /// hit-checkpoint lapses (substitute interception reads it).
    pub pending_damage: u32,
}

impl MovePhase {
    pub fn new(user: BattlerId, move_id: MoveId, targets: Vec<BattlerId>) -> Self {
        Self {
            user,
            targets,
            move_id,
            cancelled: false,
            hits_remaining: 1,
            pending_damage: 0,
        }
    }
}

/// A phase scheduled for the turn engine to run after the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledPhase {
    UseMove {
        user: BattlerId,
        move_id: MoveId,
        targets: Vec<BattlerId>,
    },
    ApplyStatus {
        battler: BattlerId,
        status: StatusCondition,
    },
    Faint {
        battler: BattlerId,
    },
}

#[derive(Debug)]
pub struct BattleContext {
    battlers: Vec<Battler>,
    pub rng: BattleRng,
    pub dex: MoveDex,
    hooks: Box<dyn AbilityHooks>,
    pub queue: PresentationQueue,
    pub weather: Option<WeatherKind>,
    pub terrain: Option<TerrainKind>,
    current_move: Option<MovePhase>,
    scheduled: VecDeque<ScheduledPhase>,
}

impl BattleContext {
    pub fn new(seed: u64) -> Self {
        Self {
            battlers: Vec::new(),
            rng: BattleRng::from_seed(seed),
            dex: MoveDex::new(),
            hooks: Box::new(AbilityHookTable::new()),
            queue: PresentationQueue::new(),
            weather: None,
            terrain: None,
            current_move: None,
            scheduled: VecDeque::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: impl AbilityHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    // === Battlers ===

    /// Install a battler into the arena, assigning its id.
    pub fn add_battler(&mut self, build: impl FnOnce(BattlerId) -> Battler) -> BattlerId {
        let id = BattlerId(self.battlers.len() as u32);
        self.battlers.push(build(id));
        id
    }

    /// Resolve a battler by id. A stale or absent id yields `None`; callers
    /// treat that as a severed link, not an error.
    pub fn battler(&self, id: BattlerId) -> Option<&Battler> {
        self.battlers.get(id.index())
    }

    pub fn battler_mut(&mut self, id: BattlerId) -> Option<&mut Battler> {
        self.battlers.get_mut(id.index())
    }

    /// A battler that is on the field and conscious.
    pub fn active_battler(&self, id: BattlerId) -> Option<&Battler> {
        self.battler(id).filter(|b| b.is_active())
    }

    pub fn battler_ids(&self) -> Vec<BattlerId> {
        self.battlers.iter().map(|b| b.id).collect()
    }

    // === Phase engine ===

    pub fn begin_move_phase(&mut self, phase: MovePhase) {
        self.current_move = Some(phase);
    }

    pub fn end_move_phase(&mut self) -> Option<MovePhase> {
        self.current_move.take()
    }

    pub fn current_move(&self) -> Option<&MovePhase> {
        self.current_move.as_ref()
    }

    pub fn current_move_mut(&mut self) -> Option<&mut MovePhase> {
        self.current_move.as_mut()
    }

    /// Abort the in-flight move. The turn engine consults the flag after each
    /// tag's lapse.
    pub fn cancel_current_move(&mut self) {
        if let Some(phase) = self.current_move.as_mut() {
            phase.cancelled = true;
        }
    }

    /// Truncate any remaining multi-hit sub-phases of the in-flight move.
    pub fn truncate_hits(&mut self) {
        if let Some(phase) = self.current_move.as_mut() {
            phase.hits_remaining = 0;
        }
    }

    /// Schedule a phase after everything currently pending.
    pub fn schedule_phase(&mut self, phase: ScheduledPhase) {
        self.scheduled.push_back(phase);
    }

    /// Schedule a phase to run immediately next.
    pub fn schedule_phase_next(&mut self, phase: ScheduledPhase) {
        self.scheduled.push_front(phase);
    }

    /// Reorder a battler's pending move to execute immediately next.
    pub fn promote_pending_move(&mut self, battler: BattlerId) {
        if let Some(pos) = self
            .scheduled
            .iter()
            .position(|p| matches!(p, ScheduledPhase::UseMove { user, .. } if *user == battler))
            && pos > 0
            && let Some(phase) = self.scheduled.remove(pos)
        {
            self.scheduled.push_front(phase);
        }
    }

    /// Rewrite a battler's pending move (an encore forcing a repeat).
    pub fn retarget_pending_move(&mut self, battler: BattlerId, move_id: MoveId) {
        for phase in self.scheduled.iter_mut() {
            if let ScheduledPhase::UseMove { user, move_id: m, .. } = phase
                && *user == battler
            {
                *m = move_id;
            }
        }
    }

    /// Pop the next scheduled phase for the turn engine to run.
    pub fn take_scheduled(&mut self) -> Option<ScheduledPhase> {
        self.scheduled.pop_front()
    }

    pub fn scheduled_phases(&self) -> impl Iterator<Item = &ScheduledPhase> {
        self.scheduled.iter()
    }

    // === Ability hooks ===

    /// Whether the battler's ability implements `hook` and fired.
    pub fn apply_ability_hook(&self, hook: AbilityHook, battler: BattlerId) -> bool {
        let Some(b) = self.battler(battler) else {
            return false;
        };
        let mut out = HookOut::default();
        self.hooks.apply(hook, b.ability, b.ability_suppressed, &mut out);
        out.applied
    }

    /// Deal indirect (non-direct-attack) damage, respecting the blocking
    /// ability hook. Returns the amount actually dealt.
    pub fn apply_indirect_damage(&mut self, battler: BattlerId, amount: u32) -> u32 {
        if self.apply_ability_hook(AbilityHook::BlockNonDirectDamage, battler) {
            return 0;
        }
        self.battler_mut(battler)
            .map(|b| b.apply_damage(amount))
            .unwrap_or(0)
    }
}
