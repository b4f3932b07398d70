//! Ability-hook dispatcher collaborator.
//!
//! Tags never hard-code ability behavior. Where an ability can veto or modify
//! a tag effect (block indirect damage, reverse a drain, bypass protection,
//! react to a flinch) the tag asks the dispatcher whether the battler's
//! ability implements that hook. The default dispatcher is a read-only table
//! built once by the host; a suppressed ability never fires.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::ids::AbilityId;

/// Hook points a tag may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityHook {
    /// Veto non-direct damage (trap chip, seed drain, curse).
    BlockNonDirectDamage,
    /// Invert a drain: the drainer takes the amount instead of healing.
    ReverseDrain,
    /// Attacks ignore the target's protection.
    BypassProtect,
    /// Moves hit through a substitute.
    BypassSubstitute,
    /// React to being flinched (speed boost).
    OnFlinch,
}

/// Out-parameter for a hook application.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookOut {
    /// Whether the ability implements the hook and fired.
    pub applied: bool,
}

/// The dispatcher interface tags call through the battle context.
pub trait AbilityHooks: Debug {
    /// Apply `hook` for the given ability, writing the result into `out`.
    /// A suppressed ability must never apply.
    fn apply(&self, hook: AbilityHook, ability: AbilityId, suppressed: bool, out: &mut HookOut);
}

/// Table-driven default dispatcher: ability id -> hooks it implements.
#[derive(Debug, Clone, Default)]
pub struct AbilityHookTable {
    entries: HashMap<AbilityId, Vec<AbilityHook>>,
}

impl AbilityHookTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ability: AbilityId, hook: AbilityHook) {
        self.entries.entry(ability).or_default().push(hook);
    }
}

impl AbilityHooks for AbilityHookTable {
    fn apply(&self, hook: AbilityHook, ability: AbilityId, suppressed: bool, out: &mut HookOut) {
        if suppressed {
            return;
        }
        if let Some(hooks) = self.entries.get(&ability) {
            out.applied = hooks.contains(&hook);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_hook_applies() {
        let mut table = AbilityHookTable::new();
        table.register(AbilityId(1), AbilityHook::BlockNonDirectDamage);

        let mut out = HookOut::default();
        table.apply(AbilityHook::BlockNonDirectDamage, AbilityId(1), false, &mut out);
        assert!(out.applied);

        let mut out = HookOut::default();
        table.apply(AbilityHook::ReverseDrain, AbilityId(1), false, &mut out);
        assert!(!out.applied);
    }

    #[test]
    fn test_suppressed_ability_never_fires() {
        let mut table = AbilityHookTable::new();
        table.register(AbilityId(1), AbilityHook::BlockNonDirectDamage);

        let mut out = HookOut::default();
        table.apply(AbilityHook::BlockNonDirectDamage, AbilityId(1), true, &mut out);
        assert!(!out.applied);
    }
}
