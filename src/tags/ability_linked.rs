//! Tags that exist only while their owning ability does.
//!
//! Each variant captures the holder's ability id when it attaches and expires
//! the moment the holder no longer possesses it (suppression counts as loss).
//! Stat effects are expressed through `stat_multiplier` so they vanish with
//! the tag rather than mutating stages.

use crate::battle::BattleContext;
use crate::battler::Battler;
use crate::checkpoint::Checkpoint;
use crate::ids::{AbilityId, BattlerId};
use crate::messages::MessageEvent;
use crate::tag::{TagBehavior, TagState};
use crate::types::{Stat, TerrainKind};

/// Slow start: Attack and Speed halved for the first five turns.
#[derive(Debug, Clone, Default)]
pub struct SlowStartTag {
    ability: AbilityId,
}

impl TagBehavior for SlowStartTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        if let Some(holder) = ctx.battler(battler) {
            self.ability = holder.ability;
        }
        enqueue_holder_message(ctx, battler, "tag.slow_start.added");
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.slow_start.removed");
    }

    fn lapse(
        &mut self,
        state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        _checkpoint: Checkpoint,
    ) -> bool {
        if !ctx
            .battler(battler)
            .is_some_and(|b| b.has_ability(self.ability))
        {
            return false;
        }
        state.count_down()
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.slow_start"
    }

    fn stat_multiplier(&self, _state: &TagState, holder: &Battler, stat: Stat) -> f64 {
        if holder.has_ability(self.ability) && matches!(stat, Stat::Atk | Stat::Spd) {
            0.5
        } else {
            1.0
        }
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("ability".into(), self.ability.0.into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(raw) = extra.get("ability").and_then(|v| v.as_u64()) {
            self.ability = AbilityId(raw as u16);
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Truant: every other move attempt is spent loafing.
#[derive(Debug, Clone, Default)]
pub struct TruantTag {
    ability: AbilityId,
    slacking: bool,
}

impl TagBehavior for TruantTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        if let Some(holder) = ctx.battler(battler) {
            self.ability = holder.ability;
        }
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::Move {
            return true;
        }
        if !ctx
            .battler(battler)
            .is_some_and(|b| b.has_ability(self.ability))
        {
            return false;
        }
        self.slacking = !self.slacking;
        if self.slacking {
            ctx.cancel_current_move();
            enqueue_holder_message(ctx, battler, "tag.truant.loafing");
        }
        true
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.truant"
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("ability".into(), self.ability.0.into());
        extra.insert("slacking".into(), self.slacking.into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(raw) = extra.get("ability").and_then(|v| v.as_u64()) {
            self.ability = AbilityId(raw as u16);
        }
        if let Some(flag) = extra.get("slacking").and_then(|v| v.as_bool()) {
            self.slacking = flag;
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Unburden: doubled Speed until the ability is lost.
#[derive(Debug, Clone, Default)]
pub struct UnburdenTag {
    ability: AbilityId,
}

impl TagBehavior for UnburdenTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        if let Some(holder) = ctx.battler(battler) {
            self.ability = holder.ability;
        }
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        _checkpoint: Checkpoint,
    ) -> bool {
        ctx.battler(battler)
            .is_some_and(|b| b.has_ability(self.ability))
    }

    fn descriptor_key(&self) -> &'static str {
        "tag.unburden"
    }

    fn stat_multiplier(&self, _state: &TagState, holder: &Battler, stat: Stat) -> f64 {
        if holder.has_ability(self.ability) && stat == Stat::Spd {
            2.0
        } else {
            1.0
        }
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("ability".into(), self.ability.0.into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(raw) = extra.get("ability").and_then(|v| v.as_u64()) {
            self.ability = AbilityId(raw as u16);
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

/// Which field condition sustains a highest-stat boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostCondition {
    Sunlight,
    ElectricTerrain,
}

/// Protosynthesis / quark drive: at attach, caches the holder's highest
/// battle stat and boosts it (1.3x, or 1.5x for Speed) for as long as the
/// sustaining field condition holds.
#[derive(Debug, Clone)]
pub struct HighestStatBoostTag {
    ability: AbilityId,
    condition: BoostCondition,
    stat: Stat,
}

impl HighestStatBoostTag {
    pub fn new(condition: BoostCondition) -> Self {
        Self {
            ability: AbilityId::default(),
            condition,
            stat: Stat::Atk,
        }
    }

    pub fn boosted_stat(&self) -> Stat {
        self.stat
    }

    fn condition_holds(&self, ctx: &BattleContext) -> bool {
        match self.condition {
            BoostCondition::Sunlight => ctx.weather.is_some_and(|w| w.is_sunlight()),
            BoostCondition::ElectricTerrain => ctx.terrain == Some(TerrainKind::Electric),
        }
    }
}

impl TagBehavior for HighestStatBoostTag {
    fn on_attach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        let Some(holder) = ctx.battler(battler) else {
            return;
        };
        self.ability = holder.ability;
        // Cached once: later stage changes do not retarget the boost.
        self.stat = Stat::BATTLE
            .iter()
            .copied()
            .max_by_key(|s| holder.effective_stat(*s))
            .unwrap_or(Stat::Atk);
        let message = MessageEvent::new(
            "tag.highest_stat_boost.added",
            vec![holder.name_key.clone(), self.stat.text_key().to_string()],
        );
        ctx.queue.enqueue(message);
    }

    fn on_detach(&mut self, _state: &mut TagState, ctx: &mut BattleContext, battler: BattlerId) {
        enqueue_holder_message(ctx, battler, "tag.highest_stat_boost.removed");
    }

    fn lapse(
        &mut self,
        _state: &mut TagState,
        ctx: &mut BattleContext,
        battler: BattlerId,
        checkpoint: Checkpoint,
    ) -> bool {
        if checkpoint != Checkpoint::Custom {
            return true;
        }
        ctx.battler(battler)
            .is_some_and(|b| b.has_ability(self.ability))
            && self.condition_holds(ctx)
    }

    fn descriptor_key(&self) -> &'static str {
        match self.condition {
            BoostCondition::Sunlight => "tag.protosynthesis",
            BoostCondition::ElectricTerrain => "tag.quark_drive",
        }
    }

    fn stat_multiplier(&self, _state: &TagState, _holder: &Battler, stat: Stat) -> f64 {
        if stat != self.stat {
            1.0
        } else if stat == Stat::Spd {
            1.5
        } else {
            1.3
        }
    }

    #[cfg(feature = "serialization")]
    fn save_extra(&self, extra: &mut serde_json::Map<String, serde_json::Value>) {
        extra.insert("ability".into(), self.ability.0.into());
        extra.insert("stat".into(), (self.stat.index() as u64).into());
    }

    #[cfg(feature = "serialization")]
    fn load_extra(&mut self, extra: &serde_json::Map<String, serde_json::Value>) {
        if let Some(raw) = extra.get("ability").and_then(|v| v.as_u64()) {
            self.ability = AbilityId(raw as u16);
        }
        if let Some(stat) = extra
            .get("stat")
            .and_then(|v| v.as_u64())
            .and_then(|i| Stat::ALL.get(i as usize).copied())
        {
            self.stat = stat;
        }
    }

    fn clone_box(&self) -> Box<dyn TagBehavior> {
        Box::new(self.clone())
    }
}

fn enqueue_holder_message(ctx: &mut BattleContext, battler: BattlerId, key: &str) {
    let Some(holder) = ctx.battler(battler) else {
        return;
    };
    let message = MessageEvent::new(key, vec![holder.name_key.clone()]);
    ctx.queue.enqueue(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::MovePhase;
    use crate::battler::Battler;
    use crate::dispatcher::{attach_tag, lapse_tag, lapse_tags};
    use crate::ids::MoveId;
    use crate::tag::TagKind;
    use crate::types::WeatherKind;

    const ABILITY: AbilityId = AbilityId(11);

    fn test_context() -> (BattleContext, BattlerId) {
        let mut ctx = BattleContext::new(3);
        let id = ctx.add_battler(|id| {
            Battler::new(id, "species.subject", 50, 100)
                .with_stats(100, 80, 60, 70, 90)
                .with_ability(ABILITY)
        });
        (ctx, id)
    }

    #[test]
    fn test_slow_start_halves_attack_and_speed() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::SlowStart, 5, None, None);

        let holder = ctx.battler(id).unwrap();
        assert_eq!(holder.effective_stat(Stat::Atk), 50);
        assert_eq!(holder.effective_stat(Stat::Spd), 45);
        assert_eq!(holder.effective_stat(Stat::Def), 80);
    }

    #[test]
    fn test_slow_start_expires_after_five_turns() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::SlowStart, 5, None, None);

        for _ in 0..4 {
            lapse_tags(&mut ctx, id, Checkpoint::TurnEnd);
            assert!(ctx.battler(id).unwrap().has_tag(TagKind::SlowStart));
        }
        lapse_tags(&mut ctx, id, Checkpoint::TurnEnd);
        assert!(!ctx.battler(id).unwrap().has_tag(TagKind::SlowStart));
        assert_eq!(ctx.battler(id).unwrap().effective_stat(Stat::Atk), 100);
    }

    #[test]
    fn test_slow_start_drops_when_ability_lost() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::SlowStart, 5, None, None);

        ctx.battler_mut(id).unwrap().ability_suppressed = true;
        assert_eq!(ctx.battler(id).unwrap().effective_stat(Stat::Atk), 100);
        lapse_tags(&mut ctx, id, Checkpoint::TurnEnd);
        assert!(!ctx.battler(id).unwrap().has_tag(TagKind::SlowStart));
    }

    #[test]
    fn test_truant_loafs_every_other_move() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::Truant, 1, None, None);

        ctx.begin_move_phase(MovePhase::new(id, MoveId(1), vec![]));
        lapse_tags(&mut ctx, id, Checkpoint::Move);
        assert!(ctx.end_move_phase().unwrap().cancelled);

        ctx.begin_move_phase(MovePhase::new(id, MoveId(1), vec![]));
        lapse_tags(&mut ctx, id, Checkpoint::Move);
        assert!(!ctx.end_move_phase().unwrap().cancelled);

        ctx.begin_move_phase(MovePhase::new(id, MoveId(1), vec![]));
        lapse_tags(&mut ctx, id, Checkpoint::Move);
        assert!(ctx.end_move_phase().unwrap().cancelled);
    }

    #[test]
    fn test_unburden_doubles_speed_until_ability_lost() {
        let (mut ctx, id) = test_context();
        attach_tag(&mut ctx, id, TagKind::Unburden, 1, None, None);
        assert_eq!(ctx.battler(id).unwrap().effective_stat(Stat::Spd), 180);

        ctx.battler_mut(id).unwrap().ability_suppressed = true;
        assert_eq!(ctx.battler(id).unwrap().effective_stat(Stat::Spd), 90);
        lapse_tags(&mut ctx, id, Checkpoint::TurnEnd);
        assert!(!ctx.battler(id).unwrap().has_tag(TagKind::Unburden));
    }

    #[test]
    fn test_highest_stat_boost_caches_and_boosts() {
        let (mut ctx, id) = test_context();
        ctx.weather = Some(WeatherKind::HarshSun);
        attach_tag(&mut ctx, id, TagKind::Protosynthesis, 1, None, None);

        // Attack (100) is the highest battle stat, so it gets the 1.3x boost.
        assert_eq!(ctx.battler(id).unwrap().effective_stat(Stat::Atk), 130);
        assert_eq!(ctx.battler(id).unwrap().effective_stat(Stat::Spd), 90);

        let tag = ctx.battler(id).unwrap().get_tag(TagKind::Protosynthesis);
        assert!(tag.is_some());
    }

    #[test]
    fn test_highest_stat_boost_speed_gets_larger_multiplier() {
        let mut ctx = BattleContext::new(3);
        ctx.terrain = Some(TerrainKind::Electric);
        let id = ctx.add_battler(|id| {
            Battler::new(id, "species.swift", 50, 100)
                .with_stats(60, 60, 60, 60, 120)
                .with_ability(ABILITY)
        });
        attach_tag(&mut ctx, id, TagKind::QuarkDrive, 1, None, None);
        assert_eq!(ctx.battler(id).unwrap().effective_stat(Stat::Spd), 180);
    }

    #[test]
    fn test_highest_stat_boost_ends_with_condition() {
        let (mut ctx, id) = test_context();
        ctx.weather = Some(WeatherKind::Sunny);
        attach_tag(&mut ctx, id, TagKind::Protosynthesis, 1, None, None);

        // Sweeping checkpoints leave it alone.
        lapse_tags(&mut ctx, id, Checkpoint::TurnEnd);
        assert!(ctx.battler(id).unwrap().has_tag(TagKind::Protosynthesis));

        ctx.weather = Some(WeatherKind::Rain);
        lapse_tag(&mut ctx, id, TagKind::Protosynthesis, Checkpoint::Custom);
        assert!(!ctx.battler(id).unwrap().has_tag(TagKind::Protosynthesis));
    }
}
