//! The combatant model.
//!
//! A battler owns its attached tags exclusively; tags hold only ids back to
//! other battlers. Stat reads go through `effective_stat`, which folds in
//! stage multipliers and any multipliers contributed by attached tags
//! (slow-start halving, paradox-style boosts).

use crate::ids::{AbilityId, BattlerId, MoveId};
use crate::tag::{Tag, TagKind};
use crate::types::{stage_multiplier, ElementType, Gender, Stat, StatusCondition, MAX_STAT_STAGE};

#[derive(Debug, Clone)]
pub struct Battler {
    pub id: BattlerId,
    pub name_key: String,
    pub level: u32,
    pub max_hp: u32,
    pub hp: u32,
    /// Base Atk/Def/SpAtk/SpDef/Spd.
    stats: [u32; 5],
    /// Stages for all seven stats, clamped to ±6.
    stages: [i8; 7],
    pub types: Vec<ElementType>,
    pub gender: Gender,
    pub weight_kg: f32,
    pub ability: AbilityId,
    pub ability_suppressed: bool,
    pub status: StatusCondition,
    pub moveset: Vec<MoveId>,
    move_history: Vec<MoveId>,
    pub tags: Vec<Tag>,
    pub active: bool,
}

impl Battler {
    pub fn new(id: BattlerId, name_key: impl Into<String>, level: u32, max_hp: u32) -> Self {
        Self {
            id,
            name_key: name_key.into(),
            level,
            max_hp,
            hp: max_hp,
            stats: [50; 5],
            stages: [0; 7],
            types: vec![ElementType::Normal],
            gender: Gender::Unknown,
            weight_kg: 10.0,
            ability: AbilityId::default(),
            ability_suppressed: false,
            status: StatusCondition::None,
            moveset: Vec::new(),
            move_history: Vec::new(),
            tags: Vec::new(),
            active: true,
        }
    }

    pub fn with_stats(mut self, atk: u32, def: u32, sp_atk: u32, sp_def: u32, spd: u32) -> Self {
        self.stats = [atk, def, sp_atk, sp_def, spd];
        self
    }

    pub fn with_types(mut self, types: Vec<ElementType>) -> Self {
        self.types = types;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_ability(mut self, ability: AbilityId) -> Self {
        self.ability = ability;
        self
    }

    pub fn with_moveset(mut self, moves: Vec<MoveId>) -> Self {
        self.moveset = moves;
        self
    }

    // === HP ===

    /// Apply damage directly to HP. Returns the amount actually dealt.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Heal up to max HP. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    // === Stats ===

    pub fn base_stat(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Acc | Stat::Eva => 100,
            _ => self.stats[stat.index()],
        }
    }

    pub fn stat_stage(&self, stat: Stat) -> i8 {
        self.stages[stat.index()]
    }

    /// Adjust a stat stage by `delta`, clamped to ±6. Returns whether the
    /// stage actually moved (a boost at the cap is a no-op).
    pub fn change_stat_stage(&mut self, stat: Stat, delta: i8) -> bool {
        let current = self.stages[stat.index()];
        let next = current
            .saturating_add(delta)
            .clamp(-MAX_STAT_STAGE, MAX_STAT_STAGE);
        self.stages[stat.index()] = next;
        next != current
    }

    /// Effective stat: base value, stage multiplier, then any multipliers
    /// contributed by attached tags.
    pub fn effective_stat(&self, stat: Stat) -> u32 {
        let mut value = self.base_stat(stat) as f64 * stage_multiplier(self.stat_stage(stat));
        for tag in &self.tags {
            value *= tag.stat_multiplier(self, stat);
        }
        (value as u32).max(1)
    }

    // === Types ===

    pub fn has_type(&self, element: ElementType) -> bool {
        self.types.contains(&element)
    }

    /// Remove a type from the list. Returns whether it was present.
    pub fn remove_type(&mut self, element: ElementType) -> bool {
        let before = self.types.len();
        self.types.retain(|t| *t != element);
        self.types.len() != before
    }

    pub fn add_type(&mut self, element: ElementType) {
        if !self.has_type(element) {
            self.types.push(element);
        }
    }

    // === Ability ===

    /// Whether the battler currently possesses the given ability. Suppression
    /// counts as not possessing it.
    pub fn has_ability(&self, ability: AbilityId) -> bool {
        !self.ability_suppressed && self.ability == ability
    }

    // === Moves ===

    pub fn push_move_used(&mut self, move_id: MoveId) {
        self.move_history.push(move_id);
    }

    /// The last `n` moves used, most recent first.
    pub fn last_moves(&self, n: usize) -> Vec<MoveId> {
        self.move_history.iter().rev().take(n).copied().collect()
    }

    // === Tags (read-only; mutation goes through the dispatcher) ===

    pub fn get_tag(&self, kind: TagKind) -> Option<&Tag> {
        self.tags.iter().find(|t| t.kind() == kind)
    }

    pub fn get_tag_mut(&mut self, kind: TagKind) -> Option<&mut Tag> {
        self.tags.iter_mut().find(|t| t.kind() == kind)
    }

    pub fn has_tag(&self, kind: TagKind) -> bool {
        self.get_tag(kind).is_some()
    }

    pub fn find_tag(&self, predicate: impl Fn(&Tag) -> bool) -> Option<&Tag> {
        self.tags.iter().find(|t| predicate(t))
    }

    /// Total crit-stage bonus granted by attached tags.
    pub fn crit_stage_bonus(&self) -> u32 {
        self.tags.iter().map(|t| t.crit_stage_bonus()).sum()
    }

    pub fn is_active(&self) -> bool {
        self.active && !self.is_fainted()
    }

    pub fn is_asleep(&self) -> bool {
        self.status == StatusCondition::Sleep
    }
}
