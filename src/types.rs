//! Core battle vocabulary: stats, stages, element types, move categories.

/// In-battle stats subject to stage modification.
///
/// HP is deliberately absent: it has no stages and is mutated only through the
/// battler's damage/heal operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Stat {
    Atk,
    Def,
    SpAtk,
    SpDef,
    Spd,
    Acc,
    Eva,
}

impl Stat {
    /// All stats, in canonical order.
    pub const ALL: [Stat; 7] = [
        Stat::Atk,
        Stat::Def,
        Stat::SpAtk,
        Stat::SpDef,
        Stat::Spd,
        Stat::Acc,
        Stat::Eva,
    ];

    /// The five stats backed by a species base value (Acc/Eva are stage-only).
    pub const BATTLE: [Stat; 5] = [Stat::Atk, Stat::Def, Stat::SpAtk, Stat::SpDef, Stat::Spd];

    pub fn index(self) -> usize {
        match self {
            Stat::Atk => 0,
            Stat::Def => 1,
            Stat::SpAtk => 2,
            Stat::SpDef => 3,
            Stat::Spd => 4,
            Stat::Acc => 5,
            Stat::Eva => 6,
        }
    }

    /// Text key for messages ("stat.atk" and friends).
    pub fn text_key(self) -> &'static str {
        match self {
            Stat::Atk => "stat.atk",
            Stat::Def => "stat.def",
            Stat::SpAtk => "stat.spatk",
            Stat::SpDef => "stat.spdef",
            Stat::Spd => "stat.spd",
            Stat::Acc => "stat.acc",
            Stat::Eva => "stat.eva",
        }
    }
}

/// Stat stages clamp to this magnitude in both directions.
pub const MAX_STAT_STAGE: i8 = 6;

/// Multiplier applied by a stat stage to Atk/Def/SpAtk/SpDef/Spd.
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(-MAX_STAT_STAGE, MAX_STAT_STAGE);
    if stage >= 0 {
        (2 + stage as i32) as f64 / 2.0
    } else {
        2.0 / (2 - stage as i32) as f64
    }
}

/// Elemental types. Tags use these for attach immunities (a grass type cannot
/// be seeded) and for type-list mutation (roosting strips Flying for the turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Infatuation only attaches across opposite, known genders.
    pub fn is_opposite(self, other: Gender) -> bool {
        matches!(
            (self, other),
            (Gender::Male, Gender::Female) | (Gender::Female, Gender::Male)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Non-volatile status conditions.
///
/// These are owned by an external subsystem; the engine only touches them where
/// a tag directly inflicts one (drowsiness putting the holder to sleep, a
/// bunker-style protection poisoning an attacker on contact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum StatusCondition {
    #[default]
    None,
    Sleep,
    Poison,
    Burn,
    Paralysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum WeatherKind {
    Sunny,
    HarshSun,
    Rain,
    HeavyRain,
    Sandstorm,
    Hail,
    Snow,
}

impl WeatherKind {
    pub fn is_sunlight(self) -> bool {
        matches!(self, WeatherKind::Sunny | WeatherKind::HarshSun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum TerrainKind {
    Electric,
    Grassy,
    Misty,
    Psychic,
}
