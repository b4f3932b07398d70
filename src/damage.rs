//! Shared numeric helpers for tag-computed damage.

/// Fixed-fraction HP damage/heal amounts always deal at least 1.
pub fn fraction_of_max_hp(max_hp: u32, denominator: u32) -> u32 {
    (max_hp / denominator).max(1)
}

/// The standard physical damage formula at a fixed base power, used by
/// confusion-style self-hits. `roll_percent` is the uniform 85..=100 variance
/// roll supplied by the caller.
pub fn standard_physical_damage(
    level: u32,
    power: u32,
    attack: u32,
    defense: u32,
    roll_percent: u32,
) -> u32 {
    let defense = defense.max(1);
    let base = (2 * level / 5 + 2) * power * attack / defense / 50 + 2;
    (base * roll_percent / 100).max(1)
}
