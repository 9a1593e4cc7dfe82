mod assignment;
mod character;
mod scheduler;

use crate::character::{Character, Stat};
use crate::rotation::{Assignment, Assignments, FightDuration, Rotation};
use crate::sim::SimTime;
use crate::spell;

/// 回蓝为 0、法力充足的 70 级德鲁伊
pub(crate) fn druid() -> Character {
    Character::new("druid", 70)
        .with_stat(Stat::Mana, 100_000.0)
        .with_stat(Stat::Mp5, 0.0)
        .with_stat(Stat::Regen5sr, 0.0)
        .with_stat(Stat::BonusHealing, 1_000.0)
        .with_stat(Stat::SpellCrit, 0.1)
}

pub(crate) fn assign(spell_name: &str, target: &str) -> Assignment {
    Assignment::new(
        spell::lookup(spell_name, None).expect("known spell"),
        target,
    )
}

pub(crate) fn run(assignments: Assignments, fight_secs: f64) -> Rotation {
    let mut rotation = Rotation::new(assignments);
    rotation
        .optimal_rotation(&druid(), FightDuration::Bounded(SimTime(fight_secs)))
        .expect("schedule rotation");
    rotation
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
