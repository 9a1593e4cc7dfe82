//! 治疗量计算
//!
//! 系数 = 低等级惩罚 × 降级惩罚 × 施法时间/持续时间系数 ×（1 + 强化天赋）。

use super::{Spell, SpellKind, SpellPart};
use crate::character::{Caster, Stat, Talent};

/// 单次施放的平均治疗量
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Healing {
    pub direct: f64,
    pub tick: f64,
}

/// 法术加成系数策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coefficient {
    /// 施法时间 / 3.5
    Direct,
    /// 持续时间 / 15
    OverTime,
    /// 直接与持续部分按两者比例分摊
    Hybrid,
    Regrowth,
    Lifebloom,
    Tranquility,
}

fn under_level_20(spell: &Spell) -> f64 {
    (1.0 - (20.0 - spell.level() as f64) * 0.0375).min(1.0)
}

fn downrank(spell: &Spell, caster: &dyn Caster) -> f64 {
    let level = caster.level().max(1) as f64;
    ((spell.level() as f64 + 11.0) / level).min(1.0)
}

fn cast_time_coef(spell: &Spell) -> f64 {
    (spell.base().cast_time / 3.5).min(1.0)
}

fn duration_coef(spell: &Spell) -> f64 {
    (spell.base().duration / 15.0).min(1.0)
}

impl Coefficient {
    /// 返回（直接部分系数，持续部分系数）
    pub fn value(self, spell: &Spell, caster: &dyn Caster) -> (f64, f64) {
        let penalty = under_level_20(spell) * downrank(spell, caster);
        match self {
            Coefficient::Direct => {
                let empowered = 1.0 + 0.1 * caster.talent(Talent::EmpoweredTouch) as f64;
                (penalty * cast_time_coef(spell) * empowered, 0.0)
            }
            Coefficient::OverTime => {
                let empowered = empowered_rejuvenation(caster);
                (0.0, penalty * duration_coef(spell) * empowered)
            }
            Coefficient::Hybrid => {
                let cast = cast_time_coef(spell);
                let hot = duration_coef(spell);
                let total = cast + hot;
                if total <= 0.0 {
                    return (0.0, 0.0);
                }
                let over_time = hot / total;
                let empowered = empowered_rejuvenation(caster);
                (
                    (1.0 - over_time) * cast * penalty * empowered,
                    over_time * hot * penalty * empowered,
                )
            }
            Coefficient::Regrowth => {
                let empowered = empowered_rejuvenation(caster);
                (
                    penalty * 0.286 * empowered,
                    penalty * 0.6914 * empowered,
                )
            }
            Coefficient::Lifebloom => {
                let empowered = empowered_rejuvenation(caster);
                (0.3422 * empowered, 0.5194 * empowered)
            }
            Coefficient::Tranquility => {
                let empowered = empowered_rejuvenation(caster);
                (0.0, penalty * 1.1399 * empowered)
            }
        }
    }
}

fn empowered_rejuvenation(caster: &dyn Caster) -> f64 {
    1.0 + 0.04 * caster.talent(Talent::EmpoweredRejuvenation) as f64
}

/// 暴击期望：暴击治疗量为 1.5 倍
pub fn apply_crit(value: f64, crit_chance: f64) -> f64 {
    (1.0 + crit_chance * 0.5) * value
}

pub(super) fn compute(spell: &Spell, caster: &dyn Caster) -> Healing {
    let bh = caster.get_stat(Stat::BonusHealing);
    let (direct_coef, hot_coef) = spell.coefficient().value(spell, caster);
    let gift = 1.0 + 0.02 * caster.talent(Talent::GiftOfNature) as f64;
    let n_ticks = spell.base().n_ticks().max(1) as f64;
    let per_tick = |total: f64| (total + bh * hot_coef) / n_ticks;

    let (direct, tick) = match *spell.kind() {
        SpellKind::Direct { avg_heal } => ((avg_heal + direct_coef * bh) * gift, 0.0),
        SpellKind::Hot { total_heal } => {
            let improved =
                gift + 0.05 * caster.talent(Talent::ImprovedRejuvenation) as f64;
            (0.0, per_tick(total_heal) * improved)
        }
        SpellKind::Hybrid {
            direct_heal,
            hot_heal,
            ..
        } => (
            (direct_heal + direct_coef * bh) * gift,
            per_tick(hot_heal) * gift,
        ),
        SpellKind::Channeled { total_heal } => (0.0, per_tick(total_heal) * gift),
    };

    Healing {
        direct: caster.apply_spell_modifiers(spell.name(), SpellPart::FinalDirect, direct),
        tick: caster.apply_spell_modifiers(spell.name(), SpellPart::FinalTick, tick),
    }
}
