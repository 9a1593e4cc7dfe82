//! 施法者（角色）模块
//!
//! 排程核心只通过 [`Caster`] 读取属性、天赋和法术的有效数值；属性本身如何
//! 由装备/增益推导不在本 crate 范围内，这里的 [`Character`] 只是一个属性快照。

mod modifier;
mod stats;

pub use modifier::{
    ModifierOp, ModifierSet, ModifierSource, SpellModifier, StatModifier, apply_spell_modifiers,
    target_buff,
};
pub use stats::{Stat, Talent};

use crate::sim::CharacterSpec;
use crate::spell::{Spell, SpellPart};
use std::collections::BTreeMap;

/// 施法者接口：所有查询都是角色快照上的纯函数。
pub trait Caster {
    fn get_stat(&self, stat: Stat) -> f64;
    fn talent(&self, talent: Talent) -> u32;
    fn level(&self) -> u32;
    /// 对法术 `spell` 的某一部分数值应用装备修正
    fn apply_spell_modifiers(&self, spell: &str, part: SpellPart, value: f64) -> f64;

    /// 法术基础数据经装备修正后的值
    fn spell_info(&self, spell: &Spell, part: SpellPart) -> f64 {
        self.apply_spell_modifiers(spell.name(), part, spell.base().part(part))
    }
}

/// 角色属性快照
#[derive(Debug, Clone, Default)]
pub struct Character {
    pub name: String,
    level: u32,
    stats: BTreeMap<Stat, f64>,
    talents: BTreeMap<Talent, u32>,
    spell_modifiers: Vec<SpellModifier>,
}

impl Character {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
            ..Self::default()
        }
    }

    pub fn from_spec(spec: &CharacterSpec) -> Self {
        let mut character = Self::new(spec.name.clone(), spec.level);
        for (&stat, &value) in &spec.stats {
            character.stats.insert(stat, value);
        }
        for (&talent, &points) in &spec.talents {
            character = character.with_talent(talent, points);
        }
        character.spell_modifiers = spec
            .spell_modifiers
            .iter()
            .map(|m| SpellModifier {
                spell: m.spell.clone(),
                part: m.part,
                op: m.op,
                value: m.value,
            })
            .collect();
        character
    }

    pub fn with_stat(mut self, stat: Stat, value: f64) -> Self {
        self.stats.insert(stat, value);
        self
    }

    /// 天赋点数超过上限时截断
    pub fn with_talent(mut self, talent: Talent, points: u32) -> Self {
        self.talents.insert(talent, points.min(talent.max_points()));
        self
    }

    pub fn with_spell_modifier(mut self, modifier: SpellModifier) -> Self {
        self.spell_modifiers.push(modifier);
        self
    }
}

impl Caster for Character {
    fn get_stat(&self, stat: Stat) -> f64 {
        match (stat, self.stats.get(&stat)) {
            (_, Some(&value)) => value,
            (Stat::Gcd, None) => 1.5 / (1.0 + self.get_stat(Stat::SpellHaste)),
            _ => 0.0,
        }
    }

    fn talent(&self, talent: Talent) -> u32 {
        self.talents.get(&talent).copied().unwrap_or(0)
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn apply_spell_modifiers(&self, spell: &str, part: SpellPart, value: f64) -> f64 {
        apply_spell_modifiers(&self.spell_modifiers, spell, part, value)
    }
}

/// 在任意施法者之上叠加一组属性修正（例如某个目标身上的增益）。
pub struct Buffed<'a> {
    inner: &'a dyn Caster,
    modifiers: &'a ModifierSet,
}

impl<'a> Buffed<'a> {
    pub fn new(inner: &'a dyn Caster, modifiers: &'a ModifierSet) -> Self {
        Self { inner, modifiers }
    }
}

impl Caster for Buffed<'_> {
    fn get_stat(&self, stat: Stat) -> f64 {
        self.modifiers
            .apply(stat, self.inner.get_stat(stat), self.inner)
    }

    fn talent(&self, talent: Talent) -> u32 {
        self.inner.talent(talent)
    }

    fn level(&self) -> u32 {
        self.inner.level()
    }

    fn apply_spell_modifiers(&self, spell: &str, part: SpellPart, value: f64) -> f64 {
        self.inner.apply_spell_modifiers(spell, part, value)
    }
}
