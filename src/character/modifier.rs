//! 属性修正
//!
//! 每个修正只有一份声明式描述（作用属性、加/乘、数值来源），同时供数值求值
//! （`apply`）与公式字符串渲染（`formula`）使用。渲染时由调用方显式传入基础
//! 公式，不依赖任何全局角色实例。

use super::stats::Stat;
use super::Caster;
use crate::error::{Result, RotationError};
use crate::spell::SpellPart;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOp {
    Add,
    Mul,
}

impl ModifierOp {
    fn combine(self, base: f64, value: f64) -> f64 {
        match self {
            ModifierOp::Add => base + value,
            ModifierOp::Mul => base * value,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            ModifierOp::Add => "+",
            ModifierOp::Mul => "*",
        }
    }
}

/// 修正数值来源
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierSource {
    Constant(f64),
    /// 另一项属性的一定比例
    Scaled { stat: Stat, factor: f64 },
}

impl ModifierSource {
    fn value(&self, caster: &dyn Caster) -> f64 {
        match *self {
            ModifierSource::Constant(v) => v,
            ModifierSource::Scaled { stat, factor } => caster.get_stat(stat) * factor,
        }
    }

    fn template(&self) -> String {
        match *self {
            ModifierSource::Constant(v) => format!("{v}"),
            ModifierSource::Scaled { stat, factor } => {
                format!("(#Stats.{}# * {factor})", stat.name())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatModifier {
    pub name: String,
    pub stat: Stat,
    pub op: ModifierOp,
    pub source: ModifierSource,
}

impl StatModifier {
    pub fn new(name: impl Into<String>, stat: Stat, op: ModifierOp, source: ModifierSource) -> Self {
        Self {
            name: name.into(),
            stat,
            op,
            source,
        }
    }

    pub fn apply(&self, stat: Stat, base: f64, caster: &dyn Caster) -> f64 {
        if stat != self.stat {
            return base;
        }
        self.op.combine(base, self.source.value(caster))
    }

    pub fn formula(&self, stat: Stat, base_formula: &str) -> String {
        if stat != self.stat {
            return base_formula.to_string();
        }
        format!(
            "({base_formula} {} {})",
            self.op.symbol(),
            self.source.template()
        )
    }
}

/// 一组修正：先累加，后累乘。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierSet {
    pub name: String,
    modifiers: Vec<StatModifier>,
}

impl ModifierSet {
    pub fn new(name: impl Into<String>, modifiers: Vec<StatModifier>) -> Self {
        Self {
            name: name.into(),
            modifiers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn modifiers(&self) -> &[StatModifier] {
        &self.modifiers
    }

    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.name == name)
    }

    fn ordered(&self) -> impl Iterator<Item = &StatModifier> {
        let adds = self.modifiers.iter().filter(|m| m.op == ModifierOp::Add);
        let muls = self.modifiers.iter().filter(|m| m.op == ModifierOp::Mul);
        adds.chain(muls)
    }

    pub fn apply(&self, stat: Stat, base: f64, caster: &dyn Caster) -> f64 {
        self.ordered()
            .fold(base, |value, m| m.apply(stat, value, caster))
    }

    pub fn formula(&self, stat: Stat, base_formula: &str) -> String {
        self.ordered()
            .fold(base_formula.to_string(), |f, m| m.formula(stat, &f))
    }
}

/// 目标身上的增益（只影响落在该目标上的治疗）
pub fn target_buff(name: &str) -> Result<StatModifier> {
    let (stat, op, source) = match name {
        "amplify_magic" => (
            Stat::BonusHealing,
            ModifierOp::Add,
            ModifierSource::Constant(240.0),
        ),
        "dampen_magic" => (
            Stat::BonusHealing,
            ModifierOp::Add,
            ModifierSource::Constant(-240.0),
        ),
        "tree_of_life_healing" => (
            Stat::BonusHealing,
            ModifierOp::Add,
            ModifierSource::Scaled {
                stat: Stat::Spirit,
                factor: 0.25,
            },
        ),
        _ => {
            return Err(RotationError::UnknownModifier {
                name: name.to_string(),
            });
        }
    };
    Ok(StatModifier::new(name, stat, op, source))
}

/// 装备/套装对单个法术某一部分数值的修正
#[derive(Debug, Clone, PartialEq)]
pub struct SpellModifier {
    pub spell: String,
    pub part: SpellPart,
    pub op: ModifierOp,
    pub value: f64,
}

/// 依次应用匹配的法术修正：先累加，后累乘。
pub fn apply_spell_modifiers(
    modifiers: &[SpellModifier],
    spell: &str,
    part: SpellPart,
    base: f64,
) -> f64 {
    let matching = |op: ModifierOp| {
        modifiers
            .iter()
            .filter(move |m| m.op == op && m.part == part && m.spell == spell)
    };
    matching(ModifierOp::Add)
        .chain(matching(ModifierOp::Mul))
        .fold(base, |value, m| m.op.combine(value, m.value))
}
