//! 法术模块
//!
//! 法术按类型（直接/持续/混合/引导）建模为带负载的枚举；有效施法时间、
//! 法力消耗、持续时间等都是施法者快照上的纯函数。

pub mod catalog;
mod healing;

pub use catalog::lookup;
pub use healing::{Coefficient, Healing, apply_crit};

use crate::character::{Caster, Stat, Talent};
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

/// 法术数值的组成部分（装备修正的作用点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellPart {
    ManaCost,
    CastTime,
    HotDuration,
    TickPeriod,
    MaxStacks,
    /// 计算完成后的每跳治疗量
    FinalTick,
    /// 计算完成后的直接治疗量
    FinalDirect,
}

/// 法术类型及其治疗量负载
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpellKind {
    Direct {
        avg_heal: f64,
    },
    Hot {
        total_heal: f64,
    },
    Hybrid {
        direct_heal: f64,
        hot_heal: f64,
        /// 直接治疗在施放时（true）还是在效果自然结束时（false）生效
        direct_first: bool,
        direct_crits: bool,
    },
    Channeled {
        total_heal: f64,
    },
}

/// 法术基础数据（未经天赋/装备修正）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpellBase {
    pub mana_cost: f64,
    pub cast_time: f64,
    pub duration: f64,
    pub tick_period: f64,
    /// 0 直接治疗，1 普通 HoT，n 可叠加 HoT
    pub max_stacks: u32,
}

impl SpellBase {
    pub fn part(&self, part: SpellPart) -> f64 {
        match part {
            SpellPart::ManaCost => self.mana_cost,
            SpellPart::CastTime => self.cast_time,
            SpellPart::HotDuration => self.duration,
            SpellPart::TickPeriod => self.tick_period,
            SpellPart::MaxStacks => self.max_stacks as f64,
            SpellPart::FinalTick | SpellPart::FinalDirect => 0.0,
        }
    }

    pub fn n_ticks(&self) -> u32 {
        if self.tick_period > 0.0 {
            (self.duration / self.tick_period).floor() as u32
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spell {
    name: String,
    rank: u32,
    level: u32,
    base: SpellBase,
    kind: SpellKind,
    coefficient: Coefficient,
}

impl Spell {
    pub fn new(
        name: impl Into<String>,
        rank: u32,
        level: u32,
        base: SpellBase,
        kind: SpellKind,
        coefficient: Coefficient,
    ) -> Self {
        Self {
            name: name.into(),
            rank,
            level,
            base,
            kind,
            coefficient,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn base(&self) -> &SpellBase {
        &self.base
    }

    pub fn kind(&self) -> &SpellKind {
        &self.kind
    }

    pub fn coefficient(&self) -> Coefficient {
        self.coefficient
    }

    /// 形如 `rejuvenation-13`
    pub fn identifier(&self) -> String {
        format!("{}-{}", self.name, self.rank)
    }

    pub fn mana_cost(&self, caster: &dyn Caster) -> f64 {
        caster.spell_info(self, SpellPart::ManaCost).max(0.0)
    }

    /// 有效施法时间（急速修正后）。引导法术在整个引导期间占用施法者。
    pub fn cast_time(&self, caster: &dyn Caster) -> SimTime {
        match self.kind {
            SpellKind::Channeled { .. } => self.duration(caster),
            SpellKind::Direct { .. } | SpellKind::Hot { .. } | SpellKind::Hybrid { .. } => {
                let mut base = caster.spell_info(self, SpellPart::CastTime);
                if self.name == catalog::HEALING_TOUCH {
                    base -= 0.1 * caster.talent(Talent::Naturalist) as f64;
                }
                let haste = caster.get_stat(Stat::SpellHaste);
                SimTime(base.max(0.0) / (1.0 + haste))
            }
        }
    }

    pub fn duration(&self, caster: &dyn Caster) -> SimTime {
        SimTime(caster.spell_info(self, SpellPart::HotDuration).max(0.0))
    }

    pub fn tick_period(&self, caster: &dyn Caster) -> SimTime {
        SimTime(caster.spell_info(self, SpellPart::TickPeriod).max(0.0))
    }

    pub fn n_ticks(&self, caster: &dyn Caster) -> u32 {
        let period = self.tick_period(caster).secs();
        if period > 0.0 {
            (self.duration(caster).secs() / period).floor() as u32
        } else {
            0
        }
    }

    pub fn max_stacks(&self, caster: &dyn Caster) -> u32 {
        caster
            .spell_info(self, SpellPart::MaxStacks)
            .round()
            .max(1.0) as u32
    }

    /// 单次施放的平均治疗量：直接部分与每跳部分
    pub fn healing(&self, caster: &dyn Caster) -> Healing {
        healing::compute(self, caster)
    }
}
