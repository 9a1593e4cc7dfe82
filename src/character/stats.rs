//! 属性与天赋标识

use serde::{Deserialize, Serialize};

/// 施法者属性（最终值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Mana,
    Mp5,
    /// 脱离五秒规则时的精神回蓝（每 5 秒）
    #[serde(rename = "regen_5sr")]
    Regen5sr,
    SpellHaste,
    SpellCrit,
    BonusHealing,
    Spirit,
    Intellect,
    Gcd,
}

impl Stat {
    pub fn name(self) -> &'static str {
        match self {
            Stat::Mana => "mana",
            Stat::Mp5 => "mp5",
            Stat::Regen5sr => "regen_5sr",
            Stat::SpellHaste => "spell_haste",
            Stat::SpellCrit => "spell_crit",
            Stat::BonusHealing => "bonus_healing",
            Stat::Spirit => "spirit",
            Stat::Intellect => "intellect",
            Stat::Gcd => "gcd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Talent {
    Naturalist,
    GiftOfNature,
    ImprovedRejuvenation,
    EmpoweredRejuvenation,
    EmpoweredTouch,
}

impl Talent {
    /// 天赋最大点数
    pub const fn max_points(self) -> u32 {
        match self {
            Talent::Naturalist | Talent::GiftOfNature | Talent::EmpoweredRejuvenation => 5,
            Talent::ImprovedRejuvenation => 3,
            Talent::EmpoweredTouch => 2,
        }
    }
}
