//! 德鲁伊治疗法术目录（按名称 + 等级查询）

use super::{Coefficient, Spell, SpellBase, SpellKind};
use crate::error::{Result, RotationError};
use std::sync::Arc;

pub const HEALING_TOUCH: &str = "healing_touch";
pub const REJUVENATION: &str = "rejuvenation";
pub const REGROWTH: &str = "regrowth";
pub const LIFEBLOOM: &str = "lifebloom";
pub const TRANQUILITY: &str = "tranquility";

// (mana, level, avg_heal, cast_time)
const HEALING_TOUCH_RANKS: [(f64, u32, f64, f64); 13] = [
    (25.0, 1, 47.0, 1.5),
    (55.0, 8, 106.0, 2.0),
    (110.0, 14, 228.0, 2.5),
    (185.0, 20, 417.0, 3.0),
    (270.0, 26, 650.0, 3.5),
    (335.0, 32, 838.0, 3.5),
    (405.0, 38, 1050.0, 3.5),
    (495.0, 44, 1339.0, 3.5),
    (600.0, 50, 1685.0, 3.5),
    (720.0, 56, 2086.0, 3.5),
    (800.0, 60, 2472.0, 3.5),
    (820.0, 62, 2577.0, 3.5),
    (935.0, 69, 2952.0, 3.5),
];

// (mana, level, hot_heal)；12 秒，每 3 秒一跳
const REJUVENATION_RANKS: [(f64, u32, f64); 13] = [
    (25.0, 4, 32.0),
    (40.0, 10, 56.0),
    (75.0, 16, 116.0),
    (105.0, 22, 180.0),
    (135.0, 28, 244.0),
    (160.0, 34, 304.0),
    (195.0, 40, 388.0),
    (235.0, 46, 488.0),
    (280.0, 52, 608.0),
    (335.0, 58, 756.0),
    (360.0, 60, 888.0),
    (370.0, 63, 932.0),
    (415.0, 69, 1060.0),
];

// (mana, level, avg_direct_heal, hot_heal)；施法 2 秒，21 秒，每 3 秒一跳
const REGROWTH_RANKS: [(f64, u32, f64, f64); 10] = [
    (80.0, 12, 100.0, 98.0),
    (135.0, 18, 188.0, 175.0),
    (185.0, 24, 272.0, 259.0),
    (230.0, 30, 357.0, 343.0),
    (275.0, 36, 451.0, 427.0),
    (335.0, 42, 566.0, 546.0),
    (405.0, 48, 711.0, 686.0),
    (485.0, 54, 887.0, 861.0),
    (575.0, 60, 1061.0, 1064.0),
    (675.0, 65, 1285.0, 1274.0),
];

// (mana, level, hot_heal)；引导 8 秒，每 2 秒一跳
const TRANQUILITY_RANKS: [(f64, u32, f64); 5] = [
    (525.0, 30, 4.0 * 350.0),
    (705.0, 40, 4.0 * 514.0),
    (975.0, 50, 4.0 * 764.0),
    (1295.0, 60, 4.0 * 1096.0),
    (1650.0, 70, 4.0 * 1517.0),
];

fn healing_touch(rank: u32) -> Option<Spell> {
    let &(mana_cost, level, avg_heal, cast_time) =
        HEALING_TOUCH_RANKS.get(rank.checked_sub(1)? as usize)?;
    Some(Spell::new(
        HEALING_TOUCH,
        rank,
        level,
        SpellBase {
            mana_cost,
            cast_time,
            ..SpellBase::default()
        },
        SpellKind::Direct { avg_heal },
        Coefficient::Direct,
    ))
}

fn rejuvenation(rank: u32) -> Option<Spell> {
    let &(mana_cost, level, total_heal) =
        REJUVENATION_RANKS.get(rank.checked_sub(1)? as usize)?;
    Some(Spell::new(
        REJUVENATION,
        rank,
        level,
        SpellBase {
            mana_cost,
            cast_time: 0.0,
            duration: 12.0,
            tick_period: 3.0,
            max_stacks: 1,
        },
        SpellKind::Hot { total_heal },
        Coefficient::OverTime,
    ))
}

fn regrowth(rank: u32) -> Option<Spell> {
    let &(mana_cost, level, direct_heal, hot_heal) =
        REGROWTH_RANKS.get(rank.checked_sub(1)? as usize)?;
    Some(Spell::new(
        REGROWTH,
        rank,
        level,
        SpellBase {
            mana_cost,
            cast_time: 2.0,
            duration: 21.0,
            tick_period: 3.0,
            max_stacks: 1,
        },
        SpellKind::Hybrid {
            direct_heal,
            hot_heal,
            direct_first: true,
            direct_crits: true,
        },
        Coefficient::Regrowth,
    ))
}

fn lifebloom(rank: u32) -> Option<Spell> {
    (rank == 1).then(|| {
        Spell::new(
            LIFEBLOOM,
            1,
            64,
            SpellBase {
                mana_cost: 220.0,
                cast_time: 0.0,
                duration: 7.0,
                tick_period: 1.0,
                max_stacks: 3,
            },
            SpellKind::Hybrid {
                direct_heal: 600.0,
                hot_heal: 39.0 * 7.0,
                direct_first: false,
                direct_crits: false,
            },
            Coefficient::Lifebloom,
        )
    })
}

fn tranquility(rank: u32) -> Option<Spell> {
    let &(mana_cost, level, total_heal) =
        TRANQUILITY_RANKS.get(rank.checked_sub(1)? as usize)?;
    Some(Spell::new(
        TRANQUILITY,
        rank,
        level,
        SpellBase {
            mana_cost,
            cast_time: 0.0,
            duration: 8.0,
            tick_period: 2.0,
            max_stacks: 1,
        },
        SpellKind::Channeled { total_heal },
        Coefficient::Tranquility,
    ))
}

/// 已知法术的最高等级
pub fn max_rank(name: &str) -> Option<u32> {
    let max = match name {
        HEALING_TOUCH => HEALING_TOUCH_RANKS.len(),
        REJUVENATION => REJUVENATION_RANKS.len(),
        REGROWTH => REGROWTH_RANKS.len(),
        LIFEBLOOM => 1,
        TRANQUILITY => TRANQUILITY_RANKS.len(),
        _ => return None,
    };
    Some(max as u32)
}

/// 按名称与等级查询法术；未给出等级时返回最高等级。
pub fn lookup(name: &str, rank: Option<u32>) -> Result<Arc<Spell>> {
    let max = max_rank(name).ok_or_else(|| RotationError::UnknownSpell {
        name: name.to_string(),
    })?;
    let rank = rank.unwrap_or(max);
    let spell = match name {
        HEALING_TOUCH => healing_touch(rank),
        REJUVENATION => rejuvenation(rank),
        REGROWTH => regrowth(rank),
        LIFEBLOOM => lifebloom(rank),
        TRANQUILITY => tranquility(rank),
        _ => None,
    };
    spell.map(Arc::new).ok_or_else(|| RotationError::UnknownRank {
        name: name.to_string(),
        rank,
        max,
    })
}
