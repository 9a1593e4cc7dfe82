//! 排程统计
//!
//! 在时间窗口 [start, end] 内遍历时间线，收集每一跳/每次直接治疗以及施法时
//! 扣除的法力，再合并为按目标与整体的汇总。

use super::scheduler::{RegenTick, Rotation};
use crate::character::{Buffed, Caster, Stat};
use crate::sim::{Event, SimTime, Timeline};
use crate::spell::{SpellKind, apply_crit};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 跳数判定的浮点容差
const TICK_TOLERANCE: f64 = 1e-9;

/// 一次治疗或法力消耗，附带可追溯的符号标签（如 `#rejuvenation-13.hot_tick#`）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub at: SimTime,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineStats {
    pub start: SimTime,
    pub end: SimTime,
    pub duration: SimTime,
    /// 窗口内效果生效的累计时长
    pub uptime: SimTime,
    pub heals: Vec<Contribution>,
    pub mana_costs: Vec<Contribution>,
    pub total_heal: f64,
    pub total_mana: f64,
    pub hps: f64,
    pub mps: f64,
    pub hpm: f64,
    pub total_regen: f64,
    /// 按当前净消耗速率耗尽法力所需时间；净消耗不为正时为 None
    pub time_to_oom: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GcdUsage {
    pub used: usize,
    pub wasted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RotationStats {
    #[serde(flatten)]
    /// 整体汇总；其中 `uptime` 为施法者忙碌时长
    pub overall: TimelineStats,
    pub gcd: GcdUsage,
    pub timelines: BTreeMap<String, TimelineStats>,
    pub targets: BTreeMap<String, TimelineStats>,
}

fn in_window(at: SimTime, start: SimTime, end: SimTime) -> bool {
    start <= at && at <= end
}

/// 区间与 [start, end] 有交集，包括完全覆盖窗口的区间
fn overlaps(event: &Event, start: SimTime, end: SimTime) -> bool {
    event.start() <= end && event.end() >= start
}

/// 单个法术区间在窗口内产生的治疗
pub fn event_heals(
    event: &Event,
    caster: &dyn Caster,
    start: SimTime,
    end: SimTime,
) -> Vec<Contribution> {
    let Some(spell) = event.as_spell() else {
        return Vec::new();
    };
    let id = spell.identifier();
    let healing = spell.healing(caster);
    let crit = caster.get_stat(Stat::SpellCrit);
    let period = spell.tick_period(caster);

    let ticks = |value: f64, label: String| -> Vec<Contribution> {
        (1..=spell.n_ticks(caster))
            .map(|k| SimTime(period.secs() * k as f64))
            .take_while(|offset| offset.secs() <= event.duration().secs() + TICK_TOLERANCE)
            .map(|offset| Contribution {
                at: event.start() + offset,
                value,
                label: label.clone(),
            })
            .collect()
    };

    let mut heals = match *spell.kind() {
        SpellKind::Direct { .. } => vec![Contribution {
            at: event.start(),
            value: apply_crit(healing.direct, crit),
            label: format!("#{id}.avg_direct_heal#"),
        }],
        SpellKind::Hot { .. } | SpellKind::Channeled { .. } => {
            ticks(healing.tick, format!("#{id}.hot_tick#"))
        }
        SpellKind::Hybrid {
            direct_first,
            direct_crits,
            ..
        } => {
            let mut heals = Vec::new();
            // 被刷新截断的后置直接治疗（如绽放）不会触发
            if direct_first || !event.is_truncated() {
                heals.push(Contribution {
                    at: if direct_first { event.start() } else { event.end() },
                    value: if direct_crits {
                        apply_crit(healing.direct, crit)
                    } else {
                        healing.direct
                    },
                    label: format!("#{id}.avg_direct_heal#"),
                });
            }
            let label = if spell.base().max_stacks > 1 {
                format!("#{id}.hot_tick{}#", event.stacks())
            } else {
                format!("#{id}.hot_tick#")
            };
            heals.extend(ticks(healing.tick * event.stacks() as f64, label));
            heals
        }
    };
    heals.retain(|c| in_window(c.at, start, end));
    heals
}

fn sort_by_time(items: &mut [Contribution]) {
    items.sort_by(|a, b| a.at.secs().total_cmp(&b.at.secs()));
}

impl TimelineStats {
    fn empty(start: SimTime, end: SimTime) -> Self {
        Self {
            start,
            end,
            duration: (end - start).max(SimTime::ZERO),
            ..Self::default()
        }
    }

    /// 单条时间线的统计；法力在效果生效（施法完成）时计入。
    pub fn from_timeline(
        timeline: &Timeline,
        caster: &dyn Caster,
        start: SimTime,
        end: SimTime,
    ) -> Self {
        let mut stats = Self::empty(start, end);
        stats.uptime = timeline.active_time(start, end);
        for event in timeline.iter().filter(|e| overlaps(e, start, end)) {
            let Some(spell) = event.as_spell() else {
                continue;
            };
            stats.heals.extend(event_heals(event, caster, start, end));
            if in_window(event.start(), start, end) {
                stats.mana_costs.push(Contribution {
                    at: event.start(),
                    value: spell.mana_cost(caster),
                    label: format!("#{}.mana_cost#", spell.identifier()),
                });
            }
        }
        sort_by_time(&mut stats.heals);
        stats.total_heal = stats.heals.iter().map(|c| c.value).sum();
        stats.total_mana = stats.mana_costs.iter().map(|c| c.value).sum();
        stats
    }

    /// 合并多条统计：窗口取最早开始与最晚结束，贡献按时间重新排序。
    pub fn merge<'a>(parts: impl IntoIterator<Item = &'a TimelineStats>) -> Self {
        let mut merged: Option<Self> = None;
        for part in parts {
            let acc = merged.get_or_insert_with(|| Self::empty(part.start, part.end));
            acc.start = acc.start.min(part.start);
            acc.end = acc.end.max(part.end);
            acc.uptime += part.uptime;
            acc.heals.extend(part.heals.iter().cloned());
            acc.mana_costs.extend(part.mana_costs.iter().cloned());
        }
        let Some(mut merged) = merged else {
            return Self::default();
        };
        merged.duration = (merged.end - merged.start).max(SimTime::ZERO);
        sort_by_time(&mut merged.heals);
        sort_by_time(&mut merged.mana_costs);
        merged.total_heal = merged.heals.iter().map(|c| c.value).sum();
        merged.total_mana = merged.mana_costs.iter().map(|c| c.value).sum();
        merged
    }

    /// 每秒治疗、每秒耗蓝、每点法力治疗量与耗尽时间。
    pub fn apply_rates(&mut self, regen: &[RegenTick], max_mana: f64) {
        self.total_regen = regen.iter().map(|r| r.mana).sum();
        self.hpm = if self.total_mana > 0.0 {
            self.total_heal / self.total_mana
        } else {
            0.0
        };
        let duration = self.duration.secs();
        if duration <= 0.0 {
            self.hps = 0.0;
            self.mps = 0.0;
            self.time_to_oom = None;
            return;
        }
        self.hps = self.total_heal / duration;
        self.mps = self.total_mana / duration;
        let net_drain = self.mps - self.total_regen / duration;
        self.time_to_oom = (net_drain > 0.0).then(|| max_mana / net_drain);
    }
}

/// 忙碌时间线中超过一个 GCD 的空档：每多一个完整 GCD 记一次浪费。
pub fn wasted_gcds(busy: &Timeline, gcd: SimTime, start: SimTime, end: SimTime) -> usize {
    if gcd.secs() <= 0.0 {
        return 0;
    }
    let events: Vec<&Event> = busy
        .iter()
        .filter(|e| overlaps(e, start, end))
        .collect();
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return 0;
    };

    let count = |gap: SimTime| -> usize {
        if gap > gcd {
            (gap.secs() / gcd.secs()).floor() as usize
        } else {
            0
        }
    };

    let mut wasted = count(first.start() - start);
    wasted += events
        .windows(2)
        .map(|pair| count(pair[1].start() - pair[0].end()))
        .sum::<usize>();
    wasted + count(end - last.end())
}

impl Rotation {
    /// 统计窗口 [start, end]；`end` 缺省为排程结束时刻。
    pub fn stats(&self, caster: &dyn Caster, start: SimTime, end: Option<SimTime>) -> RotationStats {
        let end = end.unwrap_or_else(|| self.end());
        let max_mana = caster.get_stat(Stat::Mana);
        let regen = self.regen_ticks(caster, start, end);

        let mut timelines = BTreeMap::new();
        // 同一条时间线只计一次
        let mut by_target: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (assignment, timeline) in self.timelines() {
            let mut stats = match self.assignments().buffs(assignment.target()) {
                Some(buffs) => {
                    TimelineStats::from_timeline(timeline, &Buffed::new(caster, buffs), start, end)
                }
                None => TimelineStats::from_timeline(timeline, caster, start, end),
            };
            stats.apply_rates(&regen, max_mana);
            by_target
                .entry(assignment.target().to_string())
                .or_default()
                .insert(timeline.name().to_string());
            timelines.insert(timeline.name().to_string(), stats);
        }

        let targets = by_target
            .into_iter()
            .map(|(target, names)| {
                let mut merged =
                    TimelineStats::merge(names.iter().filter_map(|n| timelines.get(n)));
                merged.apply_rates(&regen, max_mana);
                (target, merged)
            })
            .collect();

        let mut overall = if timelines.is_empty() {
            TimelineStats::empty(start, end)
        } else {
            TimelineStats::merge(timelines.values())
        };
        overall.uptime = self.busy_timeline().active_time(start, end);
        overall.apply_rates(&regen, max_mana);

        let gcd = SimTime(caster.get_stat(Stat::Gcd));
        RotationStats {
            gcd: GcdUsage {
                used: self
                    .gcd_timeline()
                    .iter()
                    .filter(|e| in_window(e.start(), start, end))
                    .count(),
                wasted: wasted_gcds(self.busy_timeline(), gcd, start, end),
            },
            overall,
            timelines,
            targets,
        }
    }
}
