//! 排程器
//!
//! 贪心单遍前瞻：每个决策点按优先级扫描所有任务，决定立即施法或等待，
//! 空闲时间交给填充任务的克隆目标。

use super::assignment::{Assignment, AssignmentKey, Assignments};
use crate::character::{Caster, Stat};
use crate::error::{Result, RotationError};
use crate::sim::{EPS, SimTime, Timeline};
use crate::spell::SpellKind;
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// 反应时间余量（秒）
pub const REACTION: SimTime = SimTime(0.01);
/// 回蓝间隔（秒）
pub const REGEN_PERIOD: f64 = 2.0;
/// 施法后进入低速回蓝的窗口（“五秒规则”）
pub const FIVE_SECOND_RULE: f64 = 5.0;
/// 无限时长模式下的硬性上限
pub const UNBOUNDED_HORIZON: SimTime = SimTime(86_400.0);

/// 战斗时长
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FightDuration {
    Bounded(SimTime),
    /// 一直施法直到法力耗尽
    UntilOom,
}

impl FightDuration {
    /// 负数表示“直到法力耗尽”
    pub fn from_secs(secs: f64) -> Self {
        if secs < 0.0 {
            FightDuration::UntilOom
        } else {
            FightDuration::Bounded(SimTime(secs))
        }
    }
}

/// 决策结果
#[derive(Debug, Clone)]
pub enum Decision {
    Cast(Assignment),
    Wait(SimTime),
}

/// 施法记录
#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    pub at: SimTime,
    pub key: AssignmentKey,
    pub mana_cost: f64,
}

/// 一次回蓝
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegenTick {
    pub at: SimTime,
    pub mana: f64,
}

/// 一次排程的结果：每个任务一条时间线，外加共享的 GCD / 施法 / 忙碌时间线。
#[derive(Debug, Clone)]
pub struct Rotation {
    assignments: Assignments,
    timelines: BTreeMap<AssignmentKey, Timeline>,
    gcd: Timeline,
    cast: Timeline,
    busy: Timeline,
    fillers: Vec<Assignment>,
    casts: Vec<Cast>,
    remaining_mana: f64,
}

impl Rotation {
    pub fn new(assignments: Assignments) -> Self {
        let mut rotation = Self {
            assignments,
            timelines: BTreeMap::new(),
            gcd: Timeline::new("gcd"),
            cast: Timeline::new("cast"),
            busy: Timeline::new("uptime"),
            fillers: Vec::new(),
            casts: Vec::new(),
            remaining_mana: 0.0,
        };
        rotation.reset();
        rotation
    }

    fn reset(&mut self) {
        self.timelines = self
            .assignments
            .iter()
            .map(|a| (a.key(), Timeline::new(a.to_string())))
            .collect();
        self.gcd = Timeline::new("gcd");
        self.cast = Timeline::new("cast");
        self.busy = Timeline::new("uptime");
        self.fillers.clear();
        self.casts.clear();
        self.remaining_mana = 0.0;
    }

    /// 从零开始重新排程，覆盖之前的结果。
    #[tracing::instrument(skip(self, caster), fields(rotation = %self.assignments.name))]
    pub fn optimal_rotation(&mut self, caster: &dyn Caster, fight: FightDuration) -> Result<()> {
        self.reset();
        let gcd = SimTime(caster.get_stat(Stat::Gcd));
        let mut now = SimTime::ZERO;
        let mut mana = caster.get_stat(Stat::Mana);
        let mut next_regen = SimTime(REGEN_PERIOD);

        info!(?fight, gcd = gcd.secs(), mana, "▶️  开始排程");

        loop {
            let running = match fight {
                FightDuration::Bounded(end) => now < end,
                FightDuration::UntilOom => mana > 0.0 && now < UNBOUNDED_HORIZON,
            };
            if !running {
                break;
            }

            match self.action_at(now + SimTime(EPS), gcd, caster)? {
                Decision::Cast(assignment) => {
                    let start = now + SimTime(EPS);
                    let spell = assignment.spell();
                    let cast_time = spell.cast_time(caster);
                    let busy_for = gcd.max(cast_time);
                    let mana_cost = spell.mana_cost(caster);

                    self.gcd.push_busy(start, gcd);
                    self.cast.push_busy(start, cast_time);
                    self.busy.push_busy(start, busy_for);

                    // 引导法术在引导开始时生效，其余法术在施法完成时生效
                    let lands_at = match spell.kind() {
                        SpellKind::Channeled { .. } => start,
                        SpellKind::Direct { .. } | SpellKind::Hot { .. } | SpellKind::Hybrid { .. } => {
                            start + cast_time
                        }
                    };
                    let key = assignment.key();
                    let timeline = self
                        .timelines
                        .entry(key.clone())
                        .or_insert_with(|| Timeline::new(assignment.to_string()));
                    timeline.push_spell(
                        lands_at,
                        spell,
                        spell.duration(caster),
                        spell.max_stacks(caster),
                    )?;

                    mana -= mana_cost;
                    debug!(
                        now = start.secs(),
                        spell = %spell.identifier(),
                        target = assignment.target(),
                        mana,
                        "施法"
                    );
                    self.casts.push(Cast {
                        at: start,
                        key,
                        mana_cost,
                    });
                    now += busy_for + SimTime(EPS);
                }
                Decision::Wait(wait) => {
                    trace!(now = now.secs(), wait = wait.secs(), "等待");
                    now += wait;
                }
            }

            while next_regen <= now + SimTime(EPS) {
                let gained = self.regen_at(caster, next_regen);
                mana += gained;
                trace!(at = next_regen.secs(), gained, mana, "回蓝");
                next_regen += SimTime(REGEN_PERIOD);
            }
        }

        self.remaining_mana = mana;
        info!(
            casts = self.casts.len(),
            fillers = self.fillers.len(),
            final_time = now.secs(),
            remaining_mana = mana,
            "✅ 排程完成"
        );
        Ok(())
    }

    /// 某一时刻的决策：按优先级扫描任务，然后处理法术队列与填充。
    ///
    /// 高优先级任务到期刷新时会占用 `max(gcd, cast_time)`，低优先级任务的
    /// 截止时间要先扣掉这些预留，再计算等待上限与前瞻窗口。
    pub(crate) fn action_at(
        &mut self,
        now: SimTime,
        gcd: SimTime,
        caster: &dyn Caster,
    ) -> Result<Decision> {
        let mut lookahead = SimTime::FOREVER;
        let mut wait = SimTime::FOREVER;
        let mut queue_due = false;
        // （距到期的时间，占用时长）
        let mut reservations: Vec<(SimTime, SimTime)> = Vec::new();

        for assignment in self.assignments.iter() {
            let spell = assignment.spell();
            let cast_time = spell.cast_time(caster);
            let busy_for = gcd.max(cast_time);
            // 施法占用会挡住更高优先级的刷新
            if busy_for >= lookahead {
                continue;
            }

            let timeline = self.timelines.get(&assignment.key());
            let Some(event) = timeline.and_then(|t| t.event_at(now)) else {
                trace!(now = now.secs(), target = assignment.target(), "效果未生效，立即施法");
                return Ok(Decision::Cast(assignment.clone()));
            };

            let remaining = event.end() - now;
            let period = spell.tick_period(caster);
            if assignment.allow_fade() && event.stacks() == assignment.fade_at_stacks() {
                // 让效果自然结束，新施法恰好在最后一跳之后生效
                if cast_time > remaining {
                    return Ok(Decision::Cast(assignment.clone()));
                }
                wait = wait.min(remaining - cast_time + REACTION);
                reservations.push((remaining - cast_time, busy_for));
                continue;
            }

            let deadline = remaining - cast_time;
            let reserved = reservations
                .iter()
                .filter(|(due, _)| *due < deadline)
                .fold(SimTime::ZERO, |acc, (_, busy)| acc + *busy);
            if remaining - reserved <= period {
                if reserved > SimTime::ZERO {
                    trace!(
                        now = now.secs(),
                        reserved = reserved.secs(),
                        target = assignment.target(),
                        "为高优先级刷新让出时间，提前施法"
                    );
                }
                return Ok(Decision::Cast(assignment.clone()));
            }
            lookahead = lookahead.min(deadline - REACTION - reserved);
            wait = wait.min(deadline - period + REACTION - reserved);
            reservations.push((remaining - period, busy_for));
            if assignment.queue() && remaining <= busy_for + REACTION {
                queue_due = true;
            }
        }

        if queue_due {
            let (remaining, assignment) = self
                .queue_candidate(now, gcd, caster)
                .ok_or(RotationError::EmptySpellQueue { at: now })?;
            debug!(
                now = now.secs(),
                remaining = remaining.secs(),
                target = assignment.target(),
                "法术队列提前刷新"
            );
            return Ok(Decision::Cast(assignment));
        }

        Ok(self.check_filler(now, wait.max(REACTION), gcd, caster))
    }

    /// 可排队任务中即将结束、剩余时间最短的一个：效果生效、不在淡出流程中，
    /// 且剩余时间不超过一次占用加反应时间。
    pub(crate) fn queue_candidate(
        &self,
        now: SimTime,
        gcd: SimTime,
        caster: &dyn Caster,
    ) -> Option<(SimTime, Assignment)> {
        self.assignments
            .queue_eligible()
            .filter_map(|assignment| {
                let event = self.timelines.get(&assignment.key())?.event_at(now)?;
                if assignment.allow_fade() && event.stacks() == assignment.fade_at_stacks() {
                    return None;
                }
                let spell = assignment.spell();
                let remaining = event.end() - now;
                let due = remaining > spell.tick_period(caster)
                    && remaining <= gcd.max(spell.cast_time(caster)) + REACTION;
                due.then(|| (remaining, assignment.clone()))
            })
            .min_by(|a, b| a.0.secs().total_cmp(&b.0.secs()))
    }

    /// 用填充任务消耗空闲时间：复用已过期的克隆目标，或新建一个。
    fn check_filler(
        &mut self,
        now: SimTime,
        wait: SimTime,
        gcd: SimTime,
        caster: &dyn Caster,
    ) -> Decision {
        let Some(filler) = self.assignments.filler() else {
            return Decision::Wait(wait);
        };
        if gcd.max(filler.spell().cast_time(caster)) > wait {
            return Decision::Wait(wait);
        }

        let free = self.fillers.iter().find(|clone| {
            self.timelines
                .get(&clone.key())
                .is_none_or(|t| !t.is_active(now + REACTION))
        });
        if let Some(clone) = free {
            return Decision::Cast(clone.clone());
        }

        let clone = filler.filler_clone(&format!("_{}", self.fillers.len()));
        debug!(now = now.secs(), target = clone.target(), "新建填充目标");
        self.timelines
            .insert(clone.key(), Timeline::new(clone.to_string()));
        self.fillers.push(clone.clone());
        Decision::Cast(clone)
    }

    /// `t` 时刻一次回蓝的法力值：距上次施法结束超过 5 秒时按脱战速率。
    fn regen_at(&self, caster: &dyn Caster, t: SimTime) -> f64 {
        let mp5 = caster.get_stat(Stat::Mp5);
        let in_5sr = REGEN_PERIOD * mp5 / 5.0;
        let out_5sr = REGEN_PERIOD * (mp5 + caster.get_stat(Stat::Regen5sr)) / 5.0;
        match self.cast.event_before(t) {
            Some(before) if (t - before.end()).secs() <= FIVE_SECOND_RULE => in_5sr,
            _ => out_5sr,
        }
    }

    /// [start, end) 内的回蓝；第一跳对齐到不晚于 `start` 的 2 秒整数倍。
    pub fn regen_ticks(&self, caster: &dyn Caster, start: SimTime, end: SimTime) -> Vec<RegenTick> {
        let mut ticks = Vec::new();
        let mut t = SimTime(start.secs() - start.secs().rem_euclid(REGEN_PERIOD));
        while t < end {
            ticks.push(RegenTick {
                at: t,
                mana: self.regen_at(caster, t),
            });
            t += SimTime(REGEN_PERIOD);
        }
        ticks
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    fn filled(&self) -> impl Iterator<Item = &Timeline> {
        self.timelines.values().filter(|t| !t.is_empty())
    }

    /// 最早的效果开始时间；没有任何效果时为 0
    pub fn start(&self) -> SimTime {
        self.filled()
            .map(Timeline::start)
            .reduce(SimTime::min)
            .unwrap_or(SimTime::ZERO)
    }

    pub fn end(&self) -> SimTime {
        self.filled()
            .map(Timeline::end)
            .reduce(SimTime::max)
            .unwrap_or(SimTime::ZERO)
    }

    pub fn duration(&self) -> SimTime {
        self.end() - self.start()
    }

    pub fn gcd_timeline(&self) -> &Timeline {
        &self.gcd
    }

    pub fn cast_timeline(&self) -> &Timeline {
        &self.cast
    }

    /// 施法占用与 GCD 取较长者后的忙碌时间线
    pub fn busy_timeline(&self) -> &Timeline {
        &self.busy
    }

    pub fn filler_targets(&self) -> Vec<&str> {
        self.fillers.iter().map(Assignment::target).collect()
    }

    pub fn timeline(&self, key: &AssignmentKey) -> Option<&Timeline> {
        self.timelines.get(key)
    }

    /// 按优先级排列的任务时间线，随后是填充克隆。
    pub fn timelines(&self) -> Vec<(&Assignment, &Timeline)> {
        self.assignments
            .iter()
            .chain(self.fillers.iter())
            .filter_map(|a| self.timelines.get(&a.key()).map(|t| (a, t)))
            .collect()
    }

    pub fn casts(&self) -> &[Cast] {
        &self.casts
    }

    pub fn remaining_mana(&self) -> f64 {
        self.remaining_mana
    }
}
