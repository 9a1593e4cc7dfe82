//! 时间线上的区间事件
//!
//! 三种区间：法术效果、忙碌（GCD/施法占用）、外部触发的增益窗口。

use super::time::SimTime;
use crate::rotation::OnUseItem;
use crate::spell::Spell;
use std::sync::Arc;

/// 区间负载
#[derive(Debug, Clone)]
pub enum EventKind {
    /// 法术效果区间（记录来源法术）
    Spell(Arc<Spell>),
    /// 忙碌区间，无负载
    Busy,
    /// 饰品主动效果窗口（记录触发物品）
    OnUse(Arc<OnUseItem>),
}

/// 一个区间：开始时间、持续时间与层数。
///
/// 只有时间线上最后一个区间可以被截断（新的施法在其结束前到达）。
#[derive(Debug, Clone)]
pub struct Event {
    start: SimTime,
    duration: SimTime,
    full_duration: SimTime,
    stacks: u32,
    kind: EventKind,
}

impl Event {
    pub fn spell(start: SimTime, duration: SimTime, spell: Arc<Spell>) -> Self {
        Self {
            start,
            duration,
            full_duration: duration,
            stacks: 1,
            kind: EventKind::Spell(spell),
        }
    }

    pub fn busy(start: SimTime, duration: SimTime) -> Self {
        Self {
            start,
            duration,
            full_duration: duration,
            stacks: 1,
            kind: EventKind::Busy,
        }
    }

    pub fn on_use(start: SimTime, duration: SimTime, item: Arc<OnUseItem>) -> Self {
        Self {
            start,
            duration,
            full_duration: duration,
            stacks: 1,
            kind: EventKind::OnUse(item),
        }
    }

    pub fn start(&self) -> SimTime {
        self.start
    }

    pub fn end(&self) -> SimTime {
        self.start + self.duration
    }

    pub fn duration(&self) -> SimTime {
        self.duration
    }

    /// 区间创建时的名义时长（截断前）
    pub fn full_duration(&self) -> SimTime {
        self.full_duration
    }

    /// 是否被后续刷新截断
    pub fn is_truncated(&self) -> bool {
        self.duration.0 + super::time::EPS < self.full_duration.0
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// 若为法术区间，返回来源法术
    pub fn as_spell(&self) -> Option<&Arc<Spell>> {
        match &self.kind {
            EventKind::Spell(spell) => Some(spell),
            _ => None,
        }
    }

    pub fn contains(&self, at: SimTime) -> bool {
        self.start <= at && at <= self.end()
    }

    /// 与 [start, end] 的重叠长度
    pub fn overlap(&self, start: SimTime, end: SimTime) -> SimTime {
        let lo = self.start.max(start);
        let hi = self.end().min(end);
        if hi > lo { hi - lo } else { SimTime::ZERO }
    }

    pub(crate) fn truncate_at(&mut self, at: SimTime) {
        if at < self.end() {
            self.duration = (at - self.start).max(SimTime::ZERO);
        }
    }

    pub(crate) fn set_stacks(&mut self, stacks: u32) {
        self.stacks = stacks;
    }
}
