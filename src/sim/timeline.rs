//! 时间线
//!
//! 每个（法术，目标）组合一条按开始时间严格有序的区间序列，另有共享的
//! GCD / 施法 / 忙碌时间线。只追加，只有最后一个区间可被修改，因此查询
//! 直接在有序 Vec 上二分。

use super::event::{Event, EventKind};
use super::time::SimTime;
use crate::error::{Result, RotationError};
use crate::rotation::OnUseItem;
use crate::spell::Spell;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    name: String,
    events: Vec<Event>,
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// 追加法术效果区间。
    ///
    /// 若上一个区间尚未结束，则将其截断到新区间的开始，并把层数加一（不超过
    /// `max_stacks`）；否则新建一条层数为 1 的记录。
    pub fn push_spell(
        &mut self,
        start: SimTime,
        spell: &Arc<Spell>,
        duration: SimTime,
        max_stacks: u32,
    ) -> Result<()> {
        self.check_order(start);
        let mut event = Event::spell(start, duration, Arc::clone(spell));
        if let Some(prev) = self.events.last_mut() {
            let prev_spell = match prev.kind() {
                EventKind::Spell(s) => s.identifier(),
                EventKind::Busy => "busy".to_string(),
                EventKind::OnUse(item) => item.name.clone(),
            };
            if prev_spell != spell.identifier() {
                return Err(RotationError::MixedTimeline {
                    expected: prev_spell,
                    got: spell.identifier(),
                });
            }
            if prev.end() > start {
                prev.truncate_at(start);
                event.set_stacks((prev.stacks() + 1).min(max_stacks.max(1)));
            }
        }
        self.events.push(event);
        Ok(())
    }

    /// 追加忙碌区间（GCD 或施法占用）
    pub fn push_busy(&mut self, start: SimTime, duration: SimTime) {
        self.check_order(start);
        self.events.push(Event::busy(start, duration));
    }

    /// 追加饰品增益窗口
    pub fn push_on_use(&mut self, start: SimTime, duration: SimTime, item: &Arc<OnUseItem>) {
        self.check_order(start);
        self.events
            .push(Event::on_use(start, duration, Arc::clone(item)));
    }

    fn check_order(&self, start: SimTime) {
        debug_assert!(
            self.events.last().is_none_or(|e| e.start() <= start),
            "timeline {} must stay sorted by start time",
            self.name
        );
    }

    /// 第一个 `start > at` 的区间下标
    fn index_after(&self, at: SimTime) -> usize {
        self.events.partition_point(|e| e.start() <= at)
    }

    /// 最后一个开始时间不晚于 `at` 的区间
    pub fn event_before(&self, at: SimTime) -> Option<&Event> {
        match self.index_after(at) {
            0 => None,
            idx => self.events.get(idx - 1),
        }
    }

    /// `at` 时刻处于生效状态的区间
    pub fn event_at(&self, at: SimTime) -> Option<&Event> {
        self.event_before(at).filter(|e| e.contains(at))
    }

    /// 开始时间晚于 `at` 的第 `n` 个区间（n 从 0 起）
    pub fn event_after(&self, at: SimTime, n: usize) -> Option<&Event> {
        self.events.get(self.index_after(at) + n)
    }

    pub fn is_active(&self, at: SimTime) -> bool {
        self.event_at(at).is_some()
    }

    pub fn remaining_active(&self, at: SimTime) -> SimTime {
        self.event_at(at)
            .map(|e| e.end() - at)
            .unwrap_or(SimTime::ZERO)
    }

    /// [start, end] 内的累计生效时长，边界处的部分重叠会被裁剪。
    pub fn active_time(&self, start: SimTime, end: SimTime) -> SimTime {
        self.events
            .iter()
            .take_while(|e| e.start() <= end)
            .fold(SimTime::ZERO, |acc, e| acc + e.overlap(start, end))
    }

    pub fn start(&self) -> SimTime {
        self.events.first().map(Event::start).unwrap_or(SimTime::ZERO)
    }

    pub fn end(&self) -> SimTime {
        self.events.last().map(Event::end).unwrap_or(SimTime::ZERO)
    }

    pub fn duration(&self) -> SimTime {
        self.end() - self.start()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
