//! 主动使用物品的增益窗口
//!
//! 固定冷却的物品在整个战斗时长内每个冷却周期触发一次。有次数限制的物品
//! 按施法时间线逐次消耗，次数用尽时窗口提前结束。

use super::scheduler::Rotation;
use crate::sim::{OnUseSpec, SimTime, Timeline};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct OnUseItem {
    pub name: String,
    pub cooldown: SimTime,
    pub duration: SimTime,
    /// 可作用的施法次数；None 表示持续时间内不限次数
    pub charges: Option<u32>,
}

impl OnUseItem {
    pub fn new(name: impl Into<String>, cooldown: f64, duration: f64, charges: Option<u32>) -> Self {
        Self {
            name: name.into(),
            cooldown: SimTime(cooldown),
            duration: SimTime(duration),
            charges,
        }
    }

    pub fn from_spec(spec: &OnUseSpec) -> Self {
        Self::new(spec.name.clone(), spec.cooldown, spec.duration, spec.charges)
    }
}

impl Rotation {
    /// 在 [0, horizon) 内生成物品的增益窗口。
    pub fn on_use_timeline(&self, item: &Arc<OnUseItem>, horizon: SimTime) -> Timeline {
        let mut timeline = Timeline::new(item.name.clone());
        let mut trigger = SimTime::ZERO;
        while trigger < horizon {
            let nominal_end = (trigger + item.duration).min(horizon);
            let end = match item.charges {
                None => nominal_end,
                // 没有可消耗的次数：窗口在触发时即结束
                Some(0) => trigger,
                Some(charges) => {
                    let consumed: Vec<SimTime> = self
                        .cast_timeline()
                        .iter()
                        .map(|e| e.start())
                        .skip_while(|&at| at < trigger)
                        .take_while(|&at| at <= trigger + item.duration)
                        .take(charges as usize)
                        .collect();
                    match consumed.last() {
                        Some(&last) if consumed.len() == charges as usize => last.min(nominal_end),
                        _ => nominal_end,
                    }
                }
            };
            debug!(item = %item.name, start = trigger.secs(), end = end.secs(), "增益窗口");
            timeline.push_on_use(trigger, end - trigger, item);

            if item.cooldown.secs() <= 0.0 {
                break;
            }
            trigger += item.cooldown;
        }
        timeline
    }
}
