//! 排程模块
//!
//! 任务列表、排程器主循环、统计汇总与物品增益窗口。

mod assignment;
mod on_use;
mod scheduler;
mod stats;

pub use assignment::{Assignment, AssignmentKey, Assignments, FILLER_TARGET};
pub use on_use::OnUseItem;
pub use scheduler::{
    Cast, Decision, FightDuration, REACTION, RegenTick, Rotation, UNBOUNDED_HORIZON,
};
pub use stats::{Contribution, GcdUsage, RotationStats, TimelineStats, event_heals, wasted_gcds};
