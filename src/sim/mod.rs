//! 仿真核心模块
//!
//! 此模块包含排程所需的基础组件：仿真时间、区间事件、时间线以及输入配置。

// 子模块声明
mod config;
mod event;
mod time;
mod timeline;

// 重新导出公共接口
pub use config::{
    AssignmentSpec, CharacterSpec, OnUseSpec, RotationSpec, SimConfig, SpellModifierSpec,
};
pub use event::{Event, EventKind};
pub use time::{EPS, SimTime};
pub use timeline::Timeline;
