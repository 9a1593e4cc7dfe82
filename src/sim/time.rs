//! 仿真时间类型
//!
//! 定义仿真时间（秒）及其运算。时间与时长共用同一类型。

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// 比较浮点时间时使用的容差，同时也是施法相对决策点的偏移量。
pub const EPS: f64 = 1e-6;

/// 仿真时间（秒）。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);
    /// 前瞻上限（“无约束”哨兵值）
    pub const FOREVER: SimTime = SimTime(9999.0);

    pub fn from_secs(s: f64) -> SimTime {
        SimTime(s)
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms as f64 / 1_000.0)
    }
    pub fn secs(self) -> f64 {
        self.0
    }
    pub fn min(self, other: SimTime) -> SimTime {
        SimTime(self.0.min(other.0))
    }
    pub fn max(self, other: SimTime) -> SimTime {
        SimTime(self.0.max(other.0))
    }
}

impl Add for SimTime {
    type Output = SimTime;
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        self.0 += rhs.0;
    }
}

impl Sub for SimTime {
    type Output = SimTime;
    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 - rhs.0)
    }
}
