//! 错误类型
//!
//! 配置解析与排程过程中可能出现的错误。

use crate::sim::SimTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotationError {
    #[error("unknown spell '{name}'")]
    UnknownSpell { name: String },

    #[error("unknown rank {rank} for spell '{name}' (max rank {max})")]
    UnknownRank { name: String, rank: u32, max: u32 },

    #[error("filler description does not allow fields 'allow_fade' and 'fade_at_stacks'")]
    FillerExpirePolicy,

    #[error("assignment '{key}' appears more than once")]
    DuplicateAssignment { key: String },

    #[error("unknown modifier '{name}'")]
    UnknownModifier { name: String },

    #[error("cannot store different spells in a timeline: expected '{expected}', got '{got}'")]
    MixedTimeline { expected: String, got: String },

    /// 进入 spell queue 分支却没有任何候选：扫描逻辑出现不变量破坏。
    #[error("spell queue triggered at {at:?} without any queue-eligible candidate")]
    EmptySpellQueue { at: SimTime },

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RotationError>;
