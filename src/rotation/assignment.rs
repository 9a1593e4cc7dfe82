//! 治疗任务（assignment）与优先级列表

use crate::character::{ModifierSet, target_buff};
use crate::error::{Result, RotationError};
use crate::sim::{AssignmentSpec, RotationSpec};
use crate::spell::{self, Spell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// 未指定目标时填充法术使用的目标名
pub const FILLER_TARGET: &str = "_filler";

/// 一条时间线的键：（法术标识，目标）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignmentKey {
    pub spell: String,
    pub target: String,
}

impl fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.spell, self.target)
    }
}

/// 在某个目标身上维持某个法术效果
#[derive(Debug, Clone)]
pub struct Assignment {
    spell: Arc<Spell>,
    target: String,
    allow_fade: bool,
    fade_at_stacks: u32,
    queue: bool,
}

impl Assignment {
    pub fn new(spell: Arc<Spell>, target: impl Into<String>) -> Self {
        Self {
            spell,
            target: target.into(),
            allow_fade: true,
            fade_at_stacks: 1,
            queue: false,
        }
    }

    pub fn with_fade(mut self, allow_fade: bool, fade_at_stacks: u32) -> Self {
        self.allow_fade = allow_fade;
        self.fade_at_stacks = fade_at_stacks;
        self
    }

    pub fn with_queue(mut self, queue: bool) -> Self {
        self.queue = queue;
        self
    }

    pub fn from_spec(spec: &AssignmentSpec) -> Result<Self> {
        let spell = spell::lookup(&spec.spell, spec.rank)?;
        let target = spec.target.clone().unwrap_or_else(|| spec.spell.clone());
        Ok(Self::new(spell, target)
            .with_fade(
                spec.allow_fade.unwrap_or(true),
                spec.fade_at_stacks.unwrap_or(1),
            )
            .with_queue(spec.queue.unwrap_or(false)))
    }

    /// 由填充任务派生的克隆：目标名追加数字后缀
    pub(crate) fn filler_clone(&self, suffix: &str) -> Self {
        Self {
            target: format!("{}{suffix}", self.target),
            ..self.clone()
        }
    }

    pub fn spell(&self) -> &Arc<Spell> {
        &self.spell
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn allow_fade(&self) -> bool {
        self.allow_fade
    }

    pub fn fade_at_stacks(&self) -> u32 {
        self.fade_at_stacks
    }

    pub fn queue(&self) -> bool {
        self.queue
    }

    pub fn key(&self) -> AssignmentKey {
        AssignmentKey {
            spell: self.spell.identifier(),
            target: self.target.clone(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.spell.identifier(), self.target)
    }
}

/// 按优先级排序的任务列表（下标 0 优先级最高），外加可选的填充任务。
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    pub name: String,
    pub description: Option<String>,
    entries: Vec<Assignment>,
    filler: Option<Assignment>,
    target_buffs: BTreeMap<String, ModifierSet>,
}

impl Assignments {
    pub fn new(entries: Vec<Assignment>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_filler(mut self, filler: Assignment) -> Self {
        self.filler = Some(filler);
        self
    }

    pub fn with_target_buffs(mut self, target: impl Into<String>, buffs: ModifierSet) -> Self {
        self.target_buffs.insert(target.into(), buffs);
        self
    }

    /// 填充任务只能“冷却好就施放”，不接受淡出策略字段；同一（法术，目标）
    /// 只能出现一次。
    pub fn from_spec(spec: &RotationSpec) -> Result<Self> {
        let entries = spec
            .assignments
            .iter()
            .map(Assignment::from_spec)
            .collect::<Result<Vec<_>>>()?;
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = entries.iter().find(|a| !seen.insert(a.key())) {
            return Err(RotationError::DuplicateAssignment {
                key: duplicate.key().to_string(),
            });
        }

        let filler = match &spec.filler {
            Some(f) if f.allow_fade.is_some() || f.fade_at_stacks.is_some() => {
                return Err(RotationError::FillerExpirePolicy);
            }
            Some(f) => {
                let spell = spell::lookup(&f.spell, f.rank)?;
                let target = f.target.clone().unwrap_or_else(|| FILLER_TARGET.to_string());
                Some(Assignment::new(spell, target).with_queue(f.queue.unwrap_or(false)))
            }
            None => None,
        };

        let mut target_buffs = BTreeMap::new();
        for (target, names) in &spec.buffs {
            let modifiers = names
                .iter()
                .map(|name| target_buff(name))
                .collect::<Result<Vec<_>>>()?;
            target_buffs.insert(target.clone(), ModifierSet::new(target.clone(), modifiers));
        }

        Ok(Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            entries,
            filler,
            target_buffs,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.entries.iter()
    }

    pub fn filler(&self) -> Option<&Assignment> {
        self.filler.as_ref()
    }

    pub fn has_filler(&self) -> bool {
        self.filler.is_some()
    }

    /// 仅作用于落在 `target` 身上的治疗的增益
    pub fn buffs(&self, target: &str) -> Option<&ModifierSet> {
        self.target_buffs.get(target)
    }

    pub fn queue_eligible(&self) -> impl Iterator<Item = &Assignment> {
        self.entries.iter().filter(|a| a.queue)
    }
}

impl<'a> IntoIterator for &'a Assignments {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
