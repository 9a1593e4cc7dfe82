use crate::character::{ModifierOp, Stat, Talent};
use crate::error::{Result, RotationError};
use crate::spell::SpellPart;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Top-level input of a sweep: every character is simulated against every rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fight length in seconds. A negative value means "cast until out of mana".
    pub fight_duration: f64,
    pub characters: Vec<CharacterSpec>,
    pub rotations: Vec<RotationSpec>,
    #[serde(default)]
    pub on_use: Vec<OnUseSpec>,
}

impl SimConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| RotationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Final stat values; the stat algebra producing them lives outside this crate.
    #[serde(default)]
    pub stats: BTreeMap<Stat, f64>,
    #[serde(default)]
    pub talents: BTreeMap<Talent, u32>,
    /// Gear and set bonuses altering a single spell.
    #[serde(default)]
    pub spell_modifiers: Vec<SpellModifierSpec>,
}

fn default_level() -> u32 {
    70
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellModifierSpec {
    pub spell: String,
    pub part: SpellPart,
    pub op: ModifierOp,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assignments: Vec<AssignmentSpec>,
    #[serde(default)]
    pub filler: Option<AssignmentSpec>,
    /// Target name -> bonus modifiers applied only to heals landing on that target.
    #[serde(default)]
    pub buffs: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSpec {
    pub spell: String,
    /// Defaults to the highest known rank.
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub allow_fade: Option<bool>,
    #[serde(default)]
    pub fade_at_stacks: Option<u32>,
    /// Allow refreshing slightly before expiry (spell queueing).
    #[serde(default)]
    pub queue: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnUseSpec {
    pub name: String,
    pub cooldown: f64,
    pub duration: f64,
    /// Number of casts the effect lasts for; unlimited when absent.
    #[serde(default)]
    pub charges: Option<u32>,
}
