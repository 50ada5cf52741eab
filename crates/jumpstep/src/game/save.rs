use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::player::{Character, PowerTier};

/// Flat progression record handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub character: Character,
    pub level_index: usize,
    pub lives: u32,
    pub score: u32,
    pub coins: u32,
    pub completed: BTreeSet<usize>,
    /// Caller-supplied; the engine has no clock.
    pub timestamp: u64,
    #[serde(default)]
    pub tier: PowerTier,
    #[serde(default)]
    pub mounted: bool,
}

impl SaveSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
