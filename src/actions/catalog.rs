use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::dto::ActionEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPreset {
    pub name: String,
    pub label: String,
}

/// Read-only library of action presets, built once at startup.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    presets: Vec<ActionPreset>,
    labels: HashMap<String, String>,
}

const BUILTIN: &[(&str, &str)] = &[
    ("squat", "Squat"),
    ("bench_press", "Bench Press"),
    ("deadlift", "Deadlift"),
    ("overhead_press", "Overhead Press"),
    ("barbell_row", "Barbell Row"),
    ("pull_up", "Pull-up"),
    ("push_up", "Push-up"),
    ("dip", "Dip"),
    ("lunge", "Lunge"),
    ("sit_up", "Sit-up"),
    ("plank", "Plank"),
    ("running", "Running"),
    ("rope_skipping", "Rope Skipping"),
];

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ActionCatalog {
    pub fn builtin() -> Self {
        Self::from_presets(
            BUILTIN
                .iter()
                .map(|(name, label)| ActionPreset {
                    name: (*name).to_string(),
                    label: (*label).to_string(),
                })
                .collect(),
        )
    }

    /// The first preset wins when a name is listed twice.
    pub fn from_presets(presets: Vec<ActionPreset>) -> Self {
        let mut labels = HashMap::with_capacity(presets.len());
        for p in &presets {
            labels
                .entry(p.name.clone())
                .or_insert_with(|| p.label.clone());
        }
        Self { presets, labels }
    }

    /// Loads presets from a JSON array file, or the built-in list when no
    /// path is configured.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read action catalog {path}"))?;
        let presets: Vec<ActionPreset> = serde_json::from_str(&raw)
            .with_context(|| format!("parse action catalog {path}"))?;
        info!(path, count = presets.len(), "action catalog loaded");
        Ok(Self::from_presets(presets))
    }

    pub fn presets(&self) -> &[ActionPreset] {
        &self.presets
    }

    pub fn label_for(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Sets `label` on every entry whose name is in the catalog. Other entries
    /// are left untouched.
    pub fn decorate(&self, entries: &mut [ActionEntry]) {
        for entry in entries.iter_mut() {
            let label = entry.name.as_deref().and_then(|n| self.label_for(n));
            if let Some(label) = label {
                entry.label = Some(label.to_string());
            }
        }
    }
}
