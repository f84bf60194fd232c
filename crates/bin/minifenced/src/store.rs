//! Rule file — a JSON array of stored rules.
//!
//! The file is read once at startup and written back on shutdown so the
//! debounce state (`lastRun`) of every trigger survives a restart.

use std::path::Path;

use anyhow::Context;
use minifence_domain::rule::{Rule, decode_rules, encode_rules};
use minifence_domain::trigger::TriggerRegistry;
use serde_json::Value;

/// Rules decoded from the file.
#[derive(Debug, Default)]
pub struct LoadedRules {
    pub rules: Vec<Rule>,
    /// Entries that failed to decode and were skipped, whole rules and
    /// triggers nested inside kept rules alike.
    pub dropped: usize,
}

impl LoadedRules {
    /// Whether writing `rules` back would lose entries from the file.
    #[must_use]
    pub fn is_lossy(&self) -> bool {
        self.dropped > 0
    }
}

/// Read and decode the rule file. A missing file yields no rules.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array.
pub fn load(path: &Path, registry: &TriggerRegistry) -> anyhow::Result<LoadedRules> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "rule file not found, starting without rules");
            return Ok(LoadedRules::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let Value::Array(items) = value else {
        anyhow::bail!("{} must hold a JSON array of rules", path.display());
    };

    let rules = decode_rules(registry, &items);
    let dropped_rules = items.len() - rules.len();
    let dropped_triggers: usize = rules.iter().map(Rule::dropped_entries).sum();
    let dropped = dropped_rules + dropped_triggers;
    tracing::info!(
        path = %path.display(),
        loaded = rules.len(),
        dropped_rules,
        dropped_triggers,
        "rules loaded"
    );
    Ok(LoadedRules { rules, dropped })
}

/// Encode `rules` and replace the file content.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save(path: &Path, rules: &[Rule]) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(&encode_rules(rules))?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), saved = rules.len(), "rules saved");
    Ok(())
}
