//! Bulk movement of rules: JSON import with per-conflict decisions,
//! text export, and timestamped backup/restore.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, warn};

use crate::error::{GhostTraceError, Result};
use crate::rule::Rule;
use crate::store::RuleStore;

pub const BACKUP_DIR: &str = "backups";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    Overwrite,
    Skip,
}

/// One answer to "a rule with this id already exists". When `apply_to_all`
/// is set the same choice covers every remaining conflict in the batch and
/// the resolver is not consulted again.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDecision {
    pub choice: ConflictChoice,
    pub apply_to_all: bool,
}

/// Synchronous decision seam for import conflicts. The import loop blocks on
/// this exactly once per conflict until an apply-to-all decision arrives.
pub trait ConflictResolver {
    fn resolve(&mut self, id: &str) -> ConflictDecision;
}

/// Resolver with one fixed answer for the whole batch (`--overwrite-all`
/// and `--skip-all`).
pub struct PresetResolver(pub ConflictChoice);

impl ConflictResolver for PresetResolver {
    fn resolve(&mut self, _id: &str) -> ConflictDecision {
        ConflictDecision {
            choice: self.0,
            apply_to_all: true,
        }
    }
}

/// Counts produced by one import batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Records added or overwritten.
    pub imported: usize,
    /// Conflicting records the user chose to keep unchanged.
    pub skipped_conflicts: usize,
    /// Records dropped because they carry no usable `id` field.
    pub missing_id: usize,
    /// Records with an id that failed to deserialize as a rule.
    pub invalid: usize,
}

/// Import a JSON array of rules from `path`. New ids append; conflicting ids
/// go through `resolver`. The file must be a JSON array or the whole import
/// is rejected before any mutation. The store is persisted once at the end.
pub fn import(
    store: &mut RuleStore,
    path: &Path,
    resolver: &mut dyn ConflictResolver,
) -> Result<ImportReport> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(GhostTraceError::InvalidFormat(
                "Imported file must be a JSON array of rules.".to_string(),
            ))
        }
    };

    let mut report = ImportReport::default();
    let mut standing: Option<ConflictChoice> = None;

    for item in items {
        let has_id = item
            .get("id")
            .and_then(|v| v.as_str())
            .is_some_and(|s| !s.is_empty());
        if !has_id {
            report.missing_id += 1;
            continue;
        }

        let rule: Rule = match serde_json::from_value(item) {
            Ok(rule) => rule,
            Err(e) => {
                warn!(error = %e, "skipping malformed rule in import batch");
                report.invalid += 1;
                continue;
            }
        };

        if store.get(&rule.id).is_none() {
            store.upsert(rule);
            report.imported += 1;
            continue;
        }

        let choice = match standing {
            Some(choice) => choice,
            None => {
                let decision = resolver.resolve(&rule.id);
                if decision.apply_to_all {
                    standing = Some(decision.choice);
                }
                decision.choice
            }
        };

        match choice {
            ConflictChoice::Overwrite => {
                store.upsert(rule);
                report.imported += 1;
            }
            ConflictChoice::Skip => report.skipped_conflicts += 1,
        }
    }

    store.save()?;
    debug!(?report, "import complete");
    Ok(report)
}

/// Export rules as pretty-printed JSON objects separated by blank lines.
/// Returns the number written; an empty list writes nothing and the caller
/// reports the notice.
pub fn export(rules: &[Rule], path: &Path) -> Result<usize> {
    if rules.is_empty() {
        return Ok(0);
    }
    let blocks: Vec<String> = rules
        .iter()
        .map(serde_json::to_string_pretty)
        .collect::<std::result::Result<_, _>>()?;
    fs::write(path, blocks.join("\n\n"))?;
    Ok(rules.len())
}

/// Write a full timestamped copy of the store into a `backups/` directory
/// beside the backing file, creating the directory on first use.
pub fn backup(store: &RuleStore) -> Result<PathBuf> {
    let dir = store
        .path()
        .parent()
        .map(|p| p.join(BACKUP_DIR))
        .unwrap_or_else(|| PathBuf::from(BACKUP_DIR));
    fs::create_dir_all(&dir)?;

    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("detection_rules_backup_{}.json", stamp));
    let json = serde_json::to_string_pretty(store.rules())?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Replace the entire store with the contents of a backup file. The file
/// must hold a JSON array, and `confirm` must return true, before anything
/// is mutated. Returns false when the user declines.
pub fn restore(
    store: &mut RuleStore,
    path: &Path,
    confirm: impl FnOnce() -> bool,
) -> Result<bool> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if !value.is_array() {
        return Err(GhostTraceError::InvalidFormat(
            "Backup file must contain a JSON array of rules.".to_string(),
        ));
    }
    let rules: Vec<Rule> = serde_json::from_value(value)?;

    if !confirm() {
        return Ok(false);
    }

    store.replace_all(rules);
    store.save()?;
    Ok(true)
}
