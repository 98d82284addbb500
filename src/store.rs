//! Flat-file record store: an ordered list of rules backed by one JSON array.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GhostTraceError, Result};
use crate::rule::Rule;

pub const DEFAULT_STORE_FILE: &str = "detection_rules.json";

/// Owns every rule record. Components that mutate rules go through this type
/// and persist after each mutation; nothing else writes the backing file.
pub struct RuleStore {
    rules: Vec<Rule>,
    path: PathBuf,
}

impl RuleStore {
    /// Load the store from `path`. A missing file yields an empty store;
    /// malformed JSON is propagated to the caller.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rules = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        debug!(path = %path.display(), count = rules.len(), "loaded rule store");
        Ok(Self { rules, path })
    }

    /// Serialize the full rule list to the backing file, overwriting it.
    /// Writes to a temp file and renames so a failed write never leaves a
    /// truncated store behind.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.rules)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        f.sync_all()?;
        drop(f);
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = self.rules.len(), "saved rule store");
        Ok(())
    }

    /// Replace the rule with the same id in place, preserving its position
    /// in the sequence; append if the id is new.
    pub fn upsert(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// Swap in a whole new rule list (restore path).
    pub fn replace_all(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Resolve an exact id or a unique id prefix to a rule.
    pub fn resolve(&self, id: &str) -> Result<&Rule> {
        if let Some(rule) = self.get(id) {
            return Ok(rule);
        }
        let mut matches = self.rules.iter().filter(|r| r.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(rule), None) => Ok(rule),
            (Some(_), Some(_)) => Err(GhostTraceError::AmbiguousId(id.to_string())),
            (None, _) => Err(GhostTraceError::RuleNotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample(id: &str, title: &str) -> Rule {
        Rule {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            platform: None,
            query: String::new(),
            tags: String::new(),
            references: String::new(),
            created_by: "tester".to_string(),
            date_added: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = RuleStore::load(tmp.path().join("rules.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_malformed_json_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rules.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(RuleStore::load(&path).is_err());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rules.json");

        let mut store = RuleStore::load(&path).unwrap();
        let mut rule = sample("multi-line-20250615134509", "Multi Line");
        rule.query = "index=main\n| stats count by host\n| where count > 5".to_string();
        store.upsert(rule);
        store.save().unwrap();

        let reloaded = RuleStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.rules()[0].query.contains("\n| stats"));
    }

    #[test]
    fn test_upsert_idempotent_and_position_preserving() {
        let tmp = TempDir::new().unwrap();
        let mut store = RuleStore::load(tmp.path().join("rules.json")).unwrap();

        store.upsert(sample("a-1", "First"));
        store.upsert(sample("b-2", "Second"));
        store.upsert(sample("c-3", "Third"));

        let mut replacement = sample("b-2", "Second (edited)");
        replacement.tags = "edited".to_string();
        store.upsert(replacement.clone());
        store.upsert(replacement);

        assert_eq!(store.len(), 3);
        assert_eq!(store.rules()[1].id, "b-2");
        assert_eq!(store.rules()[1].title, "Second (edited)");
        assert_eq!(store.rules()[1].tags, "edited");
    }

    #[test]
    fn test_resolve_prefix() {
        let tmp = TempDir::new().unwrap();
        let mut store = RuleStore::load(tmp.path().join("rules.json")).unwrap();
        store.upsert(sample("powershell-download-20250615134509", "A"));
        store.upsert(sample("powershell-encoded-20250615134510", "B"));
        store.upsert(sample("dns-tunnel-20250615134511", "C"));

        assert_eq!(store.resolve("dns").unwrap().title, "C");
        assert!(matches!(
            store.resolve("powershell"),
            Err(GhostTraceError::AmbiguousId(_))
        ));
        assert!(matches!(
            store.resolve("zeek"),
            Err(GhostTraceError::RuleNotFound(_))
        ));
    }
}
