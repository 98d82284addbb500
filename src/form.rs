//! The form controller: a fixed set of typed fields bound to one rule,
//! with an explicit Creating/Editing state machine.

use chrono::Local;

use crate::error::{GhostTraceError, Result};
use crate::rule::{generate_id, Platform, Rule};
use crate::store::RuleStore;

/// Which record the form is bound to. `Editing` tracks the target by id so
/// repeated saves keep updating the same record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Creating,
    Editing(String),
}

#[derive(Debug, Clone, Default)]
pub struct RuleForm {
    state: FormState,
    pub title: String,
    pub description: String,
    pub platform: Option<Platform>,
    pub query: String,
    pub tags: String,
    pub references: String,
}

impl RuleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Copy a rule's fields into the form and transition to Editing. Any
    /// escaped-newline sequence in the stored query is decoded back to a
    /// literal newline for display.
    pub fn load(&mut self, rule: &Rule) {
        self.state = FormState::Editing(rule.id.clone());
        self.title = rule.title.clone();
        self.description = rule.description.clone();
        self.platform = rule.platform;
        self.query = rule.query.replace("\\n", "\n");
        self.tags = rule.tags.clone();
        self.references = rule.references.clone();
    }

    /// Blank all fields and transition to Creating.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Validate and persist the form as a rule. In Creating state a fresh id
    /// is generated from the title; in Editing state the existing id is kept.
    /// On success the form transitions to Editing with the saved rule as its
    /// target, and the saved rule is returned for display.
    pub fn save(&mut self, store: &mut RuleStore, created_by: &str) -> Result<Rule> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(GhostTraceError::MissingTitle);
        }

        let id = match &self.state {
            FormState::Editing(id) => id.clone(),
            FormState::Creating => generate_id(&title),
        };

        let rule = Rule {
            id: id.clone(),
            title,
            description: self.description.trim().to_string(),
            platform: self.platform,
            query: self.query.trim_end().to_string(),
            tags: self.tags.trim().to_string(),
            references: self.references.trim().to_string(),
            created_by: created_by.to_string(),
            date_added: Local::now().date_naive(),
        };

        store.upsert(rule.clone());
        store.save()?;
        self.state = FormState::Editing(id);

        Ok(rule)
    }
}
