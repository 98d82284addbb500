use std::io::{self, Read};
use std::path::PathBuf;

use crate::error::Result;
use crate::form::RuleForm;
use crate::rule::{Platform, Rule};
use crate::search::{projection, SortMode};
use crate::store::RuleStore;
use crate::transfer::{
    self, ConflictChoice, ConflictDecision, ConflictResolver, PresetResolver,
};

#[allow(clippy::too_many_arguments)]
pub fn handle_add(
    file: PathBuf,
    title: String,
    description: Option<String>,
    platform: Option<Platform>,
    query: Option<String>,
    stdin: bool,
    tags: Option<String>,
    references: Option<String>,
    json: bool,
) -> Result<()> {
    let mut store = RuleStore::load(file)?;

    let mut form = RuleForm::new();
    form.title = title;
    form.description = description.unwrap_or_default();
    form.platform = platform;
    form.tags = tags.unwrap_or_default();
    form.references = references.unwrap_or_default();
    form.query = if stdin {
        read_stdin_query()?
    } else {
        query.unwrap_or_default()
    };

    let saved = form.save(&mut store, &current_user())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!("Saved detection rule {}", saved.id);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_edit(
    file: PathBuf,
    id: String,
    title: Option<String>,
    description: Option<String>,
    platform: Option<Platform>,
    query: Option<String>,
    stdin: bool,
    tags: Option<String>,
    references: Option<String>,
    json: bool,
) -> Result<()> {
    let mut store = RuleStore::load(file)?;

    let mut form = RuleForm::new();
    form.load(store.resolve(&id)?);

    if let Some(title) = title {
        form.title = title;
    }
    if let Some(description) = description {
        form.description = description;
    }
    if let Some(platform) = platform {
        form.platform = Some(platform);
    }
    if stdin {
        form.query = read_stdin_query()?;
    } else if let Some(query) = query {
        form.query = query;
    }
    if let Some(tags) = tags {
        form.tags = tags;
    }
    if let Some(references) = references {
        form.references = references;
    }

    let saved = form.save(&mut store, &current_user())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!("Saved detection rule {}", saved.id);
    }

    Ok(())
}

pub fn handle_get(file: PathBuf, id: String, json: bool) -> Result<()> {
    let store = RuleStore::load(file)?;
    let rule = store.resolve(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(rule)?);
    } else {
        println!("Rule {}", rule.id);
        println!("Title: {}", rule.title);
        if let Some(platform) = rule.platform {
            println!("Platform: {}", platform);
        }
        println!("Added: {} by {}", rule.date_added, rule.created_by);
        if !rule.description.is_empty() {
            println!("Description: {}", rule.description);
        }
        if !rule.tags.is_empty() {
            println!("Tags: {}", rule.tags);
        }
        if !rule.references.is_empty() {
            println!("References: {}", rule.references);
        }
        if !rule.query.is_empty() {
            println!("\n{}", rule.query);
        }
    }

    Ok(())
}

pub fn handle_list(file: PathBuf, sort: SortMode, json: bool) -> Result<()> {
    let store = RuleStore::load(file)?;
    let rules = projection(store.rules(), "", sort);

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
    } else if rules.is_empty() {
        println!("No rules found.");
    } else {
        println!("Rules:\n");
        print_rule_lines(&rules);
    }

    Ok(())
}

pub fn handle_search(file: PathBuf, term: String, sort: SortMode, json: bool) -> Result<()> {
    let store = RuleStore::load(file)?;
    let rules = projection(store.rules(), &term, sort);

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
    } else if rules.is_empty() {
        println!("No results found for '{}'.", term);
    } else {
        println!("Search results for '{}':\n", term);
        print_rule_lines(&rules);
    }

    Ok(())
}

pub fn handle_export(
    file: PathBuf,
    path: PathBuf,
    query: Option<String>,
    sort: SortMode,
) -> Result<()> {
    let store = RuleStore::load(file)?;
    let rules = projection(store.rules(), query.as_deref().unwrap_or(""), sort);

    let count = transfer::export(&rules, &path)?;
    if count == 0 {
        println!("There are no rules to export.");
    } else {
        println!("Exported {} rules to {}", count, path.display());
    }

    Ok(())
}

pub fn handle_import(
    file: PathBuf,
    path: PathBuf,
    overwrite_all: bool,
    skip_all: bool,
) -> Result<()> {
    let mut store = RuleStore::load(file)?;

    let mut preset_overwrite = PresetResolver(ConflictChoice::Overwrite);
    let mut preset_skip = PresetResolver(ConflictChoice::Skip);
    let mut interactive = InteractiveResolver;
    let resolver: &mut dyn ConflictResolver = if overwrite_all {
        &mut preset_overwrite
    } else if skip_all {
        &mut preset_skip
    } else {
        &mut interactive
    };

    let report = transfer::import(&mut store, &path, resolver)?;

    println!("{} rules imported.", report.imported);
    if report.skipped_conflicts > 0 {
        println!("{} conflicting rules kept unchanged.", report.skipped_conflicts);
    }
    if report.missing_id > 0 {
        println!("{} records skipped (no id field).", report.missing_id);
    }
    if report.invalid > 0 {
        println!("{} records skipped (malformed).", report.invalid);
    }

    Ok(())
}

pub fn handle_backup(file: PathBuf) -> Result<()> {
    let store = RuleStore::load(file)?;
    let path = transfer::backup(&store)?;
    println!("Rules backed up to {}", path.display());
    Ok(())
}

pub fn handle_restore(file: PathBuf, path: PathBuf, yes: bool) -> Result<()> {
    let mut store = RuleStore::load(file)?;

    let applied = transfer::restore(&mut store, &path, || {
        if yes {
            return true;
        }
        confirm("This will overwrite the current rule set. Continue? [y/N] ")
    })?;

    if applied {
        println!("Rules restored from {}", path.display());
    } else {
        println!("Cancelled.");
    }

    Ok(())
}

fn print_rule_lines(rules: &[Rule]) {
    for rule in rules {
        let platform = rule
            .platform
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}  [{}] {}", rule.id, platform, rule.title);
        if !rule.tags.is_empty() {
            println!("      tags: {}", rule.tags);
        }
    }
}

/// The operating user's identity: git author if configured, else $USER.
fn current_user() -> String {
    std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            } else {
                None
            }
        })
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn read_stdin_query() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

/// Yes/no prompt on stdin. Anything but an explicit "y" is a no, and a
/// non-interactive stdin is always a no.
fn confirm(prompt: &str) -> bool {
    if !atty::is(atty::Stream::Stdin) {
        eprintln!("Refusing to continue without confirmation (use --yes in non-interactive mode).");
        return false;
    }
    eprint!("{}", prompt);
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

/// Prompts per conflicting id on stdin. Closing the prompt without an
/// answer means "skip this one"; in a non-interactive run every conflict
/// is skipped and the preset flags are suggested instead.
struct InteractiveResolver;

impl ConflictResolver for InteractiveResolver {
    fn resolve(&mut self, id: &str) -> ConflictDecision {
        if !atty::is(atty::Stream::Stdin) {
            eprintln!(
                "Conflict on '{}' in non-interactive mode; skipping (use --overwrite-all or --skip-all).",
                id
            );
            return ConflictDecision {
                choice: ConflictChoice::Skip,
                apply_to_all: false,
            };
        }

        eprintln!("A rule with id '{}' already exists.", id);
        eprint!("Overwrite it? [y]es / [n]o / [Y]=yes to all / [N]=no to all: ");

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return ConflictDecision {
                choice: ConflictChoice::Skip,
                apply_to_all: false,
            };
        }

        match input.trim() {
            "y" | "yes" => ConflictDecision {
                choice: ConflictChoice::Overwrite,
                apply_to_all: false,
            },
            "Y" => ConflictDecision {
                choice: ConflictChoice::Overwrite,
                apply_to_all: true,
            },
            "N" => ConflictDecision {
                choice: ConflictChoice::Skip,
                apply_to_all: true,
            },
            _ => ConflictDecision {
                choice: ConflictChoice::Skip,
                apply_to_all: false,
            },
        }
    }
}
