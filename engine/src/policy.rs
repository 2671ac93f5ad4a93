//! Policy engine for registry pull requests
//!
//! Validates a modification list against the submission rules and returns
//! the problems that must block approval. An empty problem list means the
//! PR is compliant.
//!
//! Rules, in evaluation order:
//! 1. only the registry document itself may be touched;
//! 2. only one plugin may be modified per PR (short-circuits the rest);
//! 3. the submitter must be listed in the plugin's `authors`;
//! 4. the proposed record must carry every required field.

use sdk::errors::BotError;
use sdk::types::{Modification, Problem, Registry};
use serde_json::Value;

use crate::locator::{self, PATH_SEPARATOR};

/// Message for a PR touching files other than the registry document
pub fn touched_non_registry_file(registry_path: &str) -> String {
    format!("Only the {registry_path} file may be modified")
}

/// Message for a PR touching more than one plugin
pub const MULTIPLE_PLUGINS_MODIFIED: &str = "Only one plugin may be modified at a time";

/// Message for a PR touching a plugin the submitter does not own
pub const UNOWNED_PLUGIN_MODIFIED: &str = "You may only modify plugins you own";

/// Fields every plugin record must carry
pub const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "authors",
    "description",
    "categories",
    "keywords",
    "urls",
    "release",
];

/// Read-only PR context the policy rules consult
#[derive(Debug, Clone)]
pub struct PrContext<'a> {
    /// Submitter's login, matched case-insensitively against `authors`
    pub author: &'a str,
    /// Paths of every file the PR changes
    pub changed_files: &'a [String],
    /// Repository-relative path of the registry document
    pub registry_path: &'a str,
}

/// Check a modification list against the submission rules.
///
/// `proposed_text` is the raw proposed document, used to attach source lines
/// to problems. The only failure mode is malformed proposed JSON; every
/// rule violation is a returned [`Problem`], not an error.
pub fn check(
    modifications: &[Modification],
    original: &Registry,
    proposed: &Registry,
    proposed_text: &str,
    context: &PrContext<'_>,
) -> Result<Vec<Problem>, BotError> {
    // A PR touching nothing tracked is trivially compliant.
    if modifications.is_empty() {
        return Ok(Vec::new());
    }

    let mut problems = Vec::new();

    // Rule 1: only the registry document may change.
    for file in context
        .changed_files
        .iter()
        .filter(|file| file.as_str() != context.registry_path)
    {
        problems.push(Problem::new(
            file.clone(),
            touched_non_registry_file(context.registry_path),
        ));
    }

    // Rule 2: at most one distinct plugin across all modifications.
    let mut touched: Vec<&str> = Vec::new();
    for modification in modifications {
        if !touched.contains(&modification.plugin()) {
            touched.push(modification.plugin());
        }
    }
    if touched.len() > 1 {
        for id in &touched {
            let span = locator::locate(proposed_text, id)?;
            problems.push(
                Problem::new(context.registry_path, MULTIPLE_PLUGINS_MODIFIED)
                    .with_line(span.start.line),
            );
        }
        return Ok(problems);
    }
    let Some(&plugin_id) = touched.first() else {
        return Ok(problems);
    };

    // Rule 3: ownership. A brand-new plugin has no original record, so the
    // proposed authors list is authoritative for creates.
    let effective = if modifications.iter().any(Modification::is_create) {
        proposed.plugin(plugin_id)
    } else {
        original.plugin(plugin_id)
    };
    let author_lower = context.author.to_lowercase();
    let owned = effective.as_ref().is_some_and(|plugin| {
        plugin
            .authors
            .iter()
            .any(|author| author.to_lowercase() == author_lower)
    });
    if !owned {
        let authors_path = format!("{plugin_id}{PATH_SEPARATOR}authors");
        let span = locator::locate(proposed_text, &authors_path)?;
        problems.push(
            Problem::new(context.registry_path, UNOWNED_PLUGIN_MODIFIED)
                .with_line(span.start.line),
        );
    }

    // Rule 4: required fields must be present as keys of the proposed raw
    // record. A deleted plugin has no proposed record to validate.
    if let Some(Value::Object(fields)) = proposed.raw(plugin_id) {
        let span = locator::locate(proposed_text, plugin_id)?;
        for field in REQUIRED_FIELDS {
            if !fields.contains_key(field) {
                problems.push(
                    Problem::new(
                        context.registry_path,
                        format!("The {field} field is required"),
                    )
                    .with_line(span.end.line),
                );
            }
        }
    }

    Ok(problems)
}
