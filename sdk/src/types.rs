//! Registry, modification, and problem types
//!
//! The registry document is a JSON object mapping plugin id to plugin record.
//! Key order is meaningful to the diff contract (iteration order equals the
//! document's insertion order), so [`Registry`] wraps `serde_json::Map`,
//! which preserves insertion order, and layers typed [`Plugin`] access on
//! top of the raw values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::BotError;

/// The registry document: an ordered mapping from plugin id to plugin record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: Map<String, Value>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from raw JSON text.
    ///
    /// Malformed JSON is fatal; a well-formed document that is not an object
    /// is a configuration-grade failure.
    pub fn parse(text: &str) -> Result<Self, BotError> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            _ => Err(BotError::Config(
                "registry document must be a JSON object".to_string(),
            )),
        }
    }

    /// Number of plugins in the registry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no plugins
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plugin ids in document order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether a plugin id is present
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// The raw JSON value for a plugin id, if present
    pub fn raw(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)
    }

    /// The typed record for a plugin id.
    ///
    /// Lenient: structurally incomplete records deserialize with defaults so
    /// that missing fields surface as policy problems, not parse failures.
    /// Returns `None` when the id is absent or the value is not a record.
    pub fn plugin(&self, id: &str) -> Option<Plugin> {
        let value = self.entries.get(id)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Insert (or replace) a plugin record
    pub fn insert(&mut self, id: impl Into<String>, plugin: &Plugin) -> Result<(), BotError> {
        let value = serde_json::to_value(plugin)?;
        self.entries.insert(id.into(), value);
        Ok(())
    }

    /// Render the registry back to pretty-printed JSON text
    pub fn to_text(&self) -> Result<String, BotError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

/// One distributable extension: authorship, metadata, and release artifacts.
///
/// Every field defaults so that a record missing required fields still
/// deserializes; the policy engine reports the gaps. Unknown fields are kept
/// in `extra` so whole-record equality sees them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    #[serde(default)]
    pub name: String,

    /// GitHub usernames; compared case-insensitively for ownership
    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub is_deprecated: bool,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub urls: Urls,

    #[serde(default)]
    pub release: ReleaseChannels,

    /// Fields outside the schema, preserved for change detection
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Optional documentation links for a plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Urls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
}

/// Release channels: a required stable release, an optional prerelease
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseChannels {
    #[serde(default)]
    pub stable: Release,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<Release>,
}

/// One release artifact reference.
///
/// The signature is an opaque string; verifying it is not this system's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub signature: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub url: String,
}

/// One detected semantic difference between two registry snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Modification {
    /// A plugin id present only in the updated snapshot
    Create { plugin: String },

    /// A plugin id present only in the original snapshot
    Delete { plugin: String },

    /// One tracked field of a common plugin whose value changed.
    ///
    /// `before`/`after` are `None` when the corresponding side is absent
    /// (optional prerelease fields, missing URLs).
    Modify {
        plugin: String,
        field: String,
        before: Option<String>,
        after: Option<String>,
    },
}

impl Modification {
    /// The plugin id this modification touches
    pub fn plugin(&self) -> &str {
        match self {
            Self::Create { plugin } | Self::Delete { plugin } | Self::Modify { plugin, .. } => {
                plugin
            }
        }
    }

    /// Whether this is a `create` modification
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create { .. })
    }
}

/// One policy violation, surfaced as an inline review comment.
///
/// Serializes in the shape the review-comment API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// File path the violation is attributed to
    pub path: String,

    /// Human-readable message
    pub body: String,

    /// 1-based source line for inline annotation, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl Problem {
    /// Create a problem without a line annotation
    pub fn new(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            line: None,
        }
    }

    /// Attach a 1-based source line
    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }
}

/// The review platform's classification of a PR submitter's relationship to
/// the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorAssociation {
    Collaborator,
    Contributor,
    FirstTimeContributor,
    FirstTimer,
    Mannequin,
    Member,
    None,
    Owner,
}

impl AuthorAssociation {
    /// Whether the submitter has never had a contribution merged here
    pub fn is_first_time(self) -> bool {
        matches!(self, Self::FirstTimer | Self::FirstTimeContributor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_document_order() {
        let registry = Registry::parse(r#"{"zeta":{},"alpha":{},"mid":{}}"#)
            .expect("valid document");
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_non_object_document() {
        assert!(Registry::parse("[1, 2, 3]").is_err());
        assert!(Registry::parse("not json at all").is_err());
    }

    #[test]
    fn incomplete_record_deserializes_with_defaults() {
        let registry = Registry::parse(r#"{"a": {"name": "A Plugin"}}"#)
            .expect("valid document");
        let plugin = registry.plugin("a").expect("record present");
        assert_eq!(plugin.name, "A Plugin");
        assert!(plugin.authors.is_empty());
        assert!(!plugin.is_deprecated);
        assert!(plugin.release.prerelease.is_none());
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let registry = Registry::parse(r#"{"a": {"name": "A", "customField": 42}}"#)
            .expect("valid document");
        let plugin = registry.plugin("a").expect("record present");
        assert_eq!(plugin.extra.get("customField"), Some(&Value::from(42)));
    }

    #[test]
    fn is_deprecated_uses_camel_case_on_the_wire() {
        let registry = Registry::parse(r#"{"a": {"isDeprecated": true}}"#)
            .expect("valid document");
        let plugin = registry.plugin("a").expect("record present");
        assert!(plugin.is_deprecated);
    }

    #[test]
    fn problem_serializes_without_null_line() {
        let problem = Problem::new("registry.json", "message");
        let json = serde_json::to_string(&problem).expect("serializable");
        assert!(!json.contains("line"));

        let located = problem.with_line(7);
        let json = serde_json::to_string(&located).expect("serializable");
        assert!(json.contains("\"line\":7"));
    }

    #[test]
    fn author_association_parses_platform_strings() {
        let assoc: AuthorAssociation =
            serde_json::from_str("\"FIRST_TIME_CONTRIBUTOR\"").expect("known value");
        assert!(assoc.is_first_time());

        let assoc: AuthorAssociation = serde_json::from_str("\"OWNER\"").expect("known value");
        assert!(!assoc.is_first_time());
    }
}
