//! Diff engine for registry snapshots
//!
//! Computes the ordered modification list between two registry snapshots:
//! one `delete`/`create` entry per plugin whose existence changed, and one
//! `modify` entry per tracked field that differs for plugins present in
//! both. Pure, deterministic, and total over well-formed registries.

use sdk::types::{Modification, Plugin, Registry};

/// Delimiter used when comparing and reporting sequence-valued fields.
///
/// `["a","b"]` and `["a,b"]` are indistinguishable under this scheme; that
/// is a known and accepted property of the comparison, inherited from the
/// registry's history.
const SEQUENCE_DELIMITER: &str = ",";

/// One comparable field of a plugin record.
///
/// Tracked fields are data, not branching logic: adding a field to the diff
/// means adding a row here.
struct TrackedField {
    /// Dotted path reported in `modify` entries
    path: &'static str,
    /// Projects the comparable value; `None` means the field is absent
    get: fn(&Plugin) -> Option<String>,
}

const TRACKED_FIELDS: &[TrackedField] = &[
    TrackedField {
        path: "name",
        get: |p| Some(p.name.clone()),
    },
    TrackedField {
        path: "authors",
        get: |p| Some(p.authors.join(SEQUENCE_DELIMITER)),
    },
    TrackedField {
        path: "description",
        get: |p| Some(p.description.clone()),
    },
    TrackedField {
        path: "isDeprecated",
        get: |p| Some(p.is_deprecated.to_string()),
    },
    TrackedField {
        path: "categories",
        get: |p| Some(p.categories.join(SEQUENCE_DELIMITER)),
    },
    TrackedField {
        path: "keywords",
        get: |p| Some(p.keywords.join(SEQUENCE_DELIMITER)),
    },
    TrackedField {
        path: "urls.repository",
        get: |p| p.urls.repository.clone(),
    },
    TrackedField {
        path: "urls.readme",
        get: |p| p.urls.readme.clone(),
    },
    TrackedField {
        path: "release.stable.signature",
        get: |p| Some(p.release.stable.signature.clone()),
    },
    TrackedField {
        path: "release.stable.version",
        get: |p| Some(p.release.stable.version.clone()),
    },
    TrackedField {
        path: "release.stable.url",
        get: |p| Some(p.release.stable.url.clone()),
    },
    TrackedField {
        path: "release.prerelease.signature",
        get: |p| p.release.prerelease.as_ref().map(|r| r.signature.clone()),
    },
    TrackedField {
        path: "release.prerelease.version",
        get: |p| p.release.prerelease.as_ref().map(|r| r.version.clone()),
    },
    TrackedField {
        path: "release.prerelease.url",
        get: |p| p.release.prerelease.as_ref().map(|r| r.url.clone()),
    },
];

/// Compute the modifications that turn `original` into `updated`.
///
/// Order: deletions in `original` key order, creations in `updated` key
/// order, then field-level modifications in `updated` key order.
pub fn diff(original: &Registry, updated: &Registry) -> Vec<Modification> {
    let mut modifications = Vec::new();

    for id in original.ids().filter(|id| !updated.contains(id)) {
        modifications.push(Modification::Delete {
            plugin: id.to_string(),
        });
    }

    for id in updated.ids().filter(|id| !original.contains(id)) {
        modifications.push(Modification::Create {
            plugin: id.to_string(),
        });
    }

    for id in updated.ids().filter(|id| original.contains(id)) {
        // Whole-record equality on the raw values; unknown fields count
        // toward "changed" even though only tracked fields are reported.
        if original.raw(id) == updated.raw(id) {
            continue;
        }

        let before = original.plugin(id).unwrap_or_default();
        let after = updated.plugin(id).unwrap_or_default();

        for field in TRACKED_FIELDS {
            let before_value = (field.get)(&before);
            let after_value = (field.get)(&after);
            if before_value != after_value {
                modifications.push(Modification::Modify {
                    plugin: id.to_string(),
                    field: field.path.to_string(),
                    before: before_value,
                    after: after_value,
                });
            }
        }
    }

    modifications
}
