//! Resolves the effective telemetry state from a profile tree.
//!
//! [`resolve`] is pure: it looks at a parsed profile, applies any explicit overrides,
//! fills missing values with defaults and hands back the tree that should be
//! persisted together with a flag saying whether persisting is needed at all.
//!
//! Rules:
//! * Each field is taken from the `telemetry` section when the section supplies it,
//!   otherwise from the legacy flat keys.
//! * Present values are never replaced by a read. A stored `enabled: false` stays false.
//! * A missing identifier gets a fresh one; a missing flag defaults to `true`.
//! * Legacy flat keys are dropped from the written tree; the values they held move
//!   into the `telemetry` section unchanged.
//! * Every other key, at the top level or inside the section, is carried over as-is.

use crate::libs::identity::IdentifierSource;
use crate::log_debug;
use crate::schemas::telemetry::{
    ENABLED_KEY, EffectiveState, InstanceState, LEGACY_ENABLED_KEYS, Overrides, ProfileLayout,
    TELEMETRY_SECTION_KEY, USER_ID_KEY,
};
use serde_yaml::{Mapping, Value};

/// Outcome of resolving one profile tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub state: EffectiveState,
    /// Layout the recognized values were read from.
    pub layout: ProfileLayout,
    /// `false` only when the input already expresses `state` in the modern layout.
    pub needs_write: bool,
    /// The input tree with the `telemetry` section brought up to date.
    pub tree: Mapping,
}

/// How a resolved field got its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrigin {
    Stored,
    Override,
    Default,
}

/// A recognized value exactly as the user stored it, plus how it reads.
struct Stored<T> {
    parsed: T,
    raw: Value,
}

/// What was found in the tree before overrides and defaults.
struct Located<'a> {
    identifier: Option<Stored<String>>,
    /// `parsed` is `None` when the flag is present but not a recognizable boolean.
    enabled: Option<Stored<Option<bool>>>,
    layout: ProfileLayout,
    /// Existing `telemetry` mapping whose other keys must survive.
    section: Option<&'a Mapping>,
    /// `telemetry` exists but holds something other than a mapping or null.
    section_malformed: bool,
    legacy_present: bool,
}

impl Located<'_> {
    fn instance_state(&self) -> InstanceState {
        InstanceState {
            identifier: self.identifier.as_ref().map(|id| id.parsed.clone()),
            enabled: self.enabled.as_ref().and_then(|flag| flag.parsed),
        }
    }
}

/// Computes the effective state of `tree` and the tree that should be persisted.
///
/// # Arguments
/// * `tree`: The parsed profile, or an empty mapping when no file exists.
/// * `overrides`: Explicit changes from the toggle and reset operations. They always
///   win over stored values and always force a write.
/// * `ids`: Source of fresh identifiers, asked only when an identifier is missing or
///   a new one was requested.
///
/// # Returns
/// A `Resolution` with the effective `(identifier, enabled)` pair, whether anything was
/// filled in, overridden or migrated (`needs_write`), and the updated tree. A stored
/// flag that is present but unreadable is kept as written and reads as disabled.
pub fn resolve<S>(tree: &Mapping, overrides: &Overrides, ids: &S) -> Resolution
where
    S: IdentifierSource + ?Sized,
{
    let located = locate(tree);
    let found = located.instance_state();
    log_debug!(
        "[Resolver] Found {:?} layout: user_id={:?} enabled={:?}",
        located.layout,
        found.identifier,
        found.enabled
    );

    let (identifier, id_origin) = if overrides.regenerate_identifier {
        (ids.generate(), FieldOrigin::Override)
    } else {
        match &located.identifier {
            Some(stored) => (stored.parsed.clone(), FieldOrigin::Stored),
            None => (ids.generate(), FieldOrigin::Default),
        }
    };

    let (enabled, enabled_origin) = match (overrides.enabled, &located.enabled) {
        (Some(enabled), _) => (enabled, FieldOrigin::Override),
        // Something the user wrote but we cannot read is treated as an opt-out.
        (None, Some(stored)) => (stored.parsed.unwrap_or(false), FieldOrigin::Stored),
        (None, None) => (true, FieldOrigin::Default),
    };

    let needs_write = id_origin != FieldOrigin::Stored
        || enabled_origin != FieldOrigin::Stored
        || located.legacy_present
        || located.section_malformed;

    let mut section = located.section.cloned().unwrap_or_default();
    let enabled_value = match (&located.enabled, enabled_origin) {
        (Some(stored), FieldOrigin::Stored) => stored.raw.clone(),
        _ => Value::Bool(enabled),
    };
    let id_value = match (&located.identifier, id_origin) {
        (Some(stored), FieldOrigin::Stored) => stored.raw.clone(),
        _ => Value::from(identifier.as_str()),
    };
    // Re-inserting an existing key keeps its position in the section.
    section.insert(ENABLED_KEY.into(), enabled_value);
    section.insert(USER_ID_KEY.into(), id_value);
    let updated = rebuild_tree(tree, section);

    log_debug!(
        "[Resolver] Resolved user_id={} enabled={} (identifier {:?}, flag {:?}, write needed: {})",
        identifier,
        enabled,
        id_origin,
        enabled_origin,
        needs_write
    );

    Resolution {
        state: EffectiveState {
            identifier,
            enabled,
        },
        layout: located.layout,
        needs_write,
        tree: updated,
    }
}

fn locate(tree: &Mapping) -> Located<'_> {
    let legacy_present = is_legacy_key_present(tree);

    let (section, section_malformed) = match tree.get(TELEMETRY_SECTION_KEY) {
        Some(Value::Mapping(section)) => (Some(section), false),
        Some(Value::Null) => (None, false),
        Some(_) => (None, true),
        None => (None, false),
    };
    let has_section = tree.contains_key(TELEMETRY_SECTION_KEY) && !section_malformed;

    // Per field: the section's value when it has one, else the legacy flat key.
    let identifier = section
        .and_then(|section| read_identifier(section.get(USER_ID_KEY)))
        .or_else(|| read_identifier(tree.get(USER_ID_KEY)));
    let enabled = section
        .and_then(|section| read_flag(section.get(ENABLED_KEY)))
        .or_else(|| {
            LEGACY_ENABLED_KEYS
                .iter()
                .find_map(|key| read_flag(tree.get(*key)))
        });

    let layout = if has_section {
        ProfileLayout::Modern
    } else if legacy_present {
        ProfileLayout::Legacy
    } else {
        ProfileLayout::Empty
    };

    Located {
        identifier,
        enabled,
        layout,
        section,
        section_malformed,
        legacy_present,
    }
}

fn is_legacy_key(key: &Value) -> bool {
    match key.as_str() {
        Some(key) => key == USER_ID_KEY || LEGACY_ENABLED_KEYS.contains(&key),
        None => false,
    }
}

fn is_legacy_key_present(tree: &Mapping) -> bool {
    tree.keys().any(is_legacy_key)
}

/// Identifiers are usually strings; numbers written by hand are accepted and
/// rendered as text. Blank strings count as missing.
fn read_identifier(value: Option<&Value>) -> Option<Stored<String>> {
    let raw = value?;
    let parsed = match raw {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(Stored {
        parsed,
        raw: raw.clone(),
    })
}

/// `None` only when the key is absent or null. Besides YAML booleans, the YAML 1.1
/// spellings older profiles use (`yes`/`no`, `on`/`off`, `y`/`n`, any case) and quoted
/// `'true'`/`'false'` are understood; anything else is kept with `parsed: None`.
fn read_flag(value: Option<&Value>) -> Option<Stored<Option<bool>>> {
    let raw = value?;
    let parsed = match raw {
        Value::Null => return None,
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "y" => Some(true),
            "false" | "no" | "off" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    };
    Some(Stored {
        parsed,
        raw: raw.clone(),
    })
}

/// Copies `tree` in order, swapping in the new section. The section takes the place of
/// the existing `telemetry` key, or of the first legacy key, or goes last.
fn rebuild_tree(tree: &Mapping, section: Mapping) -> Mapping {
    let mut section = Some(section);
    let mut updated = Mapping::new();

    for (key, value) in tree {
        let is_section = key.as_str() == Some(TELEMETRY_SECTION_KEY);
        if is_section || is_legacy_key(key) {
            if let Some(section) = section.take() {
                updated.insert(TELEMETRY_SECTION_KEY.into(), Value::Mapping(section));
            }
            continue;
        }
        updated.insert(key.clone(), value.clone());
    }

    if let Some(section) = section {
        updated.insert(TELEMETRY_SECTION_KEY.into(), Value::Mapping(section));
    }
    updated
}
