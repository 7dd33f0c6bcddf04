use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{LedgerRecord, RecordKind};

/// One administered dose.
///
/// `key` is chosen by the caller and is unique across doses; many doses may
/// share the same owning subject `id`. `dose` and `scheme` are opaque
/// strings, no numeric or ordering checks are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dose {
    pub key: String,
    pub id: String,
    pub name: String,
    pub dose: String,
    pub scheme: String,
}

impl Dose {
    pub fn new(
        key: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        dose: impl Into<String>,
        scheme: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            id: id.into(),
            name: name.into(),
            dose: dose.into(),
            scheme: scheme.into(),
        }
    }

    /// Overwrite `name`, `dose` and `scheme` with the non-empty values given.
    ///
    /// An empty string means "leave unchanged", never "clear".
    pub fn apply_partial(&mut self, name: &str, dose: &str, scheme: &str) {
        if !name.is_empty() {
            self.name = name.to_string();
        }
        if !dose.is_empty() {
            self.dose = dose.to_string();
        }
        if !scheme.is_empty() {
            self.scheme = scheme.to_string();
        }
    }
}

impl LedgerRecord for Dose {
    const KIND: RecordKind = RecordKind::Dose;

    fn key(&self) -> &str {
        &self.key
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Conventional composite key for a dose: `"{id}-{dose}-{scheme}"`.
///
/// Dose creation takes its key verbatim from the caller; this helper only
/// renders the convention used by the seed set and the command-line client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoseKey<'a> {
    pub id: &'a str,
    pub dose: &'a str,
    pub scheme: &'a str,
}

impl<'a> DoseKey<'a> {
    pub fn new(id: &'a str, dose: &'a str, scheme: &'a str) -> Self {
        Self { id, dose, scheme }
    }

    pub fn compose(id: &str, dose: &str, scheme: &str) -> String {
        DoseKey::new(id, dose, scheme).to_string()
    }
}

impl fmt::Display for DoseKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.id, self.dose, self.scheme)
    }
}
