use serde::{Deserialize, Serialize};

use crate::record::{LedgerRecord, RecordKind};

/// A vaccinated person.
///
/// Subjects are keyed by their own identifier: `key == id` for every record
/// built through [`Subject::new`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subject {
    pub key: String,
    pub id: String,
    pub name: String,
    /// Vaccination scheme status; absent unless explicitly set.
    #[serde(
        rename = "vaccineSchemeCompleted",
        alias = "vaccineSchemaCompleted",
        skip_serializing_if = "Option::is_none"
    )]
    pub vaccine_scheme_completed: Option<String>,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            key: id.clone(),
            id,
            name: name.into(),
            vaccine_scheme_completed: None,
        }
    }

    pub fn with_scheme_completed(mut self, status: impl Into<String>) -> Self {
        self.vaccine_scheme_completed = Some(status.into());
        self
    }
}

impl LedgerRecord for Subject {
    const KIND: RecordKind = RecordKind::Subject;

    fn key(&self) -> &str {
        &self.key
    }

    fn id(&self) -> &str {
        &self.id
    }
}
