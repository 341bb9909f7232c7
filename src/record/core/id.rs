//! Record identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generated, globally unique record identifier.
///
/// Records are created with UUID v4 identifiers; anything that does not
/// parse as a UUID cannot name a stored record, which also keeps
/// identifiers safe to use as file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(uuid::Uuid);

impl RecordId {
    /// Generate a fresh identifier
    #[must_use]
    pub fn new() -> Self {
        RecordId(uuid::Uuid::new_v4())
    }

    /// Parse an identifier supplied by a caller.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s.trim()).ok().map(RecordId)
    }

    /// Name of the document file holding this record
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for RecordId {
    fn from(uuid: uuid::Uuid) -> Self {
        RecordId(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn test_parse_accepts_uuid_with_whitespace() {
        let id = RecordId::new();
        let parsed = RecordId::parse(&format!("  {id} ")).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_paths_and_garbage() {
        assert!(RecordId::parse("../../etc/passwd").is_none());
        assert!(RecordId::parse("").is_none());
        assert!(RecordId::parse("partner-1").is_none());
    }

    #[test]
    fn test_file_name() {
        let id = RecordId::new();
        assert_eq!(id.file_name(), format!("{id}.json"));
    }
}
