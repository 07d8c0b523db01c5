use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single entry from `svn log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Revision number the entry describes.
    pub revision: u64,
    /// Author of the revision, absent for anonymous commits.
    #[serde(default)]
    pub author: Option<String>,
    /// Commit message, absent when the revision was committed without one.
    #[serde(default)]
    pub message: Option<String>,
    /// Commit time truncated to whole seconds.
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
}

impl LogEntry {
    /// Construct an entry carrying only a revision number.
    #[must_use]
    pub const fn new(revision: u64) -> Self {
        Self {
            revision,
            author: None,
            message: None,
            date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn log_entry_round_trip() {
        let date = NaiveDate::from_ymd_opt(2022, 3, 14)
            .and_then(|day| day.and_hms_opt(15, 9, 26))
            .expect("valid timestamp");
        let entry = LogEntry {
            revision: 7,
            author: Some("rbender".into()),
            message: Some("Add noice directory".into()),
            date: Some(date),
        };

        let json = serde_json::to_string(&entry).expect("serialize entry");
        let decoded: LogEntry = serde_json::from_str(&json).expect("deserialize entry");
        assert_eq!(entry, decoded);
    }

    #[test]
    fn missing_optional_fields_default_to_none() {
        let entry: LogEntry = serde_json::from_str(r#"{ "revision": 3 }"#).expect("deserialize");
        assert_eq!(entry, LogEntry::new(3));
    }
}
