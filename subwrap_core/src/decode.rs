//! Decoding of svn's `--xml` output into api models.

use std::fmt::Display;

use chrono::NaiveDateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;
use subwrap_api::{ChangeKind, DiffResult, ItemPath, LogEntry, NodeKind};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy)]
enum LogField {
    Author,
    Date,
    Msg,
}

#[derive(Debug, Default)]
struct RawLogEntry {
    revision: u64,
    author: Option<String>,
    date: Option<String>,
    msg: Option<String>,
}

impl RawLogEntry {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let attribute = start
            .try_get_attribute("revision")
            .map_err(log_error)?
            .ok_or_else(|| log_error("logentry without a revision attribute"))?;
        let value = attribute.unescape_value().map_err(log_error)?;
        let revision = value
            .trim()
            .parse::<u64>()
            .map_err(|err| log_error(format!("invalid revision '{value}': {err}")))?;
        Ok(Self {
            revision,
            ..Self::default()
        })
    }

    fn push_text(&mut self, field: LogField, text: &str) {
        let slot = match field {
            LogField::Author => &mut self.author,
            LogField::Date => &mut self.date,
            LogField::Msg => &mut self.msg,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn finish(self) -> Result<LogEntry> {
        Ok(LogEntry {
            revision: self.revision,
            author: non_empty(self.author),
            message: non_empty(self.msg),
            date: non_empty(self.date).as_deref().map(parse_date).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DiffDocument {
    #[serde(default)]
    paths: PathList,
}

#[derive(Debug, Default, Deserialize)]
struct PathList {
    #[serde(rename = "path", default)]
    entries: Vec<RawPath>,
}

#[derive(Debug, Deserialize)]
struct RawPath {
    #[serde(rename = "@item", default = "no_change")]
    item: String,
    #[serde(rename = "@props", default = "no_change")]
    props: String,
    #[serde(rename = "@kind", default)]
    kind: String,
    #[serde(rename = "$text", default)]
    path: String,
}

fn no_change() -> String {
    ChangeKind::None.as_str().to_owned()
}

/// Decode `svn log --xml` output.
///
/// Text inside `<author>`, `<date>` and `<msg>` is kept exactly as svn
/// printed it, so multi-line and indented commit messages survive.
///
/// # Errors
///
/// Returns [`Error::OutputParse`] when the document is malformed or
/// truncated, an entry lacks a numeric revision, or a date cannot be parsed.
pub fn decode_log(xml: &str) -> Result<Vec<LogEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<RawLogEntry> = None;
    let mut field: Option<LogField> = None;
    let mut depth = 0_usize;

    loop {
        match reader.read_event().map_err(log_error)? {
            Event::Start(start) => {
                depth += 1;
                match start.name().as_ref() {
                    b"logentry" => current = Some(RawLogEntry::open(&start)?),
                    b"author" => field = Some(LogField::Author),
                    b"date" => field = Some(LogField::Date),
                    b"msg" => field = Some(LogField::Msg),
                    _ => {}
                }
            }
            Event::Empty(start) if start.name().as_ref() == b"logentry" => {
                entries.push(RawLogEntry::open(&start)?.finish()?);
            }
            Event::Text(text) => {
                if let (Some(field), Some(entry)) = (field, current.as_mut()) {
                    entry.push_text(field, &text.unescape().map_err(log_error)?);
                }
            }
            Event::CData(data) => {
                if let (Some(field), Some(entry)) = (field, current.as_mut()) {
                    entry.push_text(field, &String::from_utf8_lossy(&data));
                }
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                match end.name().as_ref() {
                    b"logentry" => {
                        if let Some(entry) = current.take() {
                            entries.push(entry.finish()?);
                        }
                    }
                    b"author" | b"date" | b"msg" => field = None,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(log_error("unexpected end of document"));
    }
    Ok(entries)
}

/// Decode `svn diff --xml --summarize` output.
///
/// # Errors
///
/// Returns [`Error::OutputParse`] when the document is malformed.
pub fn decode_diff(xml: &str) -> Result<DiffResult> {
    let document: DiffDocument = quick_xml::de::from_str(xml).map_err(|err| Error::OutputParse {
        operation: "diff",
        message: err.to_string(),
    })?;

    let paths = document
        .paths
        .entries
        .into_iter()
        .map(|raw| ItemPath {
            item: ChangeKind::from(raw.item),
            props: ChangeKind::from(raw.props),
            kind: NodeKind::from(raw.kind.as_str()),
            path: raw.path.trim().to_owned(),
        })
        .collect();

    Ok(DiffResult::new(paths))
}

/// Parse an svn timestamp such as `2022-03-14T15:09:26.535897Z`, dropping
/// the fractional seconds.
fn parse_date(raw: &str) -> Result<NaiveDateTime> {
    let whole_seconds = raw.split('.').next().unwrap_or(raw).trim_end_matches('Z');
    NaiveDateTime::parse_from_str(whole_seconds, DATE_FORMAT)
        .map_err(|err| log_error(format!("invalid date '{raw}': {err}")))
}

fn log_error(message: impl Display) -> Error {
    Error::OutputParse {
        operation: "log",
        message: message.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    const LOG_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<log>
<logentry
   revision="1">
<author>rbender</author>
<date>2022-03-14T15:09:26.535897Z</date>
<msg>Initial import</msg>
</logentry>
<logentry
   revision="2">
<author>rbender</author>
<date>2022-03-15T08:00:01.000001Z</date>
<msg></msg>
</logentry>
<logentry
   revision="3">
</logentry>
</log>
"#;

    #[test]
    fn log_entries_keep_document_order() -> Result<()> {
        let entries = decode_log(LOG_XML)?;
        let revisions: Vec<u64> = entries.iter().map(|entry| entry.revision).collect();
        assert_eq!(revisions, [1, 2, 3]);

        let first = &entries[0];
        assert_eq!(first.author.as_deref(), Some("rbender"));
        assert_eq!(first.message.as_deref(), Some("Initial import"));
        let expected = NaiveDate::from_ymd_opt(2022, 3, 14)
            .and_then(|day| day.and_hms_opt(15, 9, 26))
            .expect("valid timestamp");
        assert_eq!(first.date, Some(expected));
        assert_eq!(first.date.map(|date| date.nanosecond()), Some(0));

        Ok(())
    }

    #[test]
    fn missing_fields_become_none() -> Result<()> {
        let entries = decode_log(LOG_XML)?;
        assert!(entries[1].message.is_none());
        assert_eq!(entries[2], LogEntry::new(3));
        Ok(())
    }

    #[test]
    fn empty_log_has_no_entries() -> Result<()> {
        let entries = decode_log("<?xml version=\"1.0\"?>\n<log>\n</log>")?;
        assert!(entries.is_empty());
        Ok(())
    }

    #[test]
    fn message_whitespace_is_preserved() -> Result<()> {
        let xml = "<log><logentry revision=\"5\"><author>a</author><msg>  indented\nsecond line  \n</msg></logentry></log>";
        let entries = decode_log(xml)?;
        assert_eq!(
            entries[0].message.as_deref(),
            Some("  indented\nsecond line  \n")
        );
        assert_eq!(entries[0].author.as_deref(), Some("a"));
        Ok(())
    }

    #[test]
    fn message_entities_are_unescaped() -> Result<()> {
        let xml = "<log><logentry revision=\"6\"><msg>fix &lt;tag&gt; &amp; more</msg></logentry><logentry revision=\"7\"/></log>";
        let entries = decode_log(xml)?;
        assert_eq!(entries[0].message.as_deref(), Some("fix <tag> & more"));
        assert_eq!(entries[1], LogEntry::new(7));
        Ok(())
    }

    #[test]
    fn missing_revision_is_a_parse_failure() {
        let err = decode_log("<log><logentry><msg>x</msg></logentry></log>");
        assert!(matches!(err, Err(Error::OutputParse { operation: "log", .. })));
    }

    #[test]
    fn truncated_log_is_a_parse_failure() {
        let err = decode_log("<log><logentry revision=\"1\"><msg>half");
        assert!(matches!(err, Err(Error::OutputParse { operation: "log", .. })));
    }

    #[test]
    fn non_numeric_revision_is_a_parse_failure() {
        let err = decode_log("<log><logentry revision=\"abc\"></logentry></log>");
        assert!(matches!(err, Err(Error::OutputParse { .. })));
    }

    #[test]
    fn bad_date_is_a_parse_failure() {
        let err = decode_log(
            "<log><logentry revision=\"4\"><date>yesterday</date></logentry></log>",
        );
        assert!(matches!(err, Err(Error::OutputParse { .. })));
    }

    #[test]
    fn parse_date_accepts_whole_seconds() -> Result<()> {
        let date = parse_date("2022-03-14T15:09:26Z")?;
        assert_eq!(date.second(), 26);
        Ok(())
    }

    #[test]
    fn diff_paths_follow_document_order() -> Result<()> {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<diff>
<paths>
<path
   props="none"
   kind="file"
   item="modified">file:///srv/repo/hello.txt</path>
<path
   item="added"
   props="none"
   kind="dir">file:///srv/repo/noice</path>
<path
   props="modified"
   kind="file"
   item="deleted">file:///srv/repo/old.txt</path>
</paths>
</diff>
"#;
        let diff = decode_diff(xml)?;
        assert_eq!(diff.len(), 3);

        let first = &diff.paths[0];
        assert_eq!(first.item, ChangeKind::Modified);
        assert_eq!(first.props, ChangeKind::None);
        assert_eq!(first.kind, NodeKind::File);
        assert_eq!(first.path, "file:///srv/repo/hello.txt");

        assert_eq!(diff.paths[1].kind, NodeKind::Dir);
        assert_eq!(diff.paths[2].item, ChangeKind::Deleted);
        assert_eq!(diff.paths[2].props, ChangeKind::Modified);
        Ok(())
    }

    #[test]
    fn diff_empty_status_is_kept_apart_from_missing_status() -> Result<()> {
        let xml = r#"<diff><paths><path item="" kind="file">a.txt</path></paths></diff>"#;
        let diff = decode_diff(xml)?;
        assert_eq!(diff.paths[0].item, ChangeKind::Unknown(String::new()));
        assert_eq!(diff.paths[0].props, ChangeKind::None);
        Ok(())
    }

    #[test]
    fn diff_without_changes_is_empty() -> Result<()> {
        let diff = decode_diff("<diff>\n<paths>\n</paths>\n</diff>")?;
        assert!(diff.is_empty());
        Ok(())
    }

    #[test]
    fn truncated_diff_is_a_parse_failure() {
        let err = decode_diff("<diff><paths><path item=\"added\">a.txt");
        assert!(matches!(err, Err(Error::OutputParse { operation: "diff", .. })));
    }
}
