use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Op {
    Create,
    Write,
    Remove,
    Rename,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Op::Create => "CREATE",
            Op::Write => "WRITE",
            Op::Remove => "REMOVE",
            Op::Rename => "RENAME",
        };
        f.write_str(label)
    }
}

/// A single file-change record. Zero/empty fields are omitted from the
/// JSON form, mirroring the snapshot wire format consumers parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: DateTime<Utc>,
    pub op: Op,
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lang: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub lines: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delta: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub size_delta: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dirty: bool,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub importers: usize,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub imports: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_hub: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_hot: Vec<String>,
}

impl Event {
    pub fn new(op: Op, path: String, lang: String) -> Self {
        Self {
            time: Utc::now(),
            op,
            path,
            lang,
            lines: 0,
            delta: 0,
            size_delta: 0,
            dirty: false,
            importers: 0,
            imports: 0,
            is_hub: false,
            related_hot: Vec::new(),
        }
    }

    /// Fixed-column line for `events.log`:
    /// `YYYY-MM-DD HH:MM:SS | OP(6) | path(40) | lines(4) | delta(6) | dirty`.
    pub fn log_line(&self) -> String {
        let delta = if self.delta > 0 {
            format!("+{}", self.delta)
        } else if self.delta < 0 {
            format!("{}", self.delta)
        } else {
            String::new()
        };
        let dirty = if self.dirty { "dirty" } else { "" };
        format!(
            "{} | {:<6} | {:<40} | {:>4} | {:>6} | {}",
            self.time.format("%Y-%m-%d %H:%M:%S"),
            self.op.to_string(),
            self.path,
            self.lines,
            delta,
            dirty,
        )
    }
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Op::Create).unwrap(), "\"CREATE\"");
        assert_eq!(serde_json::to_string(&Op::Rename).unwrap(), "\"RENAME\"");
        let op: Op = serde_json::from_str("\"WRITE\"").unwrap();
        assert_eq!(op, Op::Write);
    }

    #[test]
    fn zero_fields_are_omitted() {
        let event = Event::new(Op::Remove, "gone.go".to_string(), "go".to_string());
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("lines"));
        assert!(!json.contains("dirty"));
        assert!(!json.contains("related_hot"));
        assert!(json.contains("\"op\":\"REMOVE\""));
    }

    #[test]
    fn event_json_round_trips() {
        let mut event = Event::new(Op::Write, "x.go".to_string(), "go".to_string());
        event.lines = 5;
        event.delta = 2;
        event.size_delta = 40;
        event.is_hub = true;
        event.importers = 3;
        event.related_hot = vec!["y.go".to_string()];
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn log_line_columns() {
        let mut event = Event::new(Op::Write, "x.go".to_string(), "go".to_string());
        event.lines = 5;
        event.delta = 2;
        event.dirty = true;
        let line = event.log_line();
        assert!(line.contains("| WRITE  |"));
        assert!(line.contains("|    5 |"));
        assert!(line.contains("|     +2 |"));
        assert!(line.ends_with("| dirty"));
    }

    #[test]
    fn log_line_omits_zero_delta() {
        let event = Event::new(Op::Create, "new.go".to_string(), "go".to_string());
        let line = event.log_line();
        assert!(line.contains("|        |"));
    }
}
