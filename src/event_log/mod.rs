use std::fmt;
use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq)]
pub struct EventLogEntry{
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for EventLogEntry{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        write!(f, "({}) {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Append-only diagnostic log shown to the operator. Insertion order is
/// preserved and entries are never pruned during a session.
#[derive(Debug, Default, Clone)]
pub struct EventLog{
    entries: Vec<EventLogEntry>,
}

impl EventLog{
    pub fn new() -> Self{
        Self::default()
    }

    pub fn append(&mut self, message: impl Into<String>) -> &EventLogEntry{
        let entry = EventLogEntry{
            timestamp: Local::now(),
            message: message.into(),
        };
        tracing::debug!(target: "event_log", "{}", entry.message);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[EventLogEntry]{
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &str>{
        self.entries.iter().map(|e| e.message.as_str())
    }

    pub fn last(&self) -> Option<&EventLogEntry>{
        self.entries.last()
    }

    pub fn len(&self) -> usize{
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool{
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventLogEntry>{
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a EventLog{
    type Item = &'a EventLogEntry;
    type IntoIter = std::slice::Iter<'a, EventLogEntry>;

    fn into_iter(self) -> Self::IntoIter{
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_append_preserves_order(){
        let mut log = EventLog::new();
        log.append("first");
        log.append(String::from("second"));
        log.append("third");

        let msgs: Vec<&str> = log.messages().collect();
        assert_eq!(msgs, vec!["first", "second", "third"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.last().unwrap().message, "third");
        assert!(log.entries()[0].timestamp <= log.entries()[2].timestamp);
    }

    #[test]
    fn test_entry_display_has_clock_prefix(){
        let mut log = EventLog::new();
        let line = log.append("<LEAP> Connected").to_string();
        assert!(line.starts_with('('));
        assert!(line.ends_with(") <LEAP> Connected"));
        //"(HH:MM:SS) " prefix
        assert_eq!(line.find(')'), Some(9));
    }
}
