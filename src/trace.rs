use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub step:      usize,
    pub state:     String,
    pub event:     String,
    pub data:      String,
    pub timestamp: DateTime<Utc>,
}

/// What one agent invocation did, in order. Printed as a table when the
/// agent runs verbose.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry stamped with the current time.
    pub fn record(&mut self, step: usize, state: &str, event: &str, data: &str) {
        self.entries.push(TraceEntry {
            step,
            state:     state.to_string(),
            event:     event.to_string(),
            data:      data.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_state(&self, state: &str) -> Vec<&TraceEntry> {
        self.entries.iter().filter(|e| e.state == state).collect()
    }

    pub fn contains_event(&self, event: &str) -> bool {
        self.entries.iter().any(|e| e.event == event)
    }

    /// Number of requests the agent sent, whatever their outcome.
    pub fn requests_sent(&self) -> usize {
        self.entries.iter().filter(|e| e.event == "TOOL_EXECUTE").count()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<6} {:<10} {:<20} data", "step", "state", "event")?;
        writeln!(f, "{}", "─".repeat(80))?;
        for e in &self.entries {
            let data: String = e.data.chars().take(60).collect();
            writeln!(f, "{:<6} {:<10} {:<20} {}", e.step, e.state, e.event, data)?;
        }
        write!(f, "{} entries, {} requests", self.entries.len(), self.requests_sent())
    }
}
