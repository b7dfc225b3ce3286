//! Breakpoint state for one debug session.
//!
//! The client owns breakpoints per source path as a replace-on-set line
//! list; the inspector side hands back opaque breakpoint ids that must
//! be removed before the path's breakpoints are re-applied. The store
//! keeps both, in parallel.

use std::collections::HashMap;

/// Per-path breakpoint lines and the inspector ids created for them.
#[derive(Debug, Clone, Default)]
pub struct BreakpointStore {
    /// Requested lines (1-based, client order, deduplicated) per source path.
    lines: HashMap<String, Vec<i64>>,
    /// Inspector breakpoint ids created for each source path.
    inspector_ids: HashMap<String, Vec<String>>,
}

impl BreakpointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the requested lines for a source path.
    ///
    /// Duplicates are dropped, first occurrence wins; an empty list
    /// clears the path.
    pub fn set_lines(&mut self, path: &str, lines: &[i64]) {
        let mut deduped: Vec<i64> = Vec::with_capacity(lines.len());
        for &line in lines {
            if !deduped.contains(&line) {
                deduped.push(line);
            }
        }
        if deduped.is_empty() {
            self.lines.remove(path);
        } else {
            self.lines.insert(path.to_string(), deduped);
        }
    }

    /// The requested lines for a source path.
    pub fn lines_for(&self, path: &str) -> &[i64] {
        self.lines.get(path).map_or(&[], |v| v.as_slice())
    }

    /// Snapshot of every path with its requested lines.
    pub fn entries(&self) -> Vec<(String, Vec<i64>)> {
        self.lines
            .iter()
            .map(|(path, lines)| (path.clone(), lines.clone()))
            .collect()
    }

    /// Drain every recorded inspector id, for the clear-before-reapply
    /// step. After this call no id from a previous application survives.
    pub fn take_inspector_ids(&mut self) -> Vec<String> {
        self.inspector_ids.drain().flat_map(|(_, ids)| ids).collect()
    }

    /// Record the inspector ids created for a source path.
    pub fn record_inspector_ids(&mut self, path: &str, ids: Vec<String>) {
        self.inspector_ids.insert(path.to_string(), ids);
    }

    /// Total number of live inspector ids.
    pub fn inspector_id_count(&self) -> usize {
        self.inspector_ids.values().map(Vec::len).sum()
    }
}
