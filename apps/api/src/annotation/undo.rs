//! Deletion/Undo Log: a document-scoped stack of removed-token snapshots.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::annotation::error::{LabelingError, LabelingResult};
use crate::annotation::token_store::Token;

#[derive(Debug, Clone)]
pub struct DeletionRecord {
    pub tokens: Vec<Token>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UndoLog {
    /// Document this history belongs to.
    job_id: String,
    records: VecDeque<DeletionRecord>,
    max_depth: usize,
}

impl UndoLog {
    pub fn new(job_id: impl Into<String>, max_depth: usize) -> Self {
        Self {
            job_id: job_id.into(),
            records: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn depth(&self) -> usize {
        self.records.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn last_deleted_at(&self) -> Option<DateTime<Utc>> {
        self.records.back().map(|r| r.timestamp)
    }

    /// Pushes a snapshot of removed tokens. Empty snapshots are not recorded.
    /// The oldest record is dropped once the log is full.
    pub fn record(&mut self, tokens: Vec<Token>) {
        if tokens.is_empty() {
            return;
        }
        self.records.push_back(DeletionRecord {
            tokens,
            timestamp: Utc::now(),
        });
        if self.records.len() > self.max_depth {
            self.records.pop_front();
        }
    }

    /// Clears `label` from every recorded token so a later undo cannot bring
    /// back a label that no longer exists. Returns how many changed.
    pub fn clear_label_value(&mut self, label: &str) -> usize {
        let mut cleared = 0;
        for token in self
            .records
            .iter_mut()
            .flat_map(|r| r.tokens.iter_mut())
            .filter(|t| t.label == label)
        {
            token.label.clear();
            cleared += 1;
        }
        cleared
    }

    pub fn undo(&mut self) -> LabelingResult<DeletionRecord> {
        self.records
            .pop_back()
            .ok_or(LabelingError::EmptyOperation("Nothing to undo"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str, position: usize) -> Vec<Token> {
        let mut token = Token::new(text);
        token.id = position;
        token.position = position;
        vec![token]
    }

    #[test]
    fn test_undo_empty_log_fails() {
        let mut log = UndoLog::new("job-1", 10);
        assert_eq!(
            log.undo().unwrap_err(),
            LabelingError::EmptyOperation("Nothing to undo")
        );
    }

    #[test]
    fn test_undo_walks_back_one_record_per_call() {
        let mut log = UndoLog::new("job-1", 10);
        log.record(snapshot("first", 0));
        log.record(snapshot("second", 1));

        assert_eq!(log.undo().unwrap().tokens[0].text, "second");
        assert_eq!(log.undo().unwrap().tokens[0].text, "first");
        assert!(!log.can_undo());
    }

    #[test]
    fn test_empty_snapshot_is_not_recorded() {
        let mut log = UndoLog::new("job-1", 10);
        log.record(Vec::new());
        assert_eq!(log.depth(), 0);
    }

    #[test]
    fn test_oldest_record_dropped_past_max_depth() {
        let mut log = UndoLog::new("job-1", 2);
        log.record(snapshot("a", 0));
        log.record(snapshot("b", 0));
        log.record(snapshot("c", 0));
        assert_eq!(log.depth(), 2);
        assert_eq!(log.undo().unwrap().tokens[0].text, "c");
        assert_eq!(log.undo().unwrap().tokens[0].text, "b");
        assert!(log.undo().is_err());
    }

    #[test]
    fn test_clear_label_value_reaches_every_record() {
        let mut log = UndoLog::new("job-1", 10);
        let mut first = snapshot("senior", 0);
        first[0].label = "Title".to_string();
        let mut second = snapshot("rust", 1);
        second[0].label = "Skill".to_string();
        log.record(first);
        log.record(second);

        assert_eq!(log.clear_label_value("Title"), 1);
        assert_eq!(log.undo().unwrap().tokens[0].label, "Skill");
        assert_eq!(log.undo().unwrap().tokens[0].label, "");
    }

    #[test]
    fn test_log_is_scoped_to_its_document() {
        let log = UndoLog::new("job-7", 10);
        assert_eq!(log.job_id(), "job-7");
    }
}
