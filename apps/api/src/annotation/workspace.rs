//! Workspace: the single owned application state.
//!
//! Holds the working set of job posts, the label registry, the session of
//! the open job post (selection, drag gesture, undo log) and the status
//! line shown to the user. Every public operation is all-or-nothing: on
//! rejection only the status line changes.
//!
//! A job post whose labels are being saved is frozen: edits to it and a
//! second submission are rejected until the backend answers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::annotation::engine;
use crate::annotation::error::{LabelingError, LabelingResult};
use crate::annotation::labels::{Label, LabelRegistry};
use crate::annotation::selection::{Selection, SelectionState};
use crate::annotation::undo::UndoLog;
use crate::models::job_post::{JobPost, JobSummary, Submission};

const NO_SELECTION_TITLE: &str = "Select a job post to start labeling";

/// Per-document state. Replaced wholesale whenever a job post is opened.
#[derive(Debug)]
struct Session {
    selection: Selection,
    undo: UndoLog,
}

impl Session {
    fn new(job_id: &str, undo_limit: usize) -> Self {
        Self {
            selection: Selection::default(),
            undo: UndoLog::new(job_id, undo_limit),
        }
    }

    fn job_id(&self) -> &str {
        self.undo.job_id()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenView {
    pub id: usize,
    pub text: String,
    pub label: String,
    /// Color of the matching label. `None` for unlabeled tokens and for
    /// labels that no longer exist in the registry.
    pub color: Option<String>,
    pub highlighted: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub job_id: Option<String>,
    pub title: String,
    pub tokens: Vec<TokenView>,
    pub selection_state: SelectionState,
    pub selected_count: usize,
    pub active_label: Option<Label>,
    pub can_undo: bool,
    pub undo_depth: usize,
    pub submitting: bool,
    pub last_deletion_at: Option<DateTime<Utc>>,
    pub status: String,
}

#[derive(Debug)]
pub struct Workspace {
    jobs: Vec<JobPost>,
    registry: LabelRegistry,
    session: Option<Session>,
    /// Job posts posted to the feed and still awaiting acknowledgement.
    submitting: HashSet<String>,
    undo_limit: usize,
    status: String,
}

impl Workspace {
    pub fn new(undo_limit: usize) -> Self {
        Self {
            jobs: Vec::new(),
            registry: LabelRegistry::default(),
            session: None,
            submitting: HashSet::new(),
            undo_limit,
            status: "Ready".to_string(),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    pub fn open_job_id(&self) -> Option<&str> {
        self.session.as_ref().map(Session::job_id)
    }

    pub fn job(&self, job_id: &str) -> Option<&JobPost> {
        self.jobs.iter().find(|j| j.id == job_id)
    }

    pub fn job_summaries(&self) -> Vec<JobSummary> {
        let open = self.open_job_id();
        self.jobs
            .iter()
            .map(|job| JobSummary {
                id: job.id.clone(),
                title: job.title.clone(),
                company: job.company.clone(),
                token_count: job.tokens.len(),
                is_open: open == Some(job.id.as_str()),
            })
            .collect()
    }

    // ────────────────────────────────────────────────────────────────────
    // Working set
    // ────────────────────────────────────────────────────────────────────

    /// Adds job posts whose id is not already in the working set.
    pub fn ingest(&mut self, incoming: Vec<JobPost>) -> usize {
        let mut known: HashSet<String> = self.jobs.iter().map(|j| j.id.clone()).collect();
        let before = self.jobs.len();
        for job in incoming {
            if known.insert(job.id.clone()) {
                self.jobs.push(job);
            } else {
                debug!("Skipping duplicate job post {}", job.id);
            }
        }
        let added = self.jobs.len() - before;
        info!("Ingested {added} new job post(s), {} in working set", self.jobs.len());
        self.status = "Ready".to_string();
        added
    }

    pub fn is_submitting(&self, job_id: &str) -> bool {
        self.submitting.contains(job_id)
    }

    /// Empties the working set. Rejected while a submission is in flight.
    pub fn clear_all(&mut self) -> LabelingResult<()> {
        let result = match self.submitting.iter().next() {
            Some(job_id) => Err(LabelingError::SubmissionPending(job_id.clone())),
            None => {
                self.jobs.clear();
                self.session = None;
                Ok(())
            }
        };
        self.settle(result, |_| "All job posts cleared".to_string())
    }

    /// Opens a job post. Selection, drag gesture and undo history of the
    /// previously open post are discarded.
    pub fn open(&mut self, job_id: &str) -> LabelingResult<()> {
        let result = if self.job(job_id).is_some() {
            self.session = Some(Session::new(job_id, self.undo_limit));
            Ok(())
        } else {
            Err(LabelingError::NotFound(format!("Job post {job_id}")))
        };
        self.settle(result, |_| format!("Opened job post {job_id}"))
    }

    // ────────────────────────────────────────────────────────────────────
    // Labels
    // ────────────────────────────────────────────────────────────────────

    pub fn create_label(&mut self, name: &str, color: &str) -> LabelingResult<Label> {
        let result = self.registry.create_label(name, color).cloned();
        self.settle(result, |label| format!("Created label: {}", label.name))
    }

    pub fn select_label(&mut self, id: &str) -> LabelingResult<Label> {
        let result = self.registry.select_active(id).cloned();
        self.settle(result, |label| format!("Selected label: {}", label.name))
    }

    /// Deletes a label and clears its name from every token in the working
    /// set, including tokens held in the open post's undo log. Returns
    /// `false` when the label is protected. Rejected while a job post that
    /// carries the label is being saved.
    pub fn delete_label(&mut self, id: &str) -> LabelingResult<bool> {
        let result = self.check_label_not_submitting(id).and_then(|()| {
            self.registry.delete_label(id).map(|removed| match removed {
                Some(label) => {
                    let mut cleared: usize = self
                        .jobs
                        .iter_mut()
                        .map(|job| job.tokens.clear_label_value(&label.name))
                        .sum();
                    if let Some(session) = self.session.as_mut() {
                        cleared += session.undo.clear_label_value(&label.name);
                    }
                    debug!("Deleted label '{}', cleared {cleared} token(s)", label.name);
                    true
                }
                None => false,
            })
        });
        self.settle(result, |deleted| {
            if *deleted {
                "Label deleted".to_string()
            } else {
                "Label cannot be deleted".to_string()
            }
        })
    }

    // ────────────────────────────────────────────────────────────────────
    // Selection
    // ────────────────────────────────────────────────────────────────────

    pub fn toggle(&mut self, token_id: usize) -> LabelingResult<()> {
        let result = self.with_open(|job, session| {
            require_token(job, token_id)?;
            session.selection.toggle(token_id);
            Ok(())
        });
        self.settle_selection(result)
    }

    /// Replaces the selection with a single token.
    pub fn select_token(&mut self, token_id: usize) -> LabelingResult<()> {
        let result = self.with_open(|job, session| {
            require_token(job, token_id)?;
            session.selection.select_only(token_id);
            Ok(())
        });
        self.settle_selection(result)
    }

    pub fn select_range(&mut self, anchor: usize, token_id: usize) -> LabelingResult<()> {
        let result = self.with_open(|job, session| {
            let tokens = &job.tokens;
            session
                .selection
                .set_range(anchor, token_id, |id| tokens.contains(id));
            Ok(())
        });
        self.settle_selection(result)
    }

    pub fn select_all(&mut self) -> LabelingResult<()> {
        let result = self.with_open(|job, session| {
            session.selection.select_all(job.tokens.ids());
            Ok(())
        });
        self.settle_selection(result)
    }

    pub fn clear_selection(&mut self) -> LabelingResult<()> {
        let result = self.with_open(|_, session| {
            session.selection.clear();
            Ok(())
        });
        self.settle_selection(result)
    }

    pub fn pointer_down(&mut self, token_id: usize, ctrl: bool) -> LabelingResult<()> {
        let result = self.with_open(|job, session| {
            require_token(job, token_id)?;
            session.selection.pointer_down(token_id, ctrl);
            Ok(())
        });
        self.settle_selection(result)
    }

    pub fn pointer_move(&mut self, token_id: usize) -> LabelingResult<()> {
        let result = self.with_open(|job, session| {
            let tokens = &job.tokens;
            session
                .selection
                .pointer_move(token_id, |id| tokens.contains(id));
            Ok(())
        });
        self.settle_selection(result)
    }

    pub fn pointer_up(&mut self) -> LabelingResult<()> {
        let result = self.with_open(|_, session| {
            session.selection.pointer_up();
            Ok(())
        });
        self.settle_selection(result)
    }

    pub fn is_selected(&self, token_id: usize) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.selection.contains(token_id))
    }

    pub fn has_selection(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.selection.is_empty())
    }

    // ────────────────────────────────────────────────────────────────────
    // Labeling
    // ────────────────────────────────────────────────────────────────────

    /// Applies the active label to the selection. See `engine::apply_active_label`.
    pub fn apply_active_label(&mut self) -> LabelingResult<usize> {
        let registry = &self.registry;
        let result = with_open(
            &mut self.jobs,
            &mut self.session,
            &self.submitting,
            |job, session| {
                engine::apply_active_label(&mut job.tokens, &mut session.selection, registry)
            },
        );
        self.settle(result, |count| format!("Labeled {count} token(s)"))
    }

    pub fn label_token(&mut self, token_id: usize) -> LabelingResult<()> {
        let registry = &self.registry;
        let result = with_open(
            &mut self.jobs,
            &mut self.session,
            &self.submitting,
            |job, _| engine::label_token(&mut job.tokens, registry, token_id),
        );
        self.settle(result, |_| format!("Labeled token {token_id}"))
    }

    pub fn clear_labels(&mut self) -> LabelingResult<()> {
        let result = self.with_open(|job, _| {
            job.tokens.clear_labels();
            Ok(())
        });
        self.settle(result, |_| "Labels cleared".to_string())
    }

    // ────────────────────────────────────────────────────────────────────
    // Deletion and undo
    // ────────────────────────────────────────────────────────────────────

    /// Deletes every selected token and records the removal for undo.
    pub fn delete_selection(&mut self) -> LabelingResult<usize> {
        let result = self.with_open(|job, session| {
            if session.selection.is_empty() {
                return Err(LabelingError::EmptyOperation("Nothing selected"));
            }
            let ids: HashSet<usize> = session.selection.ids().iter().copied().collect();
            let removal = job.tokens.delete_tokens(&ids);
            if removal.removed.is_empty() {
                return Err(LabelingError::EmptyOperation("Nothing selected"));
            }
            let deleted = removal.removed.len();
            session.undo.record(removal.removed);
            session.selection.reconcile(&removal.remap);
            Ok(deleted)
        });
        self.settle(result, |count| format!("Deleted {count} token(s)"))
    }

    /// Restores the most recent deletion of the open job post.
    pub fn undo(&mut self) -> LabelingResult<usize> {
        let result = self.with_open(|job, session| {
            let record = session.undo.undo()?;
            let restored = record.tokens.len();
            let remap = job.tokens.restore_tokens(record.tokens);
            session.selection.reconcile(&remap);
            Ok(restored)
        });
        self.settle(result, |count| format!("Restored {count} token(s)"))
    }

    // ────────────────────────────────────────────────────────────────────
    // Submission
    // ────────────────────────────────────────────────────────────────────

    /// Builds the payload for the open job post and freezes the post until
    /// `complete_submission` or `abort_submission` is called.
    pub fn submission(&mut self) -> LabelingResult<Submission> {
        let result = self.with_open(|job, _| Ok(Submission::from(&*job)));
        if let Ok(submission) = &result {
            self.submitting.insert(submission.job_id.clone());
        }
        self.settle(result, |_| "Saving labels...".to_string())
    }

    /// Removes a job post after the backend acknowledged it.
    pub fn complete_submission(&mut self, job_id: &str) -> bool {
        self.submitting.remove(job_id);
        let before = self.jobs.len();
        self.jobs.retain(|j| j.id != job_id);
        let removed = self.jobs.len() < before;
        if self.open_job_id() == Some(job_id) {
            self.session = None;
        }
        if removed {
            info!("Job post {job_id} submitted and removed from working set");
            self.status = "Labels saved successfully".to_string();
        } else {
            warn!("Acknowledged job post {job_id} is no longer in the working set");
        }
        removed
    }

    /// Unfreezes a job post whose submission failed. The post stays in the
    /// working set with its labels intact.
    pub fn abort_submission(&mut self, job_id: &str) {
        self.submitting.remove(job_id);
        self.status = "Error saving labels".to_string();
    }

    // ────────────────────────────────────────────────────────────────────
    // View
    // ────────────────────────────────────────────────────────────────────

    pub fn view(&self) -> EditorView {
        let open = self
            .session
            .as_ref()
            .and_then(|session| self.job(session.job_id()).map(|job| (job, session)));

        let Some((job, session)) = open else {
            return EditorView {
                job_id: None,
                title: NO_SELECTION_TITLE.to_string(),
                tokens: Vec::new(),
                selection_state: SelectionState::Empty,
                selected_count: 0,
                active_label: self.registry.active().cloned(),
                can_undo: false,
                undo_depth: 0,
                submitting: false,
                last_deletion_at: None,
                status: self.status.clone(),
            };
        };

        let tokens = job
            .tokens
            .iter()
            .map(|token| {
                let color = if token.is_labeled() {
                    self.registry
                        .find_by_name(&token.label)
                        .map(|l| l.color.clone())
                } else {
                    None
                };
                TokenView {
                    id: token.id,
                    text: token.text.clone(),
                    label: token.label.clone(),
                    highlighted: color.is_some(),
                    color,
                    selected: session.selection.contains(token.id),
                }
            })
            .collect();

        EditorView {
            job_id: Some(job.id.clone()),
            title: format!("{} - {}", job.title, job.company),
            tokens,
            selection_state: session.selection.state(),
            selected_count: session.selection.len(),
            active_label: self.registry.active().cloned(),
            can_undo: session.undo.can_undo(),
            undo_depth: session.undo.depth(),
            submitting: self.is_submitting(&job.id),
            last_deletion_at: session.undo.last_deleted_at(),
            status: self.status.clone(),
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Internals
    // ────────────────────────────────────────────────────────────────────

    fn with_open<T>(
        &mut self,
        f: impl FnOnce(&mut JobPost, &mut Session) -> LabelingResult<T>,
    ) -> LabelingResult<T> {
        with_open(&mut self.jobs, &mut self.session, &self.submitting, f)
    }

    fn check_label_not_submitting(&self, label_id: &str) -> LabelingResult<()> {
        let Some(label) = self.registry.labels().iter().find(|l| l.id == label_id) else {
            return Ok(());
        };
        let frozen = self.jobs.iter().find(|job| {
            self.submitting.contains(&job.id) && job.tokens.iter().any(|t| t.label == label.name)
        });
        match frozen {
            Some(job) => Err(LabelingError::SubmissionPending(job.id.clone())),
            None => Ok(()),
        }
    }

    /// Writes the outcome of an operation to the status line.
    fn settle<T>(
        &mut self,
        result: LabelingResult<T>,
        message: impl FnOnce(&T) -> String,
    ) -> LabelingResult<T> {
        match &result {
            Ok(value) => self.status = message(value),
            Err(e) => {
                warn!("Rejected: {e}");
                self.status = e.to_string();
            }
        }
        result
    }

    fn settle_selection(&mut self, result: LabelingResult<()>) -> LabelingResult<()> {
        let selected = self.session.as_ref().map_or(0, |s| s.selection.len());
        self.settle(result, |_| format!("{selected} token(s) selected"))
    }
}

fn with_open<T>(
    jobs: &mut [JobPost],
    session: &mut Option<Session>,
    submitting: &HashSet<String>,
    f: impl FnOnce(&mut JobPost, &mut Session) -> LabelingResult<T>,
) -> LabelingResult<T> {
    let session = session
        .as_mut()
        .ok_or_else(|| LabelingError::NotFound("Open job post".to_string()))?;
    if submitting.contains(session.job_id()) {
        return Err(LabelingError::SubmissionPending(session.job_id().to_string()));
    }
    let job = jobs
        .iter_mut()
        .find(|j| j.id == session.job_id())
        .ok_or_else(|| LabelingError::NotFound(format!("Job post {}", session.job_id())))?;
    f(job, session)
}

fn require_token(job: &JobPost, token_id: usize) -> LabelingResult<()> {
    if job.tokens.contains(token_id) {
        Ok(())
    } else {
        Err(LabelingError::NotFound(format!("Token {token_id}")))
    }
}
