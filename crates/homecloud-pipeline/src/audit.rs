use std::time::Instant;

/// Status of one handler in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandlerStatus {
    /// Forward action ran successfully.
    Executed,
    /// Forward action failed.
    Failed,
    /// Undone during the unwind.
    Undone,
    /// Undo failed during the unwind.
    UndoFailed,
}

/// Record of one handler's run within a pipeline.
#[derive(Debug)]
pub struct HandlerRecord {
    /// Handler label.
    pub handler: String,
    /// Current status.
    pub status: HandlerStatus,
    /// When the forward action started.
    pub started_at: Instant,
    /// When the handler last changed status.
    pub completed_at: Option<Instant>,
}

/// Audit trail of one pipeline run, in execution order.
#[derive(Debug, Default)]
pub struct PipelineAudit {
    records: Vec<HandlerRecord>,
}

impl PipelineAudit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, handler: &str) {
        self.records.push(HandlerRecord {
            handler: handler.to_string(),
            status: HandlerStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
        });
    }

    pub(crate) fn record_success(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = HandlerStatus::Executed;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = HandlerStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_undone(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = HandlerStatus::Undone;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_undo_failed(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.status = HandlerStatus::UndoFailed;
            record.completed_at = Some(Instant::now());
        }
    }

    /// All records, in execution order.
    #[must_use]
    pub fn records(&self) -> &[HandlerRecord] {
        &self.records
    }

    /// One-line-per-handler rendering for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                HandlerStatus::Executed => "✓",
                HandlerStatus::Failed => "✗",
                HandlerStatus::Undone => "↩",
                HandlerStatus::UndoFailed => "⚠",
            };
            lines.push(format!("{status} {}", record.handler));
        }
        lines.join("\n")
    }
}
