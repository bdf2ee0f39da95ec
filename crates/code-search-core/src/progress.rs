//! SSE progress classification (spec §6, ambiguity preserved per spec §9
//! Open Question rather than "fixed"). Grounded on the teacher's
//! `indexing.rs` (`IndexingProgress`, `emit_progress`), reduced to the
//! pure classification function.
//!
//! `classify_stage` checks keywords in a fixed precedence — clone, parse,
//! index, complete, failed, then a generic in-progress fallback. A
//! message that matches more than one keyword (e.g. "indexing failed")
//! resolves to whichever keyword comes first in that order (`Indexing`
//! here, not `Failed`). This is the source system's actual behavior, kept
//! as-is rather than reordered to what might look "more correct".

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Cloning,
    Parsing,
    Indexing,
    Complete,
    Failed,
    InProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub message: String,
    pub progress: f32,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>, progress: f32) -> Self {
        let message = message.into();
        Self {
            stage: classify_stage(&message, progress),
            message,
            progress,
        }
    }
}

pub fn classify_stage(message: &str, progress: f32) -> Stage {
    let lower = message.to_lowercase();

    if lower.contains("clone") || lower.contains("cloning") {
        return Stage::Cloning;
    }
    if lower.contains("pars") {
        return Stage::Parsing;
    }
    if lower.contains("index") {
        return Stage::Indexing;
    }
    if lower.contains("complete") || lower.contains("done") || progress >= 1.0 {
        return Stage::Complete;
    }
    if lower.contains("fail") || lower.contains("error") {
        return Stage::Failed;
    }
    Stage::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_keyword_takes_precedence() {
        assert_eq!(classify_stage("cloning repository", 0.1), Stage::Cloning);
    }

    #[test]
    fn parse_after_clone() {
        assert_eq!(classify_stage("parsing files", 0.3), Stage::Parsing);
    }

    #[test]
    fn index_keyword() {
        assert_eq!(classify_stage("indexing chunks", 0.6), Stage::Indexing);
    }

    #[test]
    fn complete_by_progress_threshold() {
        assert_eq!(classify_stage("all done here", 1.0), Stage::Complete);
    }

    #[test]
    fn indexing_failed_resolves_to_indexing_not_failed() {
        // Precedence-preserved ambiguity: "index" is checked before "fail".
        assert_eq!(classify_stage("indexing failed", 0.9), Stage::Indexing);
    }

    #[test]
    fn plain_failure_message_is_failed() {
        assert_eq!(classify_stage("operation failed", 0.5), Stage::Failed);
    }

    #[test]
    fn generic_message_falls_back_to_in_progress() {
        assert_eq!(classify_stage("working on it", 0.4), Stage::InProgress);
    }

    #[test]
    fn progress_event_wraps_classification() {
        let event = ProgressEvent::new("cloning repo", 0.1);
        assert_eq!(event.stage, Stage::Cloning);
        assert_eq!(event.message, "cloning repo");
    }
}
