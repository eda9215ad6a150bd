//! Fleet-level statistics
//!
//! Folds many submissions' timelines into the aggregate counters the
//! dashboard renders.

use crate::timeline::analyzer::Timeline;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: usize,
    /// Non-terminal submissions still moving through the pipeline
    pub in_progress: usize,
    /// Submissions that traversed the whole pipeline (progress 100);
    /// includes masteradmin rejections, which complete the final stage
    pub completed: usize,
    pub stuck: usize,
    /// Mean wall-clock time from creation to the final decision, over
    /// completed submissions only. 0 when nothing has completed.
    pub average_completion_ms: i64,
}

pub fn compute_stats(timelines: &[Timeline]) -> AggregateStats {
    let total = timelines.len();
    let in_progress = timelines
        .iter()
        .filter(|t| !t.current_status.is_terminal())
        .count();
    let stuck = timelines.iter().filter(|t| t.is_stuck).count();

    let completed_times: Vec<i64> = timelines
        .iter()
        .filter(|t| t.progress_percentage >= 100.0)
        .map(|t| t.total_time_elapsed_ms)
        .collect();
    let completed = completed_times.len();
    let average_completion_ms = if completed == 0 {
        0
    } else {
        completed_times.iter().sum::<i64>() / completed as i64
    };

    AggregateStats {
        total,
        in_progress,
        completed,
        stuck,
        average_completion_ms,
    }
}
