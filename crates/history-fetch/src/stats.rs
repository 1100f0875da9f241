//! Run statistics

use std::time::Duration;
use crate::formatting::{format_number, format_duration};

/// Counters collected during a run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Commits that touched the tracked file
    pub commits_listed: usize,
    /// Commits whose content was retrieved and extracted
    pub commits_processed: usize,
    /// Commits skipped because the file was missing or unreadable
    pub commits_skipped: usize,
    pub snapshots: usize,
    pub events: usize,
    pub elapsed_time: Duration,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Commits: {} listed, {} processed, {} skipped | Snapshots: {} | Change events: {} | Time: {}",
            format_number(self.commits_listed),
            format_number(self.commits_processed),
            format_number(self.commits_skipped),
            format_number(self.snapshots),
            format_number(self.events),
            format_duration(self.elapsed_time)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_summarizes_run() {
        let stats = RunStats {
            commits_listed: 1_234,
            commits_processed: 1_200,
            commits_skipped: 34,
            snapshots: 98_765,
            events: 321,
            elapsed_time: Duration::from_secs(75),
        };
        assert_eq!(
            stats.to_string(),
            "Commits: 1,234 listed, 1,200 processed, 34 skipped | Snapshots: 98,765 | Change events: 321 | Time: 1m 15s"
        );
    }
}
