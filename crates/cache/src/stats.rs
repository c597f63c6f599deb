use serde::{Deserialize, Serialize};

/// Estimated bytes held per cached match.
pub const BYTES_PER_MATCH: usize = 500;
/// Estimated bytes held per cached recommendation.
pub const BYTES_PER_RECOMMENDATION: usize = 300;
/// Estimated fixed overhead per cache entry.
pub const BYTES_PER_ENTRY: usize = 100;

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    /// Mean age of valid entries, in seconds.
    pub average_age_secs: i64,
    /// Matches held by valid entries.
    pub total_matches: usize,
    /// Recommendations held by valid entries.
    pub total_recommendations: usize,
    /// Rough footprint of every entry, expired ones included.
    pub estimated_memory_bytes: usize,
}

impl CacheStats {
    /// Average age as `"{h}h {m}m"`.
    pub fn formatted_average_age(&self) -> String {
        let secs = self.average_age_secs.max(0);
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }

    /// Memory estimate in B, KB or MB.
    pub fn formatted_memory(&self) -> String {
        let bytes = self.estimated_memory_bytes;
        if bytes < 1024 {
            format!("{bytes} B")
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
        }
    }
}
