use crate::api::PostId;

/// Emitted once per page, after pinned handling and before persisting
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestProgress {
    /// Pages fetched so far, including this one
    pub page: u64,

    /// Non-pinned posts received so far
    pub seen: u64,

    /// Total posts as reported with this page
    pub total: u64,

    /// Cursor used for this page's request
    pub cursor: Option<PostId>,
}

impl HarvestProgress {
    /// Percentage of the blog covered, if the total is known
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((100.0 * self.seen as f64 / self.total as f64).min(100.0))
    }
}

/// Progress callback
pub type ProgressFn = Box<dyn Fn(&HarvestProgress) + Send + Sync>;
