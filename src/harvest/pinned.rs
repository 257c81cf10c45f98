//! Pinned-post handling
//!
//! The posts endpoint currently returns a blog's pinned post at the top of
//! every page, whatever the cursor. The default policy saves it once from
//! the first page and drops it everywhere else. Should the endpoint stop
//! doing this, swap in [`TreatPinnedNormally`].

use crate::api::Post;

/// A page split into its pinned post (to force-save) and the rest
#[derive(Debug, Default)]
pub struct PinnedSplit {
    /// Pinned post to save with forced overwrite, if any
    pub pinned: Option<Post>,

    /// Posts subject to the normal duplicate policy, in page order
    pub posts: Vec<Post>,
}

/// Decides what happens to pinned posts on each page
pub trait PinnedPolicy: Send + Sync {
    /// Splits one page; `first_page` is true only for the first page of a run
    fn split(&self, posts: Vec<Post>, first_page: bool) -> PinnedSplit;
}

/// Saves the pinned post from the first page and filters pinned posts from
/// every page
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatedPinnedFilter;

impl PinnedPolicy for RepeatedPinnedFilter {
    fn split(&self, posts: Vec<Post>, first_page: bool) -> PinnedSplit {
        let (pinned, posts): (Vec<Post>, Vec<Post>) =
            posts.into_iter().partition(Post::is_pinned);

        PinnedSplit {
            pinned: if first_page {
                pinned.into_iter().next()
            } else {
                None
            },
            posts,
        }
    }
}

/// Applies no special casing: pinned posts go through the normal policy
#[derive(Debug, Clone, Copy, Default)]
pub struct TreatPinnedNormally;

impl PinnedPolicy for TreatPinnedNormally {
    fn split(&self, posts: Vec<Post>, _first_page: bool) -> PinnedSplit {
        PinnedSplit {
            pinned: None,
            posts,
        }
    }
}
