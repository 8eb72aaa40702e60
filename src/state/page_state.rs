/// Page state definitions for tracking crawl progress
///
/// Within one crawl a URL is either still pending or has been visited. A
/// visit is recorded before the fetch is attempted, whatever the outcome, so
/// `Visited` is terminal: a URL is never fetched twice in one run.
use std::fmt;

/// Represents where a URL stands in the current crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// URL has been discovered but not yet dequeued for fetching
    Pending,

    /// A fetch has been attempted (successful or not)
    Visited,
}

impl PageState {
    /// Returns true if no further processing will happen for this URL
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// Returns true if moving from this state to `next` is allowed
    ///
    /// The only transition is `Pending -> Visited`.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!((self, next), (Self::Pending, Self::Visited))
    }

    /// Short lowercase name, used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Visited => "visited",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
