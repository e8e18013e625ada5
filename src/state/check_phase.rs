//! Check phase definitions for tracking a single page check
//!
//! A page moves through the phases in a fixed order. `Error` is terminal and
//! can only be reached while the page itself is being fetched.
use crate::LinkScoutError;
use std::fmt;

/// Represents the current phase of a page check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckPhase {
    /// Page is waiting to be checked
    Pending,

    /// The page itself is being fetched
    FetchingPage,

    /// Links are being extracted from the page HTML
    ExtractingLinks,

    /// Extracted links are being probed for liveness
    CheckingLinks,

    /// Link results are being merged into the page outcome
    Aggregating,

    /// Page check finished
    Done,

    /// The page could not be fetched
    Error,
}

impl CheckPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CheckPhase) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::FetchingPage)
                | (Self::FetchingPage, Self::ExtractingLinks)
                | (Self::FetchingPage, Self::Error)
                | (Self::ExtractingLinks, Self::CheckingLinks)
                | (Self::CheckingLinks, Self::Aggregating)
                | (Self::Aggregating, Self::Done)
        )
    }

    /// Returns the lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::FetchingPage => "fetching_page",
            Self::ExtractingLinks => "extracting_links",
            Self::CheckingLinks => "checking_links",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the phase of one page check and rejects illegal transitions
#[derive(Debug)]
pub struct PhaseTracker {
    page_url: String,
    phase: CheckPhase,
}

impl PhaseTracker {
    /// Creates a tracker in the `Pending` phase
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            phase: CheckPhase::Pending,
        }
    }

    /// Returns the current phase
    pub fn phase(&self) -> CheckPhase {
        self.phase
    }

    /// Moves to `next`, failing if the transition is not allowed
    pub fn advance(&mut self, next: CheckPhase) -> Result<(), LinkScoutError> {
        if !self.phase.can_transition_to(next) {
            return Err(LinkScoutError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("{}: {} -> {}", self.page_url, self.phase, next);
        self.phase = next;
        Ok(())
    }
}
