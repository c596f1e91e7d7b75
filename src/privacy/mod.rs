//! Privacy operations over per-user forum data.
//!
//! [`PrivacyProvider`] ties the forum repository to the collaborating
//! subsystems and implements:
//! - locating the forums holding a user's data, and the users in a forum
//! - exporting a user's data from approved forums to a [`DocumentWriter`]
//! - exporting the user's site-wide forum preferences
//! - erasing a forum entirely, or one or more users' data in it
//!
//! Every operation takes the caller's connection. Open a transaction with
//! [`Database::begin`](crate::Database::begin) and pass `&mut *tx` so that a
//! failure anywhere rolls the whole operation back.
//!
//! [`DocumentWriter`]: crate::writer::DocumentWriter

mod erase;
mod export;
mod locator;
pub mod metadata;
mod preferences;

pub use erase::PurgeOutcome;

use crate::collab::Collaborators;
use crate::datetime::TimestampFormatter;

/// Entry point for all privacy operations.
#[derive(Debug, Clone)]
pub struct PrivacyProvider<'a> {
    collab: Collaborators<'a>,
    formatter: TimestampFormatter,
}

impl<'a> PrivacyProvider<'a> {
    /// Create a provider rendering timestamps in UTC.
    pub fn new(collab: Collaborators<'a>) -> Self {
        Self {
            collab,
            formatter: TimestampFormatter::default(),
        }
    }

    /// Use a specific timestamp formatter for exported documents.
    pub fn with_formatter(mut self, formatter: TimestampFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Collaborators this provider talks to.
    pub fn collaborators(&self) -> Collaborators<'a> {
        self.collab
    }
}
