//! forum-privacy - per-user data lifecycle for discussion forums
//!
//! Locates, exports and erases everything a forum stores about a user:
//! posts and discussions they wrote, read markers, digest, subscription and
//! tracking preferences, plus ratings, tags, plagiarism reports and files
//! held by collaborating subsystems.

pub mod collab;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod forum;
pub mod logging;
pub mod privacy;
pub mod request;
pub mod writer;

pub use collab::{
    Collaborators, FileArea, FileStore, MemoryFileStore, MemoryPlagiarism, MemoryRatings,
    MemoryTags, PlagiarismProvider, RatingProvider, StoredFile, TagProvider,
};
pub use config::Config;
pub use datetime::TimestampFormatter;
pub use db::{Database, DbPool};
pub use error::{PrivacyError, Result};
pub use privacy::{PrivacyProvider, PurgeOutcome};
pub use request::{ApprovedContextList, ApprovedUserList, ContextList, UserList};
pub use writer::{DocumentWriter, FsWriter, MemoryWriter};
