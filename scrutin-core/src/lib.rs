//! Scrutin Core - Prompt assembly and review generation for Scrutin
//!
//! This crate turns a ticket, a pull request, a set of source files and
//! optional reference documents into a single review prompt, submits it to a
//! hosted model, and validates that the reply follows the required six-section
//! structure.

pub mod config;
pub mod error;
pub mod files;
pub mod model;
pub mod prompt;
pub mod references;
pub mod review;
pub mod secrets;

pub use config::Config;
pub use error::{Error, Result};
pub use files::{FileNode, FileReader};
pub use model::{
    ApiResponse, CommentInfo, CommitInfo, FileChange, FileStatus, GeneratedReview,
    PullRequestRecord, ReferenceDocument, ReferenceKind, RepoRef, ReviewInfo, ReviewInput,
    ReviewSections, TicketRecord,
};
pub use prompt::{build_prompt, format_pr, format_references, Persona, PromptBuilder};
pub use references::{ReferenceCatalog, ReferenceContents};
pub use review::{parse_sections, GeminiBackend, GenerationBackend, ReviewGenerator};
pub use secrets::Secrets;
