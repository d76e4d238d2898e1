//! courseport - Course content portal library
//!
//! A login-gated portal over a set of course documents (PDF, PPTX, DOCX)
//! served from either a local directory or a remote GitHub repository.
//!
//! # Core Modules
//!
//! - [`auth`] - Credential check, sessions, and the navigation shell
//! - [`source`] - Content source adapter (local directory / GitHub repo)
//! - [`render`] - Inline previews: PDF data-URIs, DOCX text and tables
//! - [`server`] - HTTP server exposing the portal
//! - [`config`] - On-disk configuration
//! - [`errors`] - Error taxonomy mapped onto HTTP responses

pub mod auth;
pub mod config;
pub mod errors;
pub mod render;
pub mod server;
pub mod source;

// Re-export commonly used types
pub use auth::{Credentials, Session, SessionManager, View};
pub use config::{load_config, save_config, Config, SourceConfig};
pub use errors::{PortalError, PortalResult};
pub use render::{extract_docx, preview, DocxContent, Preview, Table};
pub use server::Server;
pub use source::{ContentSource, FileEntry, FileKind, GithubSource, LocalSource};
