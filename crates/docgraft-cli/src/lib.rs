//! docgraft CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docgraft:
//! - Apply: copy formatting from a styled source DOCX onto targets
//! - Inspect: show the formatting a DOCX carries
//!
//! # Library Usage
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use docgraft_cli::apply_command;
//! use docgraft_ooxml::Settings;
//!
//! let targets = vec![PathBuf::from("draft.docx")];
//! let outcomes = apply_command(
//!     Path::new("styled.docx"),
//!     &targets,
//!     Path::new("out"),
//!     None,
//!     &Settings::default(),
//! )?;
//! assert!(outcomes.iter().all(|o| o.is_ok()));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Format two drafts like styled.docx, writing into out/
//! docgraft apply --source styled.docx draft1.docx draft2.docx --output out
//!
//! # Also bundle the results
//! docgraft apply -s styled.docx drafts/*.docx --zip formatted.zip
//!
//! # Look at a document's formatting as JSON
//! docgraft inspect styled.docx --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{apply_command, inspect_command, output_name};
pub use app::{run_cli, DocumentSummary, OutputFormat, ParagraphSummary, SectionSummary, TargetOutcome};
