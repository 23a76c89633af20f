//! Error types for OOXML operations

use std::fmt;

use thiserror::Error;

/// Which side of a transplant a document plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRole {
    /// The document formatting is read from
    Source,
    /// The document formatting is written to
    Target,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Source => write!(f, "source"),
            DocumentRole::Target => write!(f, "target"),
        }
    }
}

/// Errors that can occur during OOXML operations
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// A document lacks an element the transplant cannot work without
    #[error("Structural error in {role} document: {message}")]
    Structural {
        /// Which document failed
        role: DocumentRole,
        /// What is missing
        message: String,
    },

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OoxmlError {
    /// The "document has no sections" failure for one side of a transplant
    pub fn no_sections(role: DocumentRole) -> Self {
        OoxmlError::Structural {
            role,
            message: "document has no sections".to_string(),
        }
    }

    /// Check if this is a structural error
    pub fn is_structural(&self) -> bool {
        matches!(self, OoxmlError::Structural { .. })
    }
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
