//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// All of them are fatal for the document: no claims, no dossier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// Backstory is empty or whitespace only
    #[error("Backstory is empty")]
    EmptyInput,

    /// No sentence names a recognizable entity
    #[error("No recognizable entities in backstory")]
    NoEntities,

    /// Entities were found but every sentence was filtered out
    #[error("No claims could be extracted ({0} sentences examined)")]
    NoClaims(usize),

    /// Text exceeds maximum length
    #[error("Text too long: {0} characters (max: {1})")]
    TextTooLong(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
