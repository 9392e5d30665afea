use thiserror::Error;

use crate::blocks::BlockKind;

/// Failures from mutating a page's block collection.
///
/// None of these leave the collection partially modified: the operation either
/// applies completely or not at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("no block with id '{id}' on this page")]
    BlockNotFound { id: String },

    #[error("block '{id}' is a {expected} block, not a {found} block")]
    KindMismatch {
        id: String,
        expected: BlockKind,
        found: BlockKind,
    },

    #[error("target index {index} is out of range for a page with {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("duplicate block id '{id}'")]
    DuplicateId { id: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("page file I/O failed for {path}: {source}")]
    PageFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse page file {path}: {reason}")]
    PageFileParse { path: String, reason: String },

    #[error("failed to encode page file {path}: {reason}")]
    PageFileEncode { path: String, reason: String },

    #[error("unsupported page file {path}; expected .json, .yaml or .yml")]
    UnsupportedPageFormat { path: String },
}
