//! Error types shared by both phases.
//!
//! Fatal errors (`SourceError`, `PreconditionError`) abort a run. Remote
//! failures below the root page never surface as errors: the materializer
//! turns them into [`crate::materialize::SubtreeFailure`] and
//! [`crate::materialize::AppendWarning`] records instead.

use std::path::PathBuf;
use thiserror::Error;

/// Phase 1 failures: reading sources, generating or persisting the tree.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no *.{extension} documents found under {dir}")]
    NoDocuments { dir: PathBuf, extension: String },

    #[error("generation request failed: {0}")]
    Generation(#[from] RemoteError),

    #[error("generated text is not valid tree JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("generated tree is malformed: {0}")]
    Shape(String),

    #[error("failed to serialize tree: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write tree to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed call against a remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// HTTP status of the failed call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A page could not be created; the node's whole subtree is lost.
#[derive(Debug, Error)]
#[error("failed to create page {title:?}: {source}")]
pub struct CreateError {
    pub title: String,
    #[source]
    pub source: RemoteError,
}

/// Missing or invalid inputs, detected before any remote call is made.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("tree file {0} not found; run the generate phase first")]
    MissingTree(PathBuf),

    #[error("failed to read tree file {path}: {source}")]
    UnreadableTree {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("tree file {path} is not valid tree JSON: {source}")]
    MalformedTree {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tree file {path} is malformed: {reason}")]
    InvalidTree { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fatal outcomes of the upload phase.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Create(#[from] CreateError),
}
