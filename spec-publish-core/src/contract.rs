//! # contract: interfaces to the remote services
//!
//! The core never talks HTTP. It drives two collaborators through the
//! traits below, which the CLI crate implements against the real services
//! and tests replace with `mockall` mocks.
//!
//! - [`PageClient`]: creates pages under a parent page and appends blocks
//!   to existing pages.
//! - [`TreeGenerator`]: produces a specification tree from source documents.
//!
//! Implementations own transport concerns (authentication, timeouts) and
//! convert every upstream failure into a [`RemoteError`] or
//! [`SourceError`]. They never retry on the caller's behalf.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::block::ContentBlock;
use crate::error::{RemoteError, SourceError};
use crate::tree::SpecNode;

/// Opaque identifier of a remote page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier and canonical address of a page that was just created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePageHandle {
    pub id: PageId,
    pub address: String,
}

/// Source documents keyed by their path relative to the source directory.
pub type SourceDocuments = BTreeMap<String, String>;

/// The remote page hierarchy.
///
/// Callers never pass more blocks per call than the service accepts; see
/// [`crate::block::PageLimits`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PageClient: Send + Sync {
    /// Create a page titled `title` under `parent`, carrying `blocks` as its
    /// initial content.
    async fn create_page(
        &self,
        parent: &PageId,
        title: &str,
        blocks: &[ContentBlock],
    ) -> Result<RemotePageHandle, RemoteError>;

    /// Append `blocks` after the existing content of `page`.
    async fn append_blocks(&self, page: &PageId, blocks: &[ContentBlock])
        -> Result<(), RemoteError>;
}

/// Produces the specification tree from the source documents.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TreeGenerator: Send + Sync {
    /// Generate a tree. Text that does not parse into a well-formed tree is
    /// a [`SourceError`].
    async fn generate(&self, documents: &SourceDocuments) -> Result<SpecNode, SourceError>;
}
