//! Tree materialization: recreates a [`SpecNode`] tree as remote pages.
//!
//! Traversal is depth-first and strictly sequential. For each node:
//!
//! 1. render its content (nothing if it has none);
//! 2. create the page under the parent with the first chunk of blocks;
//! 3. append the remaining blocks chunk by chunk;
//! 4. materialize the children, in order, under the new page.
//!
//! A failed create skips the node's whole subtree but not its siblings. A
//! failed append loses that chunk only; the page and its children are
//! still created. Both are recorded in the [`MaterializeReport`]. Nothing
//! is retried and nothing already created is rolled back.

use futures::future::{BoxFuture, FutureExt};
use tracing::{error, info, warn};

use crate::block::{truncate_text, ContentBlock, PageLimits};
use crate::contract::{PageClient, PageId, RemotePageHandle};
use crate::error::{CreateError, RemoteError};
use crate::render::Renderer;
use crate::tree::SpecNode;

/// A node whose page could not be created. None of its subtree exists remotely.
#[derive(Debug)]
pub struct SubtreeFailure {
    /// Titles from the root down to the failed node.
    pub path: Vec<String>,
    /// The failed node plus all of its descendants.
    pub skipped_pages: usize,
    pub error: RemoteError,
}

/// A chunk of blocks that could not be appended to an existing page.
#[derive(Debug)]
pub struct AppendWarning {
    pub path: Vec<String>,
    pub page_id: PageId,
    /// Zero-based index among the page's append calls.
    pub chunk: usize,
    pub lost_blocks: usize,
    pub error: RemoteError,
}

/// Outcome of materializing a tree whose root page was created.
#[derive(Debug)]
pub struct MaterializeReport {
    pub root: RemotePageHandle,
    pub pages_created: usize,
    pub create_calls: usize,
    pub append_calls: usize,
    pub failures: Vec<SubtreeFailure>,
    pub warnings: Vec<AppendWarning>,
}

impl MaterializeReport {
    /// True when every page and every block made it to the remote side.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }

    pub fn skipped_pages(&self) -> usize {
        self.failures.iter().map(|f| f.skipped_pages).sum()
    }
}

#[derive(Default)]
struct Tally {
    pages_created: usize,
    create_calls: usize,
    append_calls: usize,
    failures: Vec<SubtreeFailure>,
    warnings: Vec<AppendWarning>,
}

pub struct Materializer<'c, C: ?Sized> {
    client: &'c C,
    renderer: Renderer,
    limits: PageLimits,
}

impl<'c, C> Materializer<'c, C>
where
    C: PageClient + ?Sized,
{
    pub fn new(client: &'c C, renderer: Renderer, limits: PageLimits) -> Self {
        Self {
            client,
            renderer,
            limits,
        }
    }

    /// Materializes `root` under `parent`.
    ///
    /// Fails only when the root page itself cannot be created; every other
    /// failure is reported in the returned [`MaterializeReport`].
    pub async fn run(
        &self,
        root: &SpecNode,
        parent: &PageId,
    ) -> Result<MaterializeReport, CreateError> {
        let mut tally = Tally::default();
        let root_handle = self
            .visit(root, parent, vec![root.title.clone()], &mut tally)
            .await
            .map_err(|source| {
                error!(page = %root.title, error = %source, "Failed to create root page");
                CreateError {
                    title: root.title.clone(),
                    source,
                }
            })?;

        info!(
            address = %root_handle.address,
            pages_created = tally.pages_created,
            failures = tally.failures.len(),
            warnings = tally.warnings.len(),
            "Materialization finished"
        );
        Ok(MaterializeReport {
            root: root_handle,
            pages_created: tally.pages_created,
            create_calls: tally.create_calls,
            append_calls: tally.append_calls,
            failures: tally.failures,
            warnings: tally.warnings,
        })
    }

    fn visit<'a>(
        &'a self,
        node: &'a SpecNode,
        parent: &'a PageId,
        path: Vec<String>,
        tally: &'a mut Tally,
    ) -> BoxFuture<'a, Result<RemotePageHandle, RemoteError>> {
        async move {
            let blocks: Vec<ContentBlock> = node
                .content
                .as_ref()
                .map(|content| self.renderer.render(content))
                .unwrap_or_default();
            let per_call = self.limits.max_blocks_per_call();
            let (first, rest) = blocks.split_at(blocks.len().min(per_call));

            info!(page = %path.join(" / "), blocks = blocks.len(), "Creating page");
            let title = truncate_text(node.title.clone(), self.limits.max_block_text());
            tally.create_calls += 1;
            let handle = self.client.create_page(parent, &title, first).await?;
            tally.pages_created += 1;

            if !rest.is_empty() {
                info!(
                    page = %node.title,
                    remaining = rest.len(),
                    calls = calls_for_blocks(blocks.len(), &self.limits) - 1,
                    "Appending remaining blocks"
                );
            }
            for (chunk, batch) in rest.chunks(per_call).enumerate() {
                tally.append_calls += 1;
                if let Err(error) = self.client.append_blocks(&handle.id, batch).await {
                    warn!(
                        page = %node.title,
                        chunk,
                        lost_blocks = batch.len(),
                        error = %error,
                        "Failed to append blocks; page left with partial content"
                    );
                    tally.warnings.push(AppendWarning {
                        path: path.clone(),
                        page_id: handle.id.clone(),
                        chunk,
                        lost_blocks: batch.len(),
                        error,
                    });
                }
            }

            for child in &node.children {
                let mut child_path = path.clone();
                child_path.push(child.title.clone());
                if let Err(error) = self
                    .visit(child, &handle.id, child_path.clone(), tally)
                    .await
                {
                    let skipped_pages = child.subtree_size();
                    error!(
                        page = %child_path.join(" / "),
                        skipped_pages,
                        error = %error,
                        "Failed to create page; skipping its subtree"
                    );
                    tally.failures.push(SubtreeFailure {
                        path: child_path,
                        skipped_pages,
                        error,
                    });
                }
            }

            Ok(handle)
        }
        .boxed()
    }
}

/// Materializes `root` under `parent` with the default renderer and limits.
pub async fn materialize<C>(
    client: &C,
    root: &SpecNode,
    parent: &PageId,
) -> Result<MaterializeReport, CreateError>
where
    C: PageClient + ?Sized,
{
    Materializer::new(client, Renderer::default(), PageLimits::default())
        .run(root, parent)
        .await
}

/// Number of remote calls needed to create one page carrying `blocks`
/// blocks: one create plus one append per further chunk.
pub fn calls_for_blocks(blocks: usize, limits: &PageLimits) -> usize {
    1 + blocks
        .saturating_sub(limits.max_blocks_per_call())
        .div_ceil(limits.max_blocks_per_call())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_count_matches_chunking() {
        let limits = PageLimits::default();
        assert_eq!(calls_for_blocks(0, &limits), 1);
        assert_eq!(calls_for_blocks(100, &limits), 1);
        assert_eq!(calls_for_blocks(101, &limits), 2);
        assert_eq!(calls_for_blocks(200, &limits), 2);
        assert_eq!(calls_for_blocks(251, &limits), 3);
    }
}
