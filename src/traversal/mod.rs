//! Selector-driven traversal.
//!
//! Walks a node tree under a [`Selector`], reporting every node the selector
//! decides to match. Links are resolved through a [`LinkLoader`] as they are
//! reached, so a walk can cross block boundaries in a content-addressed
//! graph.
//!
//! ## Algorithm
//!
//! 1. Start with the root under the given selector
//! 2. Pop the top of the work list (depth-first)
//!    - If it is a link and links are followed: load it, within the link budget
//!    - Count it against the node budget
//!    - If `decide` is true: call the visitor
//!    - Push the explored children in reverse so they pop in explore order
//! 3. Stop when the work list is empty, a budget is exceeded, or the walk is
//!    cancelled
//!
//! ## Determinism Guarantees
//!
//! - Same root + same selector + same loader contents → same visit order
//! - Every path to a shared block is walked, so a block reachable along two
//!   paths reports its matches under both
//! - A link already being walked with the same continuation higher up the
//!   current path is a cycle and is not entered again

pub mod config;
pub mod loader;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::node::NodeRef;
use crate::selector::Selector;
use crate::types::{Link, NodeError, Path, PathSegment, ReprKind};

pub use config::TraversalConfig;
pub use loader::{InMemoryLinkStore, LinkLoader, LoaderError};

/// Which budget a walk ran out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Budget {
    /// Nodes visited.
    Nodes,
    /// Links loaded.
    Links,
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nodes => write!(f, "nodes"),
            Self::Links => write!(f, "links"),
        }
    }
}

/// Error type for traversal.
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    /// A link could not be resolved and missing links are not skipped.
    #[error("Link not found at /{path}: {link}")]
    LinkNotFound {
        /// The unresolved link.
        link: Link,
        /// Where it was reached.
        path: Path,
    },
    /// Loader backend failure.
    #[error("Loader error: {0}")]
    LoaderError(String),
    /// A budget from the configuration was exhausted.
    #[error("Budget exceeded: more than {limit} {budget}")]
    BudgetExceeded {
        /// The exhausted budget.
        budget: Budget,
        /// Its configured limit.
        limit: usize,
    },
    /// The walk was cancelled through its [`CancelHandle`].
    #[error("Traversal cancelled")]
    Cancelled,
    /// A node failed while being read.
    #[error("Node error at /{path}: {source}")]
    Node {
        /// Where the failing node sits.
        path: Path,
        /// Underlying error.
        #[source]
        source: NodeError,
    },
}

impl TraversalError {
    /// Create a loader error from any error type.
    pub fn from_loader<E: std::error::Error>(e: E) -> Self {
        Self::LoaderError(e.to_string())
    }

    fn node(path: &Path, source: NodeError) -> Self {
        Self::Node {
            path: path.clone(),
            source,
        }
    }
}

/// Where a walk currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// Path from the root to the current node.
    pub path: Path,
    /// Number of links crossed to reach the current node.
    pub links_crossed: usize,
    /// Most recent link crossed, if any.
    pub last_link: Option<Link>,
}

impl Progress {
    fn child(&self, segment: PathSegment) -> Self {
        Self {
            path: self.path.join(segment),
            links_crossed: self.links_crossed,
            last_link: self.last_link.clone(),
        }
    }
}

/// Counters from a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes visited, matched or not.
    pub nodes_visited: usize,
    /// Nodes the selector matched.
    pub matches: usize,
    /// Links loaded.
    pub links_loaded: usize,
    /// Links skipped because the loader could not resolve them.
    pub links_skipped: usize,
    /// Links not entered because they were already being walked with the
    /// same selector higher up the current path.
    pub cycles_skipped: usize,
}

/// Shared flag that stops a running walk.
///
/// Checked before each work-list step, so a walk stops at the next node.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Create an untriggered handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A link crossed on the way to the current frame, with the selector it was
/// entered under. Frames share their ancestors' chain.
struct Crossing {
    link: Link,
    selector: Selector,
    parent: Option<Arc<Crossing>>,
}

fn on_path(mut chain: Option<&Arc<Crossing>>, link: &Link, selector: &Selector) -> bool {
    while let Some(crossing) = chain {
        if crossing.link == *link && crossing.selector == *selector {
            return true;
        }
        chain = crossing.parent.as_ref();
    }
    false
}

struct Frame {
    node: NodeRef,
    selector: Selector,
    progress: Progress,
    crossings: Option<Arc<Crossing>>,
}

/// Selector-driven walker over a link-connected graph.
pub struct Traversal<L: LinkLoader> {
    loader: Arc<L>,
    config: TraversalConfig,
    cancel: CancelHandle,
}

impl<L: LinkLoader + 'static> Traversal<L> {
    /// Create a traversal over `loader`.
    pub fn new(loader: Arc<L>, config: TraversalConfig) -> Self {
        Self {
            loader,
            config,
            cancel: CancelHandle::new(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Handle that cancels walks run by this traversal.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Walk from `root`, calling `visitor` for every node `selector` matches.
    ///
    /// Visits happen in depth-first order, children in the order the
    /// selector explores them.
    pub async fn walk_matching<F>(
        &self,
        root: NodeRef,
        selector: &Selector,
        mut visitor: F,
    ) -> Result<TraversalStats, TraversalError>
    where
        F: FnMut(&Progress, &NodeRef) + Send,
    {
        let mut stats = TraversalStats::default();
        let mut stack = vec![Frame {
            node: root,
            selector: selector.clone(),
            progress: Progress::default(),
            crossings: None,
        }];

        while let Some(Frame { node, selector, mut progress, mut crossings }) = stack.pop() {
            if self.cancel.is_cancelled() {
                tracing::debug!(path = %progress.path, "traversal cancelled");
                return Err(TraversalError::Cancelled);
            }

            let node = if node.repr_kind() == ReprKind::Link && self.config.follow_links {
                let link = node
                    .as_link()
                    .map_err(|e| TraversalError::node(&progress.path, e))?;
                if on_path(crossings.as_ref(), &link, &selector) {
                    tracing::debug!(link = %link, path = %progress.path, "link cycle, not re-entering");
                    stats.cycles_skipped += 1;
                    continue;
                }
                if stats.links_loaded >= self.config.max_links {
                    return Err(TraversalError::BudgetExceeded {
                        budget: Budget::Links,
                        limit: self.config.max_links,
                    });
                }
                stats.links_loaded += 1;
                match self.loader.load(&link).await.map_err(TraversalError::from_loader)? {
                    Some(target) => {
                        progress.links_crossed += 1;
                        progress.last_link = Some(link.clone());
                        crossings = Some(Arc::new(Crossing {
                            link,
                            selector: selector.clone(),
                            parent: crossings,
                        }));
                        target
                    }
                    None if self.config.skip_missing_links => {
                        tracing::warn!(link = %link, path = %progress.path, "skipping unresolved link");
                        stats.links_skipped += 1;
                        continue;
                    }
                    None => {
                        return Err(TraversalError::LinkNotFound {
                            link,
                            path: progress.path,
                        })
                    }
                }
            } else {
                node
            };

            if stats.nodes_visited >= self.config.max_nodes {
                return Err(TraversalError::BudgetExceeded {
                    budget: Budget::Nodes,
                    limit: self.config.max_nodes,
                });
            }
            stats.nodes_visited += 1;
            tracing::trace!(path = %progress.path, variant = selector.variant(), "visiting node");

            if selector.decide(node.as_ref()) {
                stats.matches += 1;
                visitor(&progress, &node);
            }

            for child in selector.explore(node.as_ref()).into_iter().rev() {
                let child_node = node
                    .lookup_segment(&child.segment)
                    .map_err(|e| TraversalError::node(&progress.path, e))?;
                stack.push(Frame {
                    node: child_node,
                    progress: progress.child(child.segment),
                    selector: child.selector,
                    crossings: crossings.clone(),
                });
            }
        }

        tracing::debug!(
            nodes = stats.nodes_visited,
            matches = stats.matches,
            links = stats.links_loaded,
            skipped = stats.links_skipped,
            cycles = stats.cycles_skipped,
            "traversal complete"
        );
        Ok(stats)
    }

    /// Collect every match as `(path, node)`, in visit order.
    pub async fn select(
        &self,
        root: NodeRef,
        selector: &Selector,
    ) -> Result<Vec<(Path, NodeRef)>, TraversalError> {
        let mut out = Vec::new();
        self.walk_matching(root, selector, |progress, node| {
            out.push((progress.path.clone(), Arc::clone(node)));
        })
        .await?;
        Ok(out)
    }
}
