//! Concurrent decomposition tree construction.
//!
//! One task processes one region. A task computes statistics for its node,
//! applies the stopping policy, and either finalizes the node as a leaf or
//! creates four children and fans out one task per child, joining on all four
//! before returning. The work counter is charged at node creation time by the
//! creating task, so a node's budget fate is fixed before its task ever runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use common::Buffer2;

use crate::color::{region_stats, ChannelError, RegionStats, Rgba8};
use crate::config::{BuildConfig, ConfigError};
use crate::region::Region;
use crate::render;
use crate::source::PixelSource;

/// Arena index of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Why a region stopped subdividing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafCause {
    /// Width or height below two pixels; a split would produce a zero-area
    /// child.
    MinSize,
    /// Scalar error below the configured threshold.
    ErrorBelowThreshold,
    /// The work budget could not cover four more node creations.
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Created but not yet processed. Never observable after the build
    /// returns.
    #[default]
    Pending,
    Leaf(LeafCause),
    Internal([NodeId; 4]),
}

/// One decomposition node.
///
/// `color`, `error` and `state` are written exactly once, by the task that
/// processes the node, and never touched again.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub region: Region,
    /// Creation sequence number, charged against the work budget by the
    /// creating task.
    pub work_index: u64,
    pub color: Rgba8,
    pub error: ChannelError,
    pub state: NodeState,
}

/// Terminal node, rendered as one uniform color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub id: NodeId,
    pub region: Region,
    pub color: Rgba8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildStats {
    pub elapsed_secs: f64,
    pub nodes_created: u64,
    pub leaf_count: usize,
    pub max_depth: u32,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

struct BuildShared<S> {
    source: S,
    config: BuildConfig,
    /// Node creations charged against the work budget.
    work_used: AtomicU64,
    max_depth: AtomicU32,
    nodes: Mutex<Vec<Node>>,
    leaves: Mutex<Vec<Leaf>>,
    /// Caps simultaneously running statistics passes.
    limiter: Semaphore,
}

impl<S> BuildShared<S> {
    /// Reserve budget for four children. Fails once fewer than four
    /// creations remain, which forces the caller into a leaf.
    fn try_reserve_children(&self) -> Option<u64> {
        let budget = self.config.work_budget;
        self.work_used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used + 4 <= budget).then_some(used + 4)
            })
            .ok()
            .map(|previous| previous + 4)
    }

    fn create_node(&self, region: Region, work_index: u64) -> NodeId {
        let mut nodes = self.nodes.lock();
        let id = NodeId(nodes.len() as u32);
        nodes.push(Node {
            id,
            region,
            work_index,
            color: Rgba8::default(),
            error: ChannelError::default(),
            state: NodeState::Pending,
        });
        id
    }

    fn node_region(&self, id: NodeId) -> Region {
        self.nodes.lock()[id.index()].region
    }

    fn finish_leaf(&self, id: NodeId, stats: RegionStats, cause: LeafCause) {
        let leaf = {
            let mut nodes = self.nodes.lock();
            let node = &mut nodes[id.index()];
            debug_assert_eq!(node.state, NodeState::Pending);
            node.color = stats.color;
            node.error = stats.error;
            node.state = NodeState::Leaf(cause);
            Leaf {
                id,
                region: node.region,
                color: node.color,
            }
        };
        self.leaves.lock().push(leaf);
    }

    fn finish_internal(&self, id: NodeId, stats: RegionStats, children: [NodeId; 4]) {
        let mut nodes = self.nodes.lock();
        let node = &mut nodes[id.index()];
        debug_assert_eq!(node.state, NodeState::Pending);
        node.color = stats.color;
        node.error = stats.error;
        node.state = NodeState::Internal(children);
    }
}

/// Process one node: statistics, stopping decision, then either leaf
/// finalization or a four-way fan-out joined before returning.
fn process_region<S>(
    shared: Arc<BuildShared<S>>,
    id: NodeId,
    depth: u32,
) -> Pin<Box<dyn Future<Output = ()> + Send>>
where
    S: PixelSource + 'static,
{
    Box::pin(async move {
        shared.max_depth.fetch_max(depth, Ordering::Relaxed);

        let region = shared.node_region(id);
        let stats = {
            // The permit is dropped before the fan-in await; a parent never
            // holds one while waiting on its children.
            let _permit = shared.limiter.acquire().await.expect("limiter closed");
            region_stats(&shared.source, region)
        };

        if !region.can_split() {
            shared.finish_leaf(id, stats, LeafCause::MinSize);
            return;
        }

        let scalar = shared.config.error_metric.scalar(&stats.error);
        if scalar < shared.config.error_threshold {
            shared.finish_leaf(id, stats, LeafCause::ErrorBelowThreshold);
            return;
        }

        let Some(reserved) = shared.try_reserve_children() else {
            shared.finish_leaf(id, stats, LeafCause::BudgetExhausted);
            return;
        };

        let quarters = region.split();
        let children: [NodeId; 4] = std::array::from_fn(|k| {
            shared.create_node(quarters[k], reserved - 3 + k as u64)
        });

        // The parent's fields are final before any child task exists; a child
        // can never observe a half-written parent.
        shared.finish_internal(id, stats, children);

        let mut tasks = JoinSet::new();
        for child in children {
            tasks.spawn(process_region(shared.clone(), child, depth + 1));
        }
        while let Some(joined) = tasks.join_next().await {
            joined.expect("quadtree task panicked");
        }
    })
}

/// Finalized decomposition: node arena, leaf registry and build statistics.
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: NodeId,
    root_region: Region,
    config: BuildConfig,
    nodes: Vec<Node>,
    leaves: Vec<Leaf>,
    stats: BuildStats,
}

impl QuadTree {
    /// Build the decomposition of `source` under `config`.
    ///
    /// Rejects invalid configuration and zero-area sources before creating
    /// any node. The returned tree is read-only.
    pub async fn build<S>(source: S, config: BuildConfig) -> Result<QuadTree, BuildError>
    where
        S: PixelSource + 'static,
    {
        config.validate()?;

        let (width, height) = (source.width(), source.height());
        if width == 0 || height == 0 {
            return Err(BuildError::EmptyImage { width, height });
        }

        let permits = config
            .max_parallel_tasks
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1);

        let started = Instant::now();
        let shared = Arc::new(BuildShared {
            source,
            config,
            work_used: AtomicU64::new(0),
            max_depth: AtomicU32::new(0),
            nodes: Mutex::new(Vec::new()),
            leaves: Mutex::new(Vec::new()),
            limiter: Semaphore::new(permits),
        });

        // The root consumes the first budget slot; validate() guarantees it.
        let root_region = Region::from_size(width, height);
        let root_index = shared.work_used.fetch_add(1, Ordering::SeqCst) + 1;
        let root = shared.create_node(root_region, root_index);

        process_region(shared.clone(), root, 0).await;

        let shared = Arc::into_inner(shared).expect("all build tasks joined");
        let nodes = shared.nodes.into_inner();
        let leaves = shared.leaves.into_inner();
        let work_used = shared.work_used.into_inner();
        debug_assert_eq!(nodes.len() as u64, work_used);

        let stats = BuildStats {
            elapsed_secs: started.elapsed().as_secs_f64(),
            nodes_created: work_used,
            leaf_count: leaves.len(),
            max_depth: shared.max_depth.into_inner(),
        };
        tracing::debug!(
            nodes = stats.nodes_created,
            leaves = stats.leaf_count,
            max_depth = stats.max_depth,
            elapsed_secs = stats.elapsed_secs,
            "quadtree build finished"
        );

        Ok(QuadTree {
            root,
            root_region,
            config: shared.config,
            nodes,
            leaves,
            stats,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_region(&self) -> Region {
        self.root_region
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Reconstruct the approximation raster from the leaf registry.
    pub fn render(&self) -> Buffer2<Rgba8> {
        render::render(self.root_region, &self.leaves, self.config.background)
    }
}
