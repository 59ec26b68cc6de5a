//! Frontier implementations, one per traversal strategy.
//!
//! The engine only ever talks to `dyn Frontier`; the strategies differ in
//! nothing but the order nodes come back out.

use crate::node::UrlNode;
use crate::score::ScoreOrder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Bfs,
    Dfs,
    BestFirst,
    IterativeDeepening,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Bfs => "breadth-first",
            Strategy::Dfs => "depth-first",
            Strategy::BestFirst => "best-first",
            Strategy::IterativeDeepening => "iterative-deepening",
        }
    }

    /// Builds an empty frontier for this strategy. `order` only matters for
    /// best-first.
    pub fn frontier(&self, order: ScoreOrder) -> Box<dyn Frontier> {
        match self {
            Strategy::Bfs => Box::new(BreadthFirst::default()),
            Strategy::Dfs => Box::new(DepthFirst::default()),
            Strategy::BestFirst => Box::new(BestFirst::new(order)),
            Strategy::IterativeDeepening => Box::new(IterativeDeepening::default()),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Strategy::Bfs),
            "dfs" | "depth-first" => Ok(Strategy::Dfs),
            "best" | "best-first" => Ok(Strategy::BestFirst),
            "ids" | "iddfs" | "iterative-deepening" => Ok(Strategy::IterativeDeepening),
            other => Err(format!("Unknown strategy '{}'", other)),
        }
    }
}

/// What a frontier did with a pushed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pushed {
    Queued,
    /// Held back for a later pass (iterative-deepening only).
    Deferred,
}

pub trait Frontier: Send {
    fn push(&mut self, node: UrlNode) -> Pushed;

    fn pop(&mut self) -> Option<UrlNode>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_pass_exhausted(&self) -> bool {
        self.is_empty()
    }

    /// Called once the frontier runs dry. Returns true when another pass
    /// should start; the caller then resets its visited state and re-pushes
    /// the seed.
    fn next_pass(&mut self) -> bool {
        false
    }

    /// Current depth bound, for frontiers that have one.
    fn depth_bound(&self) -> Option<usize> {
        None
    }
}

#[derive(Debug, Default)]
pub struct BreadthFirst {
    queue: VecDeque<UrlNode>,
}

impl Frontier for BreadthFirst {
    fn push(&mut self, node: UrlNode) -> Pushed {
        self.queue.push_back(node);
        Pushed::Queued
    }

    fn pop(&mut self) -> Option<UrlNode> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Debug, Default)]
pub struct DepthFirst {
    stack: Vec<UrlNode>,
}

impl Frontier for DepthFirst {
    fn push(&mut self, node: UrlNode) -> Pushed {
        self.stack.push(node);
        Pushed::Queued
    }

    fn pop(&mut self) -> Option<UrlNode> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

/// Heap entry ordered so that the best node is the heap maximum.
#[derive(Debug)]
struct Ranked {
    node: UrlNode,
    order: ScoreOrder,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_score = match self.order {
            ScoreOrder::HighestFirst => self.node.score.total_cmp(&other.node.score),
            ScoreOrder::LowestFirst => other.node.score.total_cmp(&self.node.score),
        };
        // Earlier discovery wins ties
        by_score.then_with(|| other.node.discovery_order.cmp(&self.node.discovery_order))
    }
}

#[derive(Debug)]
pub struct BestFirst {
    heap: BinaryHeap<Ranked>,
    order: ScoreOrder,
}

impl BestFirst {
    pub fn new(order: ScoreOrder) -> Self {
        Self {
            heap: BinaryHeap::new(),
            order,
        }
    }
}

impl Frontier for BestFirst {
    fn push(&mut self, node: UrlNode) -> Pushed {
        self.heap.push(Ranked {
            node,
            order: self.order,
        });
        Pushed::Queued
    }

    fn pop(&mut self) -> Option<UrlNode> {
        self.heap.pop().map(|ranked| ranked.node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Depth-bounded LIFO passes with a bound that grows by one each pass.
#[derive(Debug, Default)]
pub struct IterativeDeepening {
    stack: Vec<UrlNode>,
    bound: usize,
    deferred: usize,
}

impl IterativeDeepening {
    /// Nodes held back during the current pass.
    pub fn deferred(&self) -> usize {
        self.deferred
    }
}

impl Frontier for IterativeDeepening {
    fn push(&mut self, node: UrlNode) -> Pushed {
        if node.depth > self.bound {
            self.deferred += 1;
            return Pushed::Deferred;
        }
        self.stack.push(node);
        Pushed::Queued
    }

    fn pop(&mut self) -> Option<UrlNode> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn next_pass(&mut self) -> bool {
        if self.deferred == 0 {
            return false;
        }
        self.stack.clear();
        self.deferred = 0;
        self.bound += 1;
        true
    }

    fn depth_bound(&self) -> Option<usize> {
        Some(self.bound)
    }
}
