use funty::Unsigned;

/// Index of a node inside an index's arena.
pub type NodeId = usize;

/// Every arena starts with its root.
pub const ROOT: NodeId = 0;

/// Longest text either index accepts. Both a represented length and an
/// occurrence count stay below `2^32`, so their product fits in a `u64`.
pub const MAX_TEXT_LEN: usize = u32::MAX as usize;

/// Outgoing transitions of a node, keyed by symbol.
///
/// Kept as a vector sorted by symbol. Nodes over a fixed alphabet have few
/// children, and a sorted layout gives a stable iteration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transitions<T> {
    edges: Vec<(T, NodeId)>,
}

impl<T> Default for Transitions<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

impl<T: Unsigned> Transitions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding a single transition.
    pub fn single(symbol: T, node: NodeId) -> Self {
        Self {
            edges: vec![(symbol, node)],
        }
    }

    #[inline]
    fn search(&self, symbol: T) -> Result<usize, usize> {
        self.edges.binary_search_by(|&(key, _)| key.cmp(&symbol))
    }

    /// Target of the transition on `symbol`, if any.
    #[inline]
    pub fn get(&self, symbol: T) -> Option<NodeId> {
        self.search(symbol).ok().map(|i| self.edges[i].1)
    }

    #[inline]
    pub fn contains(&self, symbol: T) -> bool {
        self.search(symbol).is_ok()
    }

    /// Sets the transition on `symbol`, returning the previous target.
    pub fn insert(&mut self, symbol: T, node: NodeId) -> Option<NodeId> {
        match self.search(symbol) {
            Ok(i) => Some(std::mem::replace(&mut self.edges[i].1, node)),
            Err(i) => {
                self.edges.insert(i, (symbol, node));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate over `(symbol, target)` pairs in increasing symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (T, NodeId)> + '_ {
        self.edges.iter().copied()
    }
}
