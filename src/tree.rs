use std::ops::Range;

use anyhow::{bail, ensure, Result};
use funty::Unsigned;
use log::debug;

use crate::cursor::{Cursor, SuffixIndex};
use crate::node::{NodeId, Transitions, MAX_TEXT_LEN, ROOT};
use crate::util::order_by_decreasing_key;

/// End of an edge label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum End {
    Closed(usize),
    /// Leaf edges grow with the text.
    Open,
}

#[derive(Clone, Debug)]
struct Node<T> {
    /// Where the root-to-node string starts in the text.
    start: usize,
    /// Where the label of the edge from `parent` starts.
    edge_start: usize,
    end: End,
    /// Resolved lazily. The root links to itself.
    suffix_link: Option<NodeId>,
    parent: NodeId,
    /// Children keyed by the first symbol of their edge label.
    transitions: Transitions<T>,
}

/// A node together with an absolute text position on the edge leading into
/// it. The point is on the node itself when `pos` is the edge's end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Point {
    node: NodeId,
    pos: usize,
}

/// A suffix tree built with Ukkonen's algorithm.
///
/// The text is terminated with the sentinel `T::MAX` so that every suffix
/// ends at its own leaf. The sentinel is never part of a reported substring,
/// and texts containing it are rejected.
///
/// # Example
///
/// ```rust
/// use refrain::{count, SuffixTree};
///
/// let tree = SuffixTree::new(b"mississippi").unwrap();
/// assert_eq!(count(&tree, b"ssi"), 2);
/// assert_eq!(count(&tree, b"i"), 4);
/// ```
#[derive(Clone, Debug)]
pub struct SuffixTree<T = u32> {
    nodes: Vec<Node<T>>,
    /// The text followed by the sentinel once construction completes.
    text: Vec<T>,
    /// Length of the text without the sentinel.
    len: usize,
    /// End of the longest suffix that is not a leaf yet.
    last_not_leaf: Point,
    /// Occurrences per node, computed by `calculate`.
    occurrences: Option<Vec<u64>>,
}

impl<T: Unsigned> SuffixTree<T> {
    /// Builds the suffix tree of `text` and computes occurrence counts.
    pub fn new(text: &[T]) -> Result<Self> {
        ensure!(
            text.len() <= MAX_TEXT_LEN,
            "text of {} symbols exceeds the maximum of {}",
            text.len(),
            MAX_TEXT_LEN
        );
        if let Some(position) = text.iter().position(|&symbol| symbol == T::MAX) {
            bail!(
                "symbol at position {} is the reserved sentinel {:?}",
                position,
                T::MAX
            );
        }

        let mut tree = SuffixTree {
            nodes: Vec::with_capacity(2 * text.len() + 2),
            text: Vec::with_capacity(text.len() + 1),
            len: text.len(),
            last_not_leaf: Point { node: ROOT, pos: 0 },
            occurrences: None,
        };
        tree.nodes.push(Node {
            start: 0,
            edge_start: 0,
            end: End::Closed(0),
            suffix_link: Some(ROOT),
            parent: ROOT,
            transitions: Transitions::new(),
        });

        for &symbol in text {
            tree.push(symbol);
        }
        tree.push(T::MAX);
        tree.calculate();

        debug!(
            "built suffix tree: {} symbols, {} nodes",
            tree.len,
            tree.nodes.len()
        );
        Ok(tree)
    }

    #[inline]
    fn end(&self, node: NodeId) -> usize {
        match self.nodes[node].end {
            End::Closed(end) => end,
            End::Open => self.text.len(),
        }
    }

    #[inline]
    fn at_node(&self, node: NodeId) -> Point {
        Point {
            node,
            pos: self.end(node),
        }
    }

    #[inline]
    fn is_on_node(&self, point: Point) -> bool {
        point.pos == self.end(point.node)
    }

    fn has_transition(&self, point: Point, symbol: T) -> bool {
        if self.is_on_node(point) {
            return self.nodes[point.node].transitions.contains(symbol);
        }
        point.pos < self.text.len() && self.text[point.pos] == symbol
    }

    /// Move one symbol down from `point`.
    ///
    /// # Panics
    ///
    /// Panics when the tree does not continue with `symbol` at `point`.
    fn descend(&self, point: Point, symbol: T) -> Point {
        if self.is_on_node(point) {
            let child = self.nodes[point.node]
                .transitions
                .get(symbol)
                .unwrap_or_else(|| {
                    panic!("node {} has no transition on {:?}", point.node, symbol)
                });
            return Point {
                node: child,
                pos: self.nodes[child].edge_start + 1,
            };
        }

        assert!(
            self.has_transition(point, symbol),
            "edge into node {} does not continue with {:?} at {}",
            point.node,
            symbol,
            point.pos
        );
        Point {
            node: point.node,
            pos: point.pos + 1,
        }
    }

    /// Walk `text[from..to]` down from `point`, skipping whole edges without
    /// comparing their symbols. Returns `None` if the walk falls off the tree.
    fn advance(&self, mut point: Point, from: usize, to: usize) -> Option<Point> {
        let mut i = from;
        while i < to {
            if self.is_on_node(point) {
                if !self.has_transition(point, self.text[i]) {
                    return None;
                }
                point = self.descend(point, self.text[i]);
                i += 1;
                continue;
            }

            let rest = self.end(point.node) - point.pos;
            if to - i < rest {
                return Some(Point {
                    node: point.node,
                    pos: point.pos + to - i,
                });
            }
            i += rest;
            point.pos += rest;
        }
        Some(point)
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Make `point` an explicit node, splitting its edge if needed.
    fn split(&mut self, point: Point) -> NodeId {
        if self.is_on_node(point) {
            return point.node;
        }

        // parent ---- middle ---- below
        let below = point.node;
        let Node {
            start,
            edge_start,
            parent,
            ..
        } = self.nodes[below];
        let middle = self.alloc(Node {
            start,
            edge_start,
            end: End::Closed(point.pos),
            suffix_link: None,
            parent,
            transitions: Transitions::single(self.text[point.pos], below),
        });

        self.nodes[below].parent = middle;
        self.nodes[below].edge_start = point.pos;
        self.nodes[parent]
            .transitions
            .insert(self.text[edge_start], middle);
        middle
    }

    /// Suffix link of `node`, resolving it and any unresolved ancestors first.
    fn suffix_link(&mut self, node: NodeId) -> NodeId {
        if let Some(link) = self.nodes[node].suffix_link {
            return link;
        }

        let mut pending = vec![node];
        while let Some(&current) = pending.last() {
            if self.nodes[current].suffix_link.is_some() {
                pending.pop();
                continue;
            }

            let parent = self.nodes[current].parent;
            if self.nodes[parent].suffix_link.is_none() {
                pending.push(parent);
            } else {
                self.resolve_link(current);
                pending.pop();
            }
        }

        match self.nodes[node].suffix_link {
            Some(link) => link,
            None => unreachable!("suffix link of node {} left unresolved", node),
        }
    }

    /// Resolve the link of a node whose parent link is already known: follow
    /// the parent's link, then re-read the edge label below it.
    fn resolve_link(&mut self, node: NodeId) {
        let parent = self.nodes[node].parent;
        let parent_link = match self.nodes[parent].suffix_link {
            Some(link) => link,
            None => unreachable!("parent {} of node {} has no suffix link", parent, node),
        };

        // Below the root the first symbol of the label is the one dropped.
        let from = self.nodes[node].edge_start + usize::from(parent == ROOT);
        let to = self.end(node);
        let point = self
            .advance(self.at_node(parent_link), from, to)
            .unwrap_or_else(|| panic!("suffix link walk of node {} fell off the tree", node));

        let link = self.split(point);
        self.nodes[node].suffix_link = Some(link);
    }

    /// Ukkonen's update for one appended symbol.
    fn push(&mut self, symbol: T) {
        self.text.push(symbol);
        loop {
            let active = self.last_not_leaf;
            if self.has_transition(active, symbol) {
                self.last_not_leaf = self.descend(active, symbol);
                break;
            }

            let parent = self.split(active);
            let depth = self.end(parent) - self.nodes[parent].start;
            let leaf = self.alloc(Node {
                start: self.text.len() - 1 - depth,
                edge_start: self.text.len() - 1,
                end: End::Open,
                suffix_link: None,
                parent,
                transitions: Transitions::new(),
            });
            self.nodes[parent].transitions.insert(symbol, leaf);

            let link = self.suffix_link(parent);
            self.last_not_leaf = self.at_node(link);
            if parent == ROOT {
                break;
            }
        }
    }

    /// Resolve every suffix link and count the leaves below every node.
    fn calculate(&mut self) {
        if self.occurrences.is_some() {
            return;
        }

        let mut node = 0;
        while node < self.nodes.len() {
            self.suffix_link(node);
            node += 1;
        }

        let mut counts: Vec<u64> = self
            .nodes
            .iter()
            .map(|node| u64::from(node.end == End::Open))
            .collect();

        // Depths including the sentinel strictly grow from parent to child.
        let depths: Vec<usize> = (0..self.nodes.len())
            .map(|node| self.end(node) - self.nodes[node].start)
            .collect();
        for node in order_by_decreasing_key(&depths) {
            if node != ROOT {
                counts[self.nodes[node].parent] += counts[node];
            }
        }
        self.occurrences = Some(counts);
    }

    fn cursor(&self, node: NodeId) -> TreeCursor<'_, T> {
        TreeCursor {
            tree: self,
            point: self.at_node(node),
        }
    }

    /// Number of leaves, one per suffix of the sentinel-terminated text.
    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.end == End::Open)
            .count()
    }
}

impl<T: Unsigned> SuffixIndex<T> for SuffixTree<T> {
    type Cursor<'a> = TreeCursor<'a, T> where Self: 'a;
    type Cursors<'a> = TreeCursors<'a, T> where Self: 'a;

    fn root(&self) -> TreeCursor<'_, T> {
        self.cursor(ROOT)
    }

    fn cursors(&self) -> TreeCursors<'_, T> {
        TreeCursors {
            tree: self,
            next: ROOT,
        }
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn text(&self) -> &[T] {
        &self.text[..self.len]
    }

    fn is_finalized(&self) -> bool {
        self.occurrences.is_some()
    }
}

/// A node or a position inside an edge of a [`SuffixTree`].
#[derive(Clone, Copy, Debug)]
pub struct TreeCursor<'a, T> {
    tree: &'a SuffixTree<T>,
    point: Point,
}

impl<'a, T: Unsigned> TreeCursor<'a, T> {
    /// Offsets of the label of the edge leading into this cursor's node.
    pub fn edge(&self) -> Range<usize> {
        let tree = self.tree;
        tree.nodes[self.point.node].edge_start..tree.end(self.point.node)
    }

    /// Whether this cursor sits on a leaf.
    pub fn is_leaf(&self) -> bool {
        self.is_node() && self.tree.nodes[self.point.node].end == End::Open
    }
}

impl<'a, T: Unsigned> Cursor<T> for TreeCursor<'a, T> {
    fn id(&self) -> NodeId {
        self.point.node
    }

    fn is_node(&self) -> bool {
        self.tree.is_on_node(self.point)
    }

    /// The sentinel is never a transition.
    fn has_transition(&self, symbol: T) -> bool {
        symbol != T::MAX && self.tree.has_transition(self.point, symbol)
    }

    fn move_by(&mut self, symbol: T) {
        if self.has_transition(symbol) {
            self.point = self.tree.descend(self.point, symbol);
            return;
        }
        assert!(
            self.is_node(),
            "no transition on {:?} inside the edge into node {}",
            symbol,
            self.point.node
        );
        self.move_to_suffix_link();
    }

    fn suffix_link(&self) -> Option<Self> {
        assert!(
            self.is_node(),
            "suffix links are only defined on nodes, not inside the edge into node {}",
            self.point.node
        );
        if self.point.node == ROOT {
            return None;
        }
        match self.tree.nodes[self.point.node].suffix_link {
            Some(link) => Some(self.tree.cursor(link)),
            None => unreachable!("suffix link of node {} left unresolved", self.point.node),
        }
    }

    fn children(&self) -> Vec<(T, Self)> {
        if !self.is_node() {
            let symbol = self.tree.text[self.point.pos];
            return vec![(symbol, self.tree.cursor(self.point.node))];
        }
        self.tree.nodes[self.point.node]
            .transitions
            .iter()
            .map(|(symbol, child)| (symbol, self.tree.cursor(child)))
            .collect()
    }

    /// The whole edge label, sentinel included.
    fn edge_label(&self) -> Option<Vec<T>> {
        Some(self.tree.text[self.edge()].to_vec())
    }

    /// Excludes the sentinel position, never a real symbol.
    fn len(&self) -> usize {
        self.point.pos.min(self.tree.len) - self.tree.nodes[self.point.node].start
    }

    fn slice(&self) -> Range<usize> {
        let start = self.tree.nodes[self.point.node].start;
        start..start + self.len()
    }

    fn occurrences(&self) -> u64 {
        self.tree
            .occurrences
            .as_ref()
            .map_or(0, |counts| counts[self.point.node])
    }
}

/// Cursors on every node of a [`SuffixTree`], in creation order.
#[derive(Clone, Debug)]
pub struct TreeCursors<'a, T> {
    tree: &'a SuffixTree<T>,
    next: NodeId,
}

impl<'a, T: Unsigned> Iterator for TreeCursors<'a, T> {
    type Item = TreeCursor<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.tree.nodes.len() {
            return None;
        }
        let cursor = self.tree.cursor(self.next);
        self.next += 1;
        Some(cursor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tree.nodes.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
