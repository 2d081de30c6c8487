use std::ops::Range;

use funty::Unsigned;

use crate::node::NodeId;

/// A position inside a finalized index.
///
/// Cursors are cheap copies that borrow their index. Automaton cursors always
/// sit on a node; suffix-tree cursors may also sit inside an edge.
pub trait Cursor<T: Unsigned>: Copy {
    /// Id of the node the cursor sits on, or of the node below it when the
    /// cursor is inside an edge.
    fn id(&self) -> NodeId;

    /// Whether the cursor sits exactly on a node.
    fn is_node(&self) -> bool;

    fn has_transition(&self, symbol: T) -> bool;

    /// Follow the transition on `symbol`. On a node without one, fall through
    /// to the suffix link instead; the root stays where it is.
    ///
    /// # Panics
    ///
    /// Panics when the cursor is inside an edge that does not continue with
    /// `symbol`.
    fn move_by(&mut self, symbol: T);

    /// Cursor at the suffix link of this node, `None` at the root.
    ///
    /// # Panics
    ///
    /// Panics when the cursor is inside an edge.
    fn suffix_link(&self) -> Option<Self>;

    /// Outgoing transitions of this node, with a cursor at each target node.
    fn children(&self) -> Vec<(T, Self)>;

    /// Length of the longest substring represented at this position.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offsets of one occurrence of that substring in the indexed text.
    fn slice(&self) -> Range<usize>;

    /// Number of positions of the text at which the substring occurs.
    fn occurrences(&self) -> u64;

    /// `len × occurrences`.
    fn score(&self) -> u64 {
        let (len, occurrences) = (self.len() as u64, self.occurrences());
        debug_assert!(len.checked_mul(occurrences).is_some());
        len * occurrences
    }

    /// Symbols on the edge entering this node, when the index stores edges
    /// as text ranges. `None` means the edge carries a single symbol.
    fn edge_label(&self) -> Option<Vec<T>> {
        None
    }

    fn move_to_suffix_link(&mut self) {
        if let Some(link) = self.suffix_link() {
            *self = link;
        }
    }
}

/// An index over a single text whose nodes can be enumerated with cursors.
pub trait SuffixIndex<T: Unsigned> {
    type Cursor<'a>: Cursor<T>
    where
        Self: 'a;

    type Cursors<'a>: Iterator<Item = Self::Cursor<'a>>
    where
        Self: 'a;

    fn root(&self) -> Self::Cursor<'_>;

    /// One cursor per node, in node-creation order. The root comes first.
    fn cursors(&self) -> Self::Cursors<'_>;

    fn num_nodes(&self) -> usize;

    /// The indexed text.
    fn text(&self) -> &[T];

    /// Whether occurrence counts have been computed.
    fn is_finalized(&self) -> bool;
}

/// Walk `pattern` from the root, following transitions only.
pub fn locate<'a, T, I>(index: &'a I, pattern: &[T]) -> Option<I::Cursor<'a>>
where
    T: Unsigned,
    I: SuffixIndex<T>,
{
    let mut cursor = index.root();
    for &symbol in pattern {
        if !cursor.has_transition(symbol) {
            return None;
        }
        cursor.move_by(symbol);
    }
    Some(cursor)
}

/// Returns true if and only if `pattern` is a non-empty substring of the text.
pub fn contains<T, I>(index: &I, pattern: &[T]) -> bool
where
    T: Unsigned,
    I: SuffixIndex<T>,
{
    !pattern.is_empty() && locate(index, pattern).is_some()
}

/// Number of positions at which `pattern` starts in the text.
///
/// The empty pattern is never counted.
pub fn count<T, I>(index: &I, pattern: &[T]) -> u64
where
    T: Unsigned,
    I: SuffixIndex<T>,
{
    if pattern.is_empty() {
        return 0;
    }
    locate(index, pattern).map_or(0, |cursor| cursor.occurrences())
}
