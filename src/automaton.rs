use std::ops::Range;

use anyhow::{bail, ensure, Result};
use funty::Unsigned;
use log::debug;

use crate::cursor::{Cursor, SuffixIndex};
use crate::node::{NodeId, Transitions, MAX_TEXT_LEN, ROOT};
use crate::util::order_by_decreasing_key;

#[derive(Clone, Debug)]
struct Node<T> {
    /// `None` only for the root.
    suffix_link: Option<NodeId>,
    /// Length of the longest substring of this state.
    len: usize,
    /// Exclusive end of the first occurrence of that substring.
    first_end: usize,
    transitions: Transitions<T>,
}

impl<T: Unsigned> Node<T> {
    fn root() -> Self {
        Node {
            suffix_link: None,
            len: 0,
            first_end: 0,
            transitions: Transitions::new(),
        }
    }

    /// Whether the node was created for a prefix of the text rather than
    /// cloned. Clones are shorter than the node they were split from but
    /// inherit its first end.
    #[inline]
    fn is_prefix_state(&self) -> bool {
        self.len > 0 && self.first_end == self.len
    }
}

/// A suffix automaton built online, one symbol at a time.
///
/// Paths from the root spell exactly the substrings of the text. Each state
/// groups the substrings that share the same set of ending positions.
///
/// # Example
///
/// ```rust
/// use refrain::{count, SuffixAutomaton};
///
/// let mut automaton = SuffixAutomaton::new();
/// automaton.extend(*b"abcbc").unwrap();
/// automaton.finalize();
///
/// assert_eq!(count(&automaton, b"bc"), 2);
/// assert_eq!(count(&automaton, b"cc"), 0);
/// ```
#[derive(Clone, Debug)]
pub struct SuffixAutomaton<T = u32> {
    nodes: Vec<Node<T>>,
    text: Vec<T>,
    /// State of the whole text seen so far.
    last: NodeId,
    /// Occurrences per node, computed by `finalize`.
    occurrences: Option<Vec<u64>>,
}

impl<T: Unsigned> Default for SuffixAutomaton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Unsigned> SuffixAutomaton<T> {
    /// Creates an automaton holding only the root.
    pub fn new() -> Self {
        SuffixAutomaton {
            nodes: vec![Node::root()],
            text: Vec::new(),
            last: ROOT,
            occurrences: None,
        }
    }

    /// Builds and finalizes the automaton of `text` in `O(n)` amortized time.
    pub fn from_text(text: &[T]) -> Result<Self> {
        ensure!(
            text.len() <= MAX_TEXT_LEN,
            "text of {} symbols exceeds the maximum of {}",
            text.len(),
            MAX_TEXT_LEN
        );

        let mut automaton = Self::new();
        automaton.nodes.reserve(2 * text.len());
        automaton.text.reserve(text.len());
        automaton.extend(text.iter().copied())?;
        automaton.finalize();
        Ok(automaton)
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, symbols: I) -> Result<()> {
        for symbol in symbols {
            self.append(symbol)?;
        }
        Ok(())
    }

    /// Extends the automaton by one symbol.
    ///
    /// Fails once the automaton is finalized.
    pub fn append(&mut self, symbol: T) -> Result<()> {
        if self.is_finalized() {
            bail!("cannot append to a finalized suffix automaton");
        }
        ensure!(
            self.text.len() < MAX_TEXT_LEN,
            "text exceeds the maximum of {} symbols",
            MAX_TEXT_LEN
        );

        self.text.push(symbol);
        let len = self.nodes[self.last].len + 1;
        let current = self.alloc(Node {
            suffix_link: Some(ROOT),
            len,
            first_end: len,
            transitions: Transitions::new(),
        });

        let mut walk = Some(self.last);
        let link = loop {
            let Some(node) = walk else {
                break ROOT;
            };
            match self.nodes[node].transitions.get(symbol) {
                Some(next) if self.nodes[next].len == self.nodes[node].len + 1 => break next,
                Some(next) => break self.clone_node(next, node, symbol),
                None => {
                    self.nodes[node].transitions.insert(symbol, current);
                    walk = self.nodes[node].suffix_link;
                }
            }
        };

        self.nodes[current].suffix_link = Some(link);
        self.last = current;
        Ok(())
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Split `target` so that the transition from `from` on `symbol` leads to a
    /// state of length `from.len + 1`. Returns the clone.
    fn clone_node(&mut self, target: NodeId, from: NodeId, symbol: T) -> NodeId {
        let clone = self.alloc(Node {
            len: self.nodes[from].len + 1,
            ..self.nodes[target].clone()
        });
        self.nodes[target].suffix_link = Some(clone);

        let mut walk = Some(from);
        while let Some(node) = walk {
            if self.nodes[node].transitions.get(symbol) != Some(target) {
                break;
            }
            self.nodes[node].transitions.insert(symbol, clone);
            walk = self.nodes[node].suffix_link;
        }
        clone
    }

    /// Computes the occurrence count of every node. Later calls do nothing.
    ///
    /// Every prefix state marks one ending position. A node's count is the
    /// number of marks in its subtree of the suffix-link tree, summed with
    /// longer nodes first so children settle before their link target.
    pub fn finalize(&mut self) {
        if self.occurrences.is_some() {
            return;
        }

        let mut counts: Vec<u64> = self
            .nodes
            .iter()
            .map(|node| u64::from(node.is_prefix_state()))
            .collect();

        let lengths: Vec<usize> = self.nodes.iter().map(|node| node.len).collect();
        for node in order_by_decreasing_key(&lengths) {
            if let Some(link) = self.nodes[node].suffix_link {
                counts[link] += counts[node];
            }
        }

        debug!(
            "finalized suffix automaton: {} symbols, {} nodes",
            self.text.len(),
            self.nodes.len()
        );
        self.occurrences = Some(counts);
    }

    /// Cursor at the state of the whole text.
    pub fn full_string(&self) -> AutomatonCursor<'_, T> {
        self.cursor(self.last)
    }

    fn cursor(&self, node: NodeId) -> AutomatonCursor<'_, T> {
        AutomatonCursor {
            automaton: self,
            node,
        }
    }
}

impl<T: Unsigned> SuffixIndex<T> for SuffixAutomaton<T> {
    type Cursor<'a> = AutomatonCursor<'a, T> where Self: 'a;
    type Cursors<'a> = AutomatonCursors<'a, T> where Self: 'a;

    fn root(&self) -> AutomatonCursor<'_, T> {
        self.cursor(ROOT)
    }

    fn cursors(&self) -> AutomatonCursors<'_, T> {
        AutomatonCursors {
            automaton: self,
            next: ROOT,
        }
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn text(&self) -> &[T] {
        &self.text
    }

    fn is_finalized(&self) -> bool {
        self.occurrences.is_some()
    }
}

/// A state of a [`SuffixAutomaton`].
#[derive(Clone, Copy, Debug)]
pub struct AutomatonCursor<'a, T> {
    automaton: &'a SuffixAutomaton<T>,
    node: NodeId,
}

impl<'a, T: Unsigned> AutomatonCursor<'a, T> {
    #[inline]
    fn get(&self) -> &'a Node<T> {
        &self.automaton.nodes[self.node]
    }
}

impl<'a, T: Unsigned> Cursor<T> for AutomatonCursor<'a, T> {
    fn id(&self) -> NodeId {
        self.node
    }

    fn is_node(&self) -> bool {
        true
    }

    fn has_transition(&self, symbol: T) -> bool {
        self.get().transitions.contains(symbol)
    }

    fn move_by(&mut self, symbol: T) {
        let node = self.get();
        if let Some(next) = node.transitions.get(symbol).or(node.suffix_link) {
            self.node = next;
        }
    }

    fn suffix_link(&self) -> Option<Self> {
        self.get().suffix_link.map(|link| self.automaton.cursor(link))
    }

    fn children(&self) -> Vec<(T, Self)> {
        self.get()
            .transitions
            .iter()
            .map(|(symbol, next)| (symbol, self.automaton.cursor(next)))
            .collect()
    }

    fn len(&self) -> usize {
        self.get().len
    }

    fn slice(&self) -> Range<usize> {
        let node = self.get();
        node.first_end - node.len..node.first_end
    }

    fn occurrences(&self) -> u64 {
        self.automaton
            .occurrences
            .as_ref()
            .map_or(0, |counts| counts[self.node])
    }
}

/// Cursors over every state of a [`SuffixAutomaton`], in creation order.
#[derive(Clone, Debug)]
pub struct AutomatonCursors<'a, T> {
    automaton: &'a SuffixAutomaton<T>,
    next: NodeId,
}

impl<'a, T: Unsigned> Iterator for AutomatonCursors<'a, T> {
    type Item = AutomatonCursor<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.automaton.nodes.len() {
            return None;
        }
        let cursor = self.automaton.cursor(self.next);
        self.next += 1;
        Some(cursor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.automaton.nodes.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automaton(text: &str) -> SuffixAutomaton<u8> {
        SuffixAutomaton::from_text(text.as_bytes()).unwrap()
    }

    fn naive_count(text: &[u8], pattern: &[u8]) -> u64 {
        text.windows(pattern.len()).filter(|w| *w == pattern).count() as u64
    }

    #[test]
    fn empty_has_only_root() {
        let sa = automaton("");
        assert_eq!(sa.num_nodes(), 1);
        assert!(sa.is_finalized());
        assert_eq!(sa.root().len(), 0);
        assert!(sa.root().suffix_link().is_none());
    }

    #[test]
    fn node_count_is_linear() {
        // A suffix automaton of n > 2 symbols never has more than 2n - 1 states.
        let sa = automaton("abbbabbabbaaabbbab");
        assert!(sa.num_nodes() <= 2 * sa.text().len() - 1);
    }

    #[test]
    fn clone_on_split() {
        // "abb": appending the second b splits the state of "ab" and "b".
        let sa = automaton("abb");
        assert_eq!(sa.num_nodes(), 5);

        let b = sa.root().children().into_iter().find(|(s, _)| *s == b'b').unwrap().1;
        assert_eq!(b.len(), 1);
        assert_eq!(b.occurrences(), 2);
        assert_eq!(b.suffix_link().unwrap().id(), ROOT);
    }

    #[test]
    fn lengths_decrease_along_suffix_links() {
        let sa = automaton("mississippi");
        for cursor in sa.cursors() {
            if let Some(link) = cursor.suffix_link() {
                assert!(link.len() < cursor.len());
            }
        }
    }

    #[test]
    fn occurrences_match_naive() {
        let text = b"abracadabra";
        let sa = SuffixAutomaton::from_text(text).unwrap();
        for cursor in sa.cursors().skip(1) {
            let substring = &text[cursor.slice()];
            assert_eq!(cursor.occurrences(), naive_count(text, substring), "{:?}", substring);
        }
    }

    #[test]
    fn states_off_the_terminal_chain_are_counted() {
        // "a" is not a suffix of "ab", so its state only counts through its
        // own prefix mark.
        let sa = automaton("ab");
        let a = sa.root().children().into_iter().find(|(s, _)| *s == b'a').unwrap().1;
        assert_eq!(a.len(), 1);
        assert_eq!(a.occurrences(), 1);
        assert_eq!(sa.full_string().occurrences(), 1);
    }

    #[test]
    fn full_string_chain() {
        let sa = automaton("abab");
        let mut cursor = sa.full_string();
        let mut lengths = vec![cursor.len()];
        while let Some(link) = cursor.suffix_link() {
            cursor = link;
            lengths.push(cursor.len());
        }
        assert_eq!(lengths, vec![4, 2, 0]);
    }

    #[test]
    fn append_after_finalize_fails() {
        let mut sa = automaton("ab");
        assert!(sa.append(b'c').is_err());
        assert_eq!(sa.text(), b"ab");
    }

    #[test]
    fn finalize_twice_is_noop() {
        let mut sa = SuffixAutomaton::<u8>::new();
        sa.extend(*b"aabaa").unwrap();
        assert!(!sa.is_finalized());
        assert_eq!(sa.root().children()[0].1.occurrences(), 0);

        sa.finalize();
        let before: Vec<u64> = sa.cursors().map(|c| c.occurrences()).collect();
        sa.finalize();
        let after: Vec<u64> = sa.cursors().map(|c| c.occurrences()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn move_by_falls_back_to_suffix_link() {
        let sa = automaton("ab");
        let mut cursor = sa.root();
        cursor.move_by(b'a');
        cursor.move_by(b'b');
        assert_eq!(cursor.len(), 2);

        // No transition on 'a' from "ab": fall through to the link of "ab".
        cursor.move_by(b'a');
        assert_eq!(cursor.id(), ROOT);

        // The root has no link and stays put.
        cursor.move_by(b'z');
        assert_eq!(cursor.id(), ROOT);
    }
}
