use anyhow::{ensure, Result};
use funty::Unsigned;
use serde::{Deserialize, Serialize};

use crate::cursor::{Cursor, SuffixIndex};

/// The substring maximizing `length × occurrences`, with that maximum.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Refrain<T = u32> {
    pub substring: Vec<T>,
    pub value: u64,
}

impl<T: Unsigned> Refrain<T> {
    /// Computes the refrain of a finalized index.
    ///
    /// # Example
    ///
    /// ```rust
    /// use refrain::{Refrain, SuffixAutomaton, SuffixTree};
    ///
    /// let automaton = SuffixAutomaton::from_text(b"aaaa").unwrap();
    /// let refrain = Refrain::find(&automaton).unwrap();
    /// assert_eq!(refrain.substring, b"aa");
    /// assert_eq!(refrain.value, 6);
    ///
    /// let tree = SuffixTree::new(b"aaaa").unwrap();
    /// assert_eq!(Refrain::find(&tree).unwrap().value, 6);
    /// ```
    pub fn find<I: SuffixIndex<T>>(index: &I) -> Result<Self> {
        let best = best_cursor(index)?;
        Ok(Refrain {
            substring: index.text()[best.slice()].to_vec(),
            value: best.score(),
        })
    }

    pub fn len(&self) -> usize {
        self.substring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substring.is_empty()
    }
}

/// Shorthand for [`Refrain::find`].
pub fn select_refrain<T, I>(index: &I) -> Result<Refrain<T>>
where
    T: Unsigned,
    I: SuffixIndex<T>,
{
    Refrain::find(index)
}

/// The first node, in iteration order, with the highest `len × occurrences`.
///
/// The root scores 0, so it only wins when no substring scores higher.
pub fn best_cursor<T, I>(index: &I) -> Result<I::Cursor<'_>>
where
    T: Unsigned,
    I: SuffixIndex<T>,
{
    ensure!(
        index.is_finalized(),
        "occurrence counts have not been computed for this index"
    );

    let mut best = index.root();
    let mut best_score = best.score();
    for cursor in index.cursors() {
        let score = cursor.score();
        if score > best_score {
            best = cursor;
            best_score = score;
        }
    }
    Ok(best)
}
