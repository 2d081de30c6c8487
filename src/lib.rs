//! Suffix automata and suffix trees over a fixed alphabet, and the refrain
//! they reveal: the substring maximizing `length × occurrences`.
//!
//! ```rust
//! use refrain::{Refrain, SuffixTree};
//!
//! let tree = SuffixTree::new(&[1u32, 2, 1, 3, 1, 2, 1, 3, 1]).unwrap();
//! let refrain = Refrain::find(&tree).unwrap();
//! assert_eq!(refrain.value, 10);
//! assert_eq!(refrain.substring, vec![1, 2, 1, 3, 1]);
//! ```

pub mod automaton;
pub mod codec;
pub mod cursor;
pub mod dot;
pub mod loader;
pub mod node;
pub mod refrain;
pub mod tree;
pub mod util;

pub use automaton::{AutomatonCursor, SuffixAutomaton};
pub use codec::Problem;
pub use cursor::{contains, count, locate, Cursor, SuffixIndex};
pub use node::{NodeId, MAX_TEXT_LEN};
pub use refrain::{best_cursor, select_refrain, Refrain};
pub use tree::{SuffixTree, TreeCursor};
