extern crate quickcheck;

use std::collections::HashMap;

use quickcheck::{QuickCheck, TestResult, Testable};
use rand::Rng;
use refrain::codec::{decode, encode};
use refrain::{
    best_cursor, count, select_refrain, Cursor, Refrain, SuffixAutomaton, SuffixIndex, SuffixTree,
    TreeCursor,
};

fn automaton(text: &[u8]) -> SuffixAutomaton<u8> {
    SuffixAutomaton::from_text(text).unwrap()
}

fn tree(text: &[u8]) -> SuffixTree<u8> {
    SuffixTree::new(text).unwrap()
}

/// Squash arbitrary bytes onto a small alphabet so that repeats are common.
fn small_alphabet(bytes: &[u8], size: u8) -> Vec<u8> {
    bytes.iter().map(|b| b % size).collect()
}

/// Occurrences of every non-empty substring.
fn naive_counts(text: &[u8]) -> HashMap<&[u8], u64> {
    let mut counts = HashMap::new();
    for i in 0..text.len() {
        for j in i + 1..=text.len() {
            *counts.entry(&text[i..j]).or_insert(0) += 1;
        }
    }
    counts
}

fn naive_refrain_value(text: &[u8]) -> u64 {
    naive_counts(text)
        .into_iter()
        .map(|(substring, count)| substring.len() as u64 * count)
        .max()
        .unwrap_or(0)
}

fn qc<T: Testable>(f: T) {
    QuickCheck::new().tests(1000).max_tests(10000).quickcheck(f);
}

// These tests assume the correctness of the naive substring counts. (They
// are only a couple lines of code and probably difficult to get wrong.)

#[test]
fn empty_is_ok() {
    for refrain in [Refrain::find(&automaton(b"")), Refrain::find(&tree(b""))] {
        let refrain = refrain.unwrap();
        assert_eq!(refrain.value, 0);
        assert!(refrain.substring.is_empty());
    }
}

#[test]
fn unary_is_ok() {
    assert_eq!(Refrain::find(&automaton(b"aaaa")).unwrap().value, 6);
    assert_eq!(Refrain::find(&tree(b"aaaa")).unwrap().value, 6);
    assert_eq!(naive_refrain_value(b"aaaa"), 6);
}

#[test]
fn abcabc_is_ok() {
    let expected = naive_refrain_value(b"abcabc");
    assert_eq!(expected, 6);
    assert_eq!(Refrain::find(&automaton(b"abcabc")).unwrap().value, expected);
    assert_eq!(Refrain::find(&tree(b"abcabc")).unwrap().value, expected);
}

#[test]
fn basic_texts() {
    for text in [
        "apple",
        "banana",
        "mississippi",
        "tgtgtgtgcaccg",
        "abracadabra",
        "abcabxabcd",
        "aabaabaaab",
    ] {
        let expected = naive_refrain_value(text.as_bytes());
        let a = Refrain::find(&automaton(text.as_bytes())).unwrap();
        let t = Refrain::find(&tree(text.as_bytes())).unwrap();
        assert_eq!(a.value, expected, "automaton on {}", text);
        assert_eq!(t.value, expected, "tree on {}", text);
    }
}

#[test]
fn select_refrain_matches_find() {
    for text in ["", "aaaa", "abracadabra", "tgtgtgtgcaccg"] {
        let sa = automaton(text.as_bytes());
        let st = tree(text.as_bytes());
        assert_eq!(select_refrain(&sa).unwrap(), Refrain::find(&sa).unwrap());
        assert_eq!(select_refrain(&st).unwrap(), Refrain::find(&st).unwrap());
    }
}

#[test]
fn deterministic_winner() {
    let first = Refrain::find(&tree(b"abcabc")).unwrap();
    for _ in 0..10 {
        assert_eq!(Refrain::find(&tree(b"abcabc")).unwrap(), first);
    }
}

#[test]
fn random_large_texts_agree() {
    let mut rng = rand::thread_rng();
    for size in [1_000, 10_000, 50_000] {
        let text: Vec<u32> = (0..size).map(|_| rng.gen_range(1..=3)).collect();
        let a = Refrain::find(&SuffixAutomaton::from_text(&text).unwrap()).unwrap();
        let t = Refrain::find(&SuffixTree::new(&text).unwrap()).unwrap();
        assert_eq!(a.value, t.value);
    }
}

#[test]
fn solves_problem_format() {
    let problem = decode("9 3\n1 2 1 3 1 2 1 3 1\n".as_bytes()).unwrap();
    let refrain = Refrain::find(&SuffixTree::new(&problem.text).unwrap()).unwrap();

    let mut out = Vec::new();
    encode(&refrain, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "10\n5\n1 2 1 3 1\n");
}

// See if we can catch any corner cases we forgot about.
#[test]
fn prop_refrain_values_agree() {
    fn prop(bytes: Vec<u8>, size: u8) -> TestResult {
        if size == 0 {
            return TestResult::discard();
        }
        let text = small_alphabet(&bytes, size.min(8));
        let a = Refrain::find(&automaton(&text)).unwrap();
        let t = Refrain::find(&tree(&text)).unwrap();
        TestResult::from_bool(a.value == t.value && a.value == naive_refrain_value(&text))
    }
    qc(prop as fn(Vec<u8>, u8) -> TestResult);
}

#[test]
fn prop_refrain_substring_is_consistent() {
    fn check<I: SuffixIndex<u8>>(index: &I) -> bool {
        let text = index.text();
        let refrain = Refrain::find(index).unwrap();
        let best = best_cursor(index).unwrap();
        let naive = naive_counts(text);

        text[best.slice()] == refrain.substring[..]
            && naive.get(&refrain.substring[..]).copied().unwrap_or(0) * refrain.len() as u64
                >= refrain.value
            && index.cursors().all(|c| c.score() <= refrain.value)
    }

    fn prop(bytes: Vec<u8>) -> bool {
        let text = small_alphabet(&bytes, 3);
        check(&automaton(&text)) && check(&tree(&text))
    }
    qc(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn prop_automaton_counts_match_naive() {
    fn prop(bytes: Vec<u8>) -> bool {
        let text = small_alphabet(&bytes, 3);
        let sa = automaton(&text);
        let naive = naive_counts(&text);
        sa.cursors()
            .skip(1)
            .all(|c| c.occurrences() == naive[&text[c.slice()]])
    }
    qc(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn prop_tree_counts_match_naive() {
    // A leaf whose edge holds only the sentinel spells the same substring as
    // its parent, but counts a single suffix.
    fn exact(c: &TreeCursor<'_, u8>) -> bool {
        !c.is_leaf() || c.edge().len() > 1
    }

    fn prop(bytes: Vec<u8>) -> bool {
        let text = small_alphabet(&bytes, 3);
        let st = tree(&text);
        let naive = naive_counts(&text);
        st.cursors().skip(1).filter(|c| c.len() > 0).all(|c| {
            let expected = naive[&text[c.slice()]];
            if exact(&c) {
                c.occurrences() == expected
            } else {
                c.occurrences() <= expected
            }
        })
    }
    qc(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn prop_pattern_counts_match_naive() {
    fn prop(bytes: Vec<u8>, pattern: Vec<u8>) -> bool {
        let text = small_alphabet(&bytes, 2);
        let pattern = small_alphabet(&pattern, 2);
        let pattern = &pattern[..pattern.len().min(4)];

        let expected = if pattern.is_empty() {
            0
        } else {
            text.windows(pattern.len()).filter(|w| *w == pattern).count() as u64
        };
        count(&automaton(&text), pattern) == expected && count(&tree(&text), pattern) == expected
    }
    qc(prop as fn(Vec<u8>, Vec<u8>) -> bool);
}

#[test]
fn prop_finalize_is_idempotent() {
    fn prop(bytes: Vec<u8>) -> bool {
        let mut sa = SuffixAutomaton::new();
        sa.extend(small_alphabet(&bytes, 4)).unwrap();
        sa.finalize();
        let before: Vec<u64> = sa.cursors().map(|c| c.occurrences()).collect();
        sa.finalize();
        let after: Vec<u64> = sa.cursors().map(|c| c.occurrences()).collect();
        before == after && sa.append(0).is_err()
    }
    qc(prop as fn(Vec<u8>) -> bool);
}
