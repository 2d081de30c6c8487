use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use funty::Unsigned;

use crate::cursor::{Cursor, SuffixIndex};

/// Render an index as a Graphviz digraph.
///
/// Nodes are labeled `id,len`. Transitions are solid edges labeled with their
/// symbols, the whole edge text for a suffix tree with its sentinel shown as
/// `$`. Suffix links are dotted.
pub fn write_dot<T, I, W>(index: &I, mut out: W) -> Result<()>
where
    T: Unsigned + Display,
    I: SuffixIndex<T>,
    W: Write,
{
    writeln!(out, "digraph G")?;
    writeln!(out, "{{")?;
    writeln!(out, "\trankdir = TB;")?;

    for cursor in index.cursors() {
        let id = cursor.id();
        writeln!(out, "\t{} [label=\"{},{}\"];", id, id, cursor.len())?;

        for (symbol, child) in cursor.children() {
            let symbols = child.edge_label().unwrap_or_else(|| vec![symbol]);
            writeln!(
                out,
                "\t{} -> {} [label=\"{}\"];",
                id,
                child.id(),
                edge_text(&symbols)
            )?;
        }

        if let Some(link) = cursor.suffix_link() {
            writeln!(out, "\t{} -> {} [style=dotted, color=grey];", id, link.id())?;
        }
    }

    writeln!(out, "}}")?;
    Ok(())
}

fn edge_text<T: Unsigned + Display>(symbols: &[T]) -> String {
    symbols
        .iter()
        .map(|&symbol| {
            if symbol == T::MAX {
                "$".to_string()
            } else {
                symbol.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
