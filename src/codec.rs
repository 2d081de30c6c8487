use std::io::{Read, Write};

use anyhow::{bail, ensure, Context, Result};

use crate::refrain::Refrain;

/// A decoded problem: a text over the alphabet `1..=alphabet_size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub alphabet_size: u32,
    pub text: Vec<u32>,
}

/// Parse a problem: whitespace separated integers `n m` followed by `n`
/// symbols, each in `1..=m`.
pub fn decode<R: Read>(mut reader: R) -> Result<Problem> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .context("Failed to read problem input")?;

    let mut tokens = input.split_ascii_whitespace();
    let mut header = |name: &str| -> Result<u64> {
        let token = tokens
            .next()
            .with_context(|| format!("Missing {} in problem header", name))?;
        token
            .parse()
            .with_context(|| format!("Invalid {} {:?} in problem header", name, token))
    };
    let len = header("text length")?;
    let alphabet_size = header("alphabet size")?;

    ensure!(
        alphabet_size < u64::from(u32::MAX),
        "Alphabet size {} is too large",
        alphabet_size
    );
    let alphabet_size = alphabet_size as u32;
    let len = usize::try_from(len).context("Text length does not fit in memory")?;

    let mut text = Vec::with_capacity(len.min(1 << 24));
    for (i, token) in tokens.by_ref().take(len).enumerate() {
        let symbol: u32 = token
            .parse()
            .with_context(|| format!("Invalid symbol {:?} at index {}", token, i))?;
        ensure!(
            (1..=alphabet_size).contains(&symbol),
            "Symbol {} at index {} is outside the alphabet 1..={}",
            symbol,
            i,
            alphabet_size
        );
        text.push(symbol);
    }

    ensure!(
        text.len() == len,
        "Expected {} symbols, found {}",
        len,
        text.len()
    );
    if let Some(extra) = tokens.next() {
        bail!("Unexpected trailing token {:?} after {} symbols", extra, len);
    }

    Ok(Problem {
        alphabet_size,
        text,
    })
}

/// Write a refrain as its value, its length and its symbols, one line each.
pub fn encode<W: Write>(refrain: &Refrain<u32>, mut writer: W) -> Result<()> {
    writeln!(writer, "{}", refrain.value)?;
    writeln!(writer, "{}", refrain.len())?;
    let symbols: Vec<String> = refrain.substring.iter().map(u32::to_string).collect();
    writeln!(writer, "{}", symbols.join(" "))?;
    Ok(())
}
