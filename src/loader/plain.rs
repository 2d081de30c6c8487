use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::codec::{decode, Problem};
use crate::loader::ProblemSource;

pub struct ProblemFileLoader {
    filepath: PathBuf,
}

impl ProblemFileLoader {
    pub fn new<P>(filepath: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            filepath: PathBuf::from(filepath.as_ref()),
        }
    }
}

impl ProblemSource for ProblemFileLoader {
    fn load(&self) -> Result<Problem> {
        let file = File::open(&self.filepath)
            .with_context(|| format!("Failed to open {}", self.filepath.display()))?;
        decode(BufReader::new(file)).with_context(|| format!("In {}", self.filepath.display()))
    }
}

pub struct ProblemTextLoader<'a> {
    text: &'a [u8],
}

impl<'a> ProblemTextLoader<'a> {
    pub const fn new(text: &'a [u8]) -> Self {
        Self { text }
    }
}

impl<'a> ProblemSource for ProblemTextLoader<'a> {
    fn load(&self) -> Result<Problem> {
        decode(self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_loader() {
        let problem = ProblemTextLoader::new(b"3 2\n2 2 1").load().unwrap();
        assert_eq!(problem.text, vec![2, 2, 1]);
    }

    #[test]
    fn test_file_loader() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "4 2").unwrap();
        writeln!(file, "1 2 1 2").unwrap();

        let problem = ProblemFileLoader::new(file.path()).load().unwrap();
        assert_eq!(problem.alphabet_size, 2);
        assert_eq!(problem.text, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_missing_file() {
        let err = ProblemFileLoader::new("/nonexistent/problem.txt").load().unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
