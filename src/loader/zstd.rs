use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zstd::stream::read::Decoder;

use crate::codec::{decode, Problem};
use crate::loader::ProblemSource;

pub struct ProblemZstdFileLoader {
    filepath: PathBuf,
}

impl ProblemZstdFileLoader {
    pub fn new<P>(filepath: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            filepath: PathBuf::from(filepath.as_ref()),
        }
    }
}

impl ProblemSource for ProblemZstdFileLoader {
    fn load(&self) -> Result<Problem> {
        let file = File::open(&self.filepath)
            .with_context(|| format!("Failed to open {}", self.filepath.display()))?;
        let reader = Decoder::new(file)?;
        decode(reader).with_context(|| format!("In {}", self.filepath.display()))
    }
}
