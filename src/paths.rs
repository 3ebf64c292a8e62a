use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const SNIFF_LEN: u64 = 4096;

pub trait PathFinder {
    fn find(&self, raw: &str) -> Option<PathBuf>;
}

/// Resolves path-like strings against a base directory, trying `~`
/// expansion and git diff `a/` `b/` prefixes before giving up.
#[derive(Debug, Clone)]
pub struct HeuristicFinder {
    base: PathBuf,
    home: Option<PathBuf>,
}

impl HeuristicFinder {
    pub fn new(base: PathBuf) -> Self {
        Self {
            base,
            home: dirs::home_dir(),
        }
    }

    fn candidates(&self, raw: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();
        if raw == "~" {
            out.extend(self.home.clone());
        } else if let Some(rest) = raw.strip_prefix("~/") {
            out.extend(self.home.as_ref().map(|home| home.join(rest)));
        } else {
            out.push(self.base.join(raw));
            for prefix in ["a/", "b/"] {
                if let Some(rest) = raw.strip_prefix(prefix) {
                    out.push(self.base.join(rest));
                }
            }
        }
        out
    }
}

impl PathFinder for HeuristicFinder {
    fn find(&self, raw: &str) -> Option<PathBuf> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        self.candidates(raw).into_iter().find(|p| p.exists())
    }
}

/// A file counts as binary when a NUL byte shows up in its first 4 KiB.
/// Anything that is not a readable regular file is treated as binary too.
pub fn looks_binary(path: &Path) -> bool {
    if !path.is_file() {
        return true;
    }
    let Ok(file) = File::open(path) else {
        return true;
    };
    let mut chunk = Vec::with_capacity(SNIFF_LEN as usize);
    if file.take(SNIFF_LEN).read_to_end(&mut chunk).is_err() {
        return true;
    }
    chunk.contains(&0)
}
