//! Loading downloaded pages from disk into in-memory batch items.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One downloaded page: identifier, raw content, and its position in the
/// batch for progress logging.
#[derive(Debug, Clone)]
pub struct FileContents {
    pub uid: String,
    pub path: PathBuf,
    pub contents: String,
    pub file_num: usize,
    pub n_files: usize,
}

/// Reads every `.html` file in `dir`, skipping uids already parsed.
/// Files are ordered by name so batch numbering is stable across runs.
pub fn load_html_files(dir: &Path, skip_uids: &HashSet<String>) -> Result<Vec<FileContents>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("read dir {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    paths.sort();

    let to_parse: Vec<(String, PathBuf)> = paths
        .into_iter()
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            Some((stem, path))
        })
        .filter(|(stem, _)| !skip_uids.contains(stem))
        .collect();

    let n_files = to_parse.len();
    let mut out = Vec::with_capacity(n_files);
    for (file_num, (uid, path)) in to_parse.into_iter().enumerate() {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        out.push(FileContents {
            uid,
            path,
            contents,
            file_num,
            n_files,
        });
    }
    Ok(out)
}
