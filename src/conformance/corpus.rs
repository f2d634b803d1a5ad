//! Collation corpus checks.
//!
//! A corpus file holds one document text per line. Collating it sorts the
//! lines by their collation keys; a corpus directory pairs every file with a
//! `<name>.ref` file holding the expected collated order.
//!
//! # Requirements
//!
//! - Lines are trimmed and empty lines dropped, in both the corpus file and
//!   its reference
//! - Equal keys keep their input order
//! - A corpus file without a reference file is an error, not a pass

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::sort_order::{KeyStrategy, SortOrderError};
use crate::codec::Codec;
use crate::error::HarnessResult;
use crate::generate::read_lines;

/// Extension of reference files.
pub const REF_EXTENSION: &str = "ref";

/// Sort texts by their collation keys, returning the texts.
pub fn collate_texts<C: Codec + ?Sized, S: AsRef<str>>(
    codec: &C,
    texts: &[S],
) -> Result<Vec<String>, SortOrderError> {
    let mut keyed = Vec::with_capacity(texts.len());
    for (index, text) in texts.iter().enumerate() {
        let text = text.as_ref();
        let key = KeyStrategy::JsonToCollate
            .key(codec, text.as_bytes())
            .map_err(|source| SortOrderError::Key { index, source })?;
        keyed.push((key, text));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, text)| text.to_string()).collect())
}

/// Collate the lines of a corpus file.
pub fn collate_file<C: Codec + ?Sized, P: AsRef<Path>>(codec: &C, path: P) -> HarnessResult<Vec<String>> {
    let lines = read_lines(path)?;
    Ok(collate_texts(codec, &lines)?)
}

/// Result of checking one corpus file against its reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusCheck {
    /// Corpus file.
    pub path: PathBuf,
    /// Number of lines collated.
    pub lines: usize,
    /// First line where the collated output and the reference differ.
    pub first_difference: Option<usize>,
}

impl CorpusCheck {
    /// Returns true if the collated output equals the reference.
    pub fn is_pass(&self) -> bool {
        self.first_difference.is_none()
    }
}

/// Collate one corpus file and compare it with `<path>.ref`.
pub fn check_file<C: Codec + ?Sized>(codec: &C, path: &Path) -> HarnessResult<CorpusCheck> {
    let collated = collate_file(codec, path)?;
    let mut ref_path = path.as_os_str().to_owned();
    ref_path.push(".");
    ref_path.push(REF_EXTENSION);
    let expected = read_lines(PathBuf::from(ref_path))?;

    let first_difference = collated
        .iter()
        .zip(&expected)
        .position(|(a, b)| a != b)
        .or_else(|| (collated.len() != expected.len()).then(|| collated.len().min(expected.len())));

    if let Some(line) = first_difference {
        error!(path = %path.display(), line, "collated order differs from reference");
    } else {
        info!(path = %path.display(), lines = collated.len(), "collated order matches reference");
    }

    Ok(CorpusCheck {
        path: path.to_path_buf(),
        lines: collated.len(),
        first_difference,
    })
}

/// Check every corpus file in a directory, in file name order.
///
/// Files ending in `.ref` and subdirectories are not corpus files.
pub fn check_dir<C: Codec + ?Sized, P: AsRef<Path>>(codec: &C, dir: P) -> HarnessResult<Vec<CorpusCheck>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_ref = path.extension().is_some_and(|ext| ext == REF_EXTENSION);
        if path.is_file() && !is_ref {
            files.push(path);
        }
    }
    files.sort();
    files.iter().map(|path| check_file(codec, path)).collect()
}
