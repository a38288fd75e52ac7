//! Display names and the storage keys derived from them.
//!
//! Every file title a user picks is reduced to a canonical, filesystem-safe
//! basename before its content is written. The reduction is lossy, so two
//! titles may share a key; [`allocate_storage_key`] picks a free variant.

mod unique;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use unique::{resolve_unique_name, SiblingScope};

/// Extension carried by every storage key.
pub const STORAGE_EXTENSION: &str = "ink";
/// Stem used when a title reduces to nothing.
pub const DEFAULT_STEM: &str = "default-file";

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]+(-[a-z]+)*(-[0-9]+)?\.ink$").expect("storage key pattern is valid")
});
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("disallowed pattern is valid"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_]+").expect("separator pattern is valid"));
static DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("dash pattern is valid"));

/// Canonical basename of a file's content in blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(String);

impl StorageKey {
    fn from_stem(stem: &str) -> Self {
        let key = format!("{}.{}", stem, STORAGE_EXTENSION);
        assert!(
            KEY_PATTERN.is_match(&key),
            "normalizer produced an invalid storage key: {key}"
        );
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key without its extension.
    pub fn stem(&self) -> &str {
        self.0
            .strip_suffix(STORAGE_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(&self.0)
    }

    /// Absolute location of the content under `root`.
    pub fn location(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if KEY_PATTERN.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(StorageKeyError(value))
        }
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a valid storage key: {0}")]
pub struct StorageKeyError(pub String);

/// Reduce a display title to its storage key.
///
/// Lowercases, drops everything that is not an ASCII word character,
/// whitespace or `-`, turns whitespace and underscore runs into single
/// dashes and trims dashes at both ends. Digits survive only as a trailing
/// numeric segment after at least one alphabetic one. An empty result falls
/// back to [`DEFAULT_STEM`].
pub fn normalize(title: &str) -> StorageKey {
    let lowered = title.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, "");
    let dashed = SEPARATORS.replace_all(&cleaned, "-");
    let collapsed = DASHES.replace_all(&dashed, "-");
    let trimmed = collapsed.trim_matches('-');

    let segments: Vec<&str> = trimmed.split('-').filter(|s| !s.is_empty()).collect();
    let mut words: Vec<String> = Vec::with_capacity(segments.len());
    let mut suffix = None;

    for (i, segment) in segments.iter().enumerate() {
        let is_last = i + 1 == segments.len();
        if is_last && segment.bytes().all(|b| b.is_ascii_digit()) {
            suffix = Some(*segment);
            continue;
        }
        let letters: String = segment.chars().filter(|c| c.is_ascii_lowercase()).collect();
        if !letters.is_empty() {
            words.push(letters);
        }
    }

    if words.is_empty() {
        return StorageKey::from_stem(DEFAULT_STEM);
    }

    let mut stem = words.join("-");
    if let Some(digits) = suffix {
        stem.push('-');
        stem.push_str(digits);
    }
    StorageKey::from_stem(&stem)
}

/// Normalize `title` and pick the first key `taken` does not report.
///
/// Collisions keep the alphabetic stem and swap the numeric suffix for
/// `-1`, `-2`, ... so the result always stays a valid key.
pub fn allocate_storage_key<F>(title: &str, mut taken: F) -> StorageKey
where
    F: FnMut(&StorageKey) -> bool,
{
    let key = normalize(title);
    if !taken(&key) {
        return key;
    }

    let base = match key.stem().rsplit_once('-') {
        Some((head, tail)) if tail.bytes().all(|b| b.is_ascii_digit()) => head.to_string(),
        _ => key.stem().to_string(),
    };

    let mut n: u64 = 1;
    loop {
        let candidate = StorageKey::from_stem(&format!("{}-{}", base, n));
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
