//! Project file discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// File extensions considered indexable source or docs.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "go", "rs", "java", "cpp", "c", "h", "cs", "rb", "php",
    "swift", "kt", "vue", "svelte", "html", "css", "scss", "sql", "md", "mdx", "yaml", "yml",
    "json", "toml",
];

/// Extensionless names that are still worth indexing.
const EXTRA_FILENAMES: &[&str] = &[".env.example"];

/// Directory names pruned from the walk when the config sets none.
const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    ".pytest_cache",
    "cortex-db",
    "cdk.out",
    "target",
];

/// The built-in ignore set, used when `indexing.ignore_dirs` is unset.
#[must_use]
pub fn default_ignore_dirs() -> HashSet<String> {
    DEFAULT_IGNORE_DIRS.iter().map(|s| (*s).to_owned()).collect()
}

/// Walk `root` and return every indexable file, sorted by path.
///
/// Directories whose name appears in `ignore_dirs` are pruned entirely.
/// Unreadable entries are skipped without error.
#[must_use]
pub fn collect_files(root: &Path, ignore_dirs: &HashSet<String>) -> Vec<PathBuf> {
    let pruned = ignore_dirs.clone();
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && entry.file_name().to_str().is_some_and(|n| pruned.contains(n)))
        })
        .build()
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| is_indexable(path))
        .collect();
    files.sort();
    files
}

fn is_indexable(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str())
        && EXTRA_FILENAMES.iter().any(|extra| name.ends_with(extra))
    {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
}
