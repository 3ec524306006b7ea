//! Prompt assembly for the cached project overview.

use std::fs;
use std::path::{Path, PathBuf};

const README_CANDIDATES: &[&str] = &["README.md", "readme.md", "README.txt"];
const MAX_TREE_FILES: usize = 100;
const MAX_README_CHARS: usize = 2000;

/// Build the summary prompt from the project's file tree and README.
///
/// `files` is expected sorted; only the first 100 paths are listed.
pub(crate) fn build_prompt(root: &Path, files: &[PathBuf]) -> String {
    let file_tree = files
        .iter()
        .take(MAX_TREE_FILES)
        .map(|f| f.strip_prefix(root).unwrap_or(f).display().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    let readme = read_readme(root).unwrap_or_else(|| "(no README found)".to_owned());

    format!(
        "Analyze this codebase and provide a structured summary in English.\n\
         \n\
         README:\n\
         {readme}\n\
         \n\
         FILE STRUCTURE:\n\
         {file_tree}\n\
         \n\
         Include:\n\
         1. What the project does (purpose)\n\
         2. Tech stack and frameworks\n\
         3. Folder structure and architecture\n\
         4. Key files and their roles\n\
         5. How to run the project (if apparent)"
    )
}

fn read_readme(root: &Path) -> Option<String> {
    for name in README_CANDIDATES {
        let path = root.join(name);
        if path.exists() {
            let bytes = fs::read(&path).ok()?;
            let text = String::from_utf8_lossy(&bytes);
            return Some(text.chars().take(MAX_README_CHARS).collect());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_relative_paths_and_readme() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "My project does things.").unwrap();
        let files = vec![dir.path().join("src/main.rs"), dir.path().join("lib.rs")];

        let prompt = build_prompt(dir.path(), &files);
        assert!(prompt.contains("My project does things."));
        assert!(prompt.contains("src/main.rs"));
        assert!(!prompt.contains(&dir.path().display().to_string()));
    }

    #[test]
    fn missing_readme_uses_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = build_prompt(dir.path(), &[]);
        assert!(prompt.contains("(no README found)"));
    }

    #[test]
    fn readme_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "x".repeat(5000)).unwrap();
        let prompt = build_prompt(dir.path(), &[]);
        assert!(!prompt.contains(&"x".repeat(2001)));
        assert!(prompt.contains(&"x".repeat(2000)));
    }

    #[test]
    fn file_tree_caps_at_hundred_entries() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = (0..150)
            .map(|i| dir.path().join(format!("f{i:03}.rs")))
            .collect();
        let prompt = build_prompt(dir.path(), &files);
        assert!(prompt.contains("f099.rs"));
        assert!(!prompt.contains("f100.rs"));
    }

    #[test]
    fn lowercase_readme_is_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), "lowercase readme").unwrap();
        let prompt = build_prompt(dir.path(), &[]);
        assert!(prompt.contains("lowercase readme"));
    }
}
