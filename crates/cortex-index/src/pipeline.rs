//! The retrieval pipeline: incremental indexing, semantic search, and
//! RAG-backed question answering.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cortex_core::Config;
use cortex_llm::LlmProvider;
use tracing::{debug, info, warn};

use crate::chunker::{Chunk, chunk_lines};
use crate::error::{IndexError, Result};
use crate::scanner;
use crate::store::{IndexStore, Summary};
use crate::summary;

/// Default number of results returned by `search`.
pub const DEFAULT_SEARCH_RESULTS: usize = 5;

/// Number of chunks fed as context to `ask`.
const ASK_CONTEXT_CHUNKS: usize = 8;

/// Chunk text shown per search result before truncation.
const SNIPPET_CHARS: usize = 500;

/// Counters from one indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub total_chunks: usize,
    pub database: PathBuf,
}

impl fmt::Display for IndexReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Indexing complete")?;
        writeln!(f, "  new/updated files: {}", self.files_indexed)?;
        writeln!(f, "  unchanged (skipped): {}", self.files_skipped)?;
        writeln!(f, "  total chunks in database: {}", self.total_chunks)?;
        write!(f, "  database: {}", self.database.display())
    }
}

/// One search result: a chunk and its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub score: f32,
    pub chunk: Chunk,
}

/// Indexes a project and answers queries against it through one
/// [`LlmProvider`].
///
/// State (file hashes and chunks) is loaded once at construction and
/// persisted after every indexing run.
pub struct RagPipeline<P> {
    config: Arc<Config>,
    provider: P,
    store: IndexStore,
    hashes: BTreeMap<String, String>,
    chunks: Vec<Chunk>,
}

impl<P: LlmProvider> RagPipeline<P> {
    /// Open the database directory and load any existing index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory cannot be created or
    /// the persisted files are corrupt.
    pub fn new(config: Arc<Config>, provider: P) -> Result<Self> {
        let store = IndexStore::open(&config.database_path)?;
        let hashes = store.load_hashes()?;
        let chunks = store.load_chunks()?;
        debug!(
            files = hashes.len(),
            chunks = chunks.len(),
            "loaded existing index"
        );
        Ok(Self {
            config,
            provider,
            store,
            hashes,
            chunks,
        })
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Index the project, skipping files whose content hash is unchanged.
    ///
    /// `root` overrides the configured project path for this run. With
    /// `force`, every file is re-chunked and re-embedded. Files deleted
    /// since the last run are pruned from the index. A chunk whose
    /// embedding request fails is dropped with a warning; the run
    /// continues. The summary is regenerated only when at least one file
    /// was (re)indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist or persistence fails.
    pub async fn index(&mut self, root: Option<&Path>, force: bool) -> Result<IndexReport> {
        let root = root.unwrap_or(&self.config.project_path).to_path_buf();
        if !root.exists() {
            return Err(IndexError::MissingRoot(root));
        }

        let ignore = self.ignore_dirs();
        let files = scanner::collect_files(&root, &ignore);
        info!(total = files.len(), root = %root.display(), "indexing started");

        let current: HashSet<String> = files
            .iter()
            .filter_map(|f| f.canonicalize().ok())
            .map(|c| c.to_string_lossy().into_owned())
            .collect();

        // Prune files deleted since the last run.
        self.hashes.retain(|path, _| current.contains(path));
        let mut retained: HashMap<String, Vec<Chunk>> = HashMap::new();
        for chunk in std::mem::take(&mut self.chunks) {
            let canon = root.join(&chunk.file).canonicalize();
            if canon.is_ok_and(|c| current.contains(c.to_string_lossy().as_ref())) {
                retained.entry(chunk.file.clone()).or_default().push(chunk);
            }
        }

        let mut new_chunks = Vec::new();
        let mut files_indexed = 0;
        let mut files_skipped = 0;

        for file in &files {
            let Ok(canon) = file.canonicalize() else {
                continue;
            };
            let key = canon.to_string_lossy().into_owned();
            let rel = file
                .strip_prefix(&root)
                .unwrap_or(file)
                .to_string_lossy()
                .into_owned();

            let bytes = match fs::read(file) {
                Ok(bytes) => bytes,
                Err(e) => {
                    // Tracked hash stays put, so its chunks must too.
                    warn!(file = %rel, error = %e, "could not read file, keeping previous chunks");
                    carry_over(&rel, &mut retained, &mut new_chunks);
                    files_skipped += 1;
                    continue;
                }
            };
            let hash = blake3::hash(&bytes).to_hex().to_string();

            if !force && self.hashes.get(&key) == Some(&hash) {
                carry_over(&rel, &mut retained, &mut new_chunks);
                files_skipped += 1;
                continue;
            }

            let text = String::from_utf8_lossy(&bytes);
            let mut embedded = 0;
            for mut chunk in chunk_lines(
                &text,
                &rel,
                self.config.indexing.chunk_size,
                self.config.indexing.chunk_overlap,
            ) {
                match self.provider.embed(&chunk.text).await {
                    Ok(vector) => {
                        chunk.embedding = Some(vector);
                        new_chunks.push(chunk);
                        embedded += 1;
                    }
                    Err(e) => {
                        warn!(
                            file = %rel,
                            lines = %format!("{}-{}", chunk.start_line, chunk.end_line),
                            error = %e,
                            "could not embed chunk, dropping"
                        );
                    }
                }
            }

            self.hashes.insert(key, hash);
            files_indexed += 1;
            info!(file = %rel, chunks = embedded, "indexed");
        }

        self.chunks = new_chunks;
        self.store.save_hashes(&self.hashes)?;
        self.store.save_chunks(&self.chunks)?;

        if files_indexed > 0 {
            self.regenerate_summary(&root, &ignore).await?;
        }

        Ok(IndexReport {
            files_indexed,
            files_skipped,
            total_chunks: self.chunks.len(),
            database: self.config.database_path.clone(),
        })
    }

    /// Return the `n` chunks most similar to `query`, best first.
    ///
    /// Ties keep indexing order. Chunks without an embedding are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyIndex`] if nothing was indexed yet, or
    /// an error if the query embedding fails.
    pub async fn search(&self, query: &str, n: usize) -> Result<Vec<SearchHit>> {
        if self.chunks.is_empty() {
            return Err(IndexError::EmptyIndex);
        }

        let query_embedding = self.provider.embed(query).await?;
        let mut scored: Vec<SearchHit> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                chunk.embedding.as_ref().map(|embedding| SearchHit {
                    score: cosine_similarity(&query_embedding, embedding),
                    chunk: chunk.clone(),
                })
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(n);
        Ok(scored)
    }

    /// Answer a question with the top chunks and the cached summary as
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyIndex`] if nothing was indexed yet, or
    /// an error if a model request fails.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let hits = self.search(question, ASK_CONTEXT_CHUNKS).await?;

        let context = hits
            .iter()
            .map(|hit| {
                format!(
                    "// {} line {}-{}\n{}",
                    hit.chunk.file, hit.chunk.start_line, hit.chunk.end_line, hit.chunk.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let overview = self
            .store
            .load_summary()?
            .map(|s| s.summary)
            .unwrap_or_default();

        let prompt = format!(
            "You are an expert assistant for this codebase. Answer concisely and \
             reference specific files and line numbers where relevant.\n\
             \n\
             PROJECT OVERVIEW:\n\
             {overview}\n\
             \n\
             RELEVANT CODE:\n\
             {context}\n\
             \n\
             QUESTION: {question}\n\
             \n\
             Answer concretely and reference specific files and line numbers where relevant."
        );

        Ok(self.provider.generate(&prompt).await?)
    }

    /// The cached project overview, or a hint to index first.
    ///
    /// # Errors
    ///
    /// Returns an error if `summary.json` is corrupt.
    pub fn summary(&self) -> Result<String> {
        Ok(self
            .store
            .load_summary()?
            .map_or_else(
                || "No summary found. Run `cortex index` to generate one.".to_owned(),
                |s| s.summary,
            ))
    }

    /// The cached summary if one exists, without fallback text.
    ///
    /// # Errors
    ///
    /// Returns an error if `summary.json` is corrupt.
    pub fn cached_summary(&self) -> Result<Option<String>> {
        Ok(self.store.load_summary()?.map(|s| s.summary))
    }

    async fn regenerate_summary(&self, root: &Path, ignore: &HashSet<String>) -> Result<()> {
        let files = scanner::collect_files(root, ignore);
        let prompt = summary::build_prompt(root, &files);
        let text = match self.provider.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "summary generation failed");
                format!("Could not generate summary: {e}")
            }
        };
        self.store.save_summary(&Summary { summary: text })?;
        info!("project summary regenerated");
        Ok(())
    }

    fn ignore_dirs(&self) -> HashSet<String> {
        self.config
            .indexing
            .ignore_dirs
            .clone()
            .map_or_else(scanner::default_ignore_dirs, |dirs| {
                dirs.into_iter().collect()
            })
    }
}

/// Move a file's previously indexed chunks into the next persisted set.
///
/// Used whenever a file is not re-embedded this run. Every file whose
/// hash survives the run must keep its chunks, or search silently loses
/// that file until its content changes again.
fn carry_over(rel: &str, retained: &mut HashMap<String, Vec<Chunk>>, new_chunks: &mut Vec<Chunk>) {
    if let Some(existing) = retained.remove(rel) {
        new_chunks.extend(existing);
    }
}

/// Cosine similarity of two vectors, or `0.0` when either has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Human-readable search results with snippets truncated to 500 chars.
#[must_use]
pub fn format_search_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No relevant code snippets found.".to_owned();
    }

    let mut out = format!("Top {} results for '{query}'\n\n", hits.len());
    for hit in hits {
        let snippet: String = hit.chunk.text.chars().take(SNIPPET_CHARS).collect();
        out.push_str(&format!(
            "{} (line {}-{}) [relevance: {:.2}]\n```\n{}\n```\n\n",
            hit.chunk.file, hit.chunk.start_line, hit.chunk.end_line, hit.score, snippet
        ));
    }
    out
}
