//! Subcommand implementations.

use crate::config::Settings;
use crate::FusionArg;
use anyhow::{bail, Context, Result};
use hybridsearch_core::config::RRF_K;
use hybridsearch_core::embedding::LexicalEmbedder;
use hybridsearch_core::pipeline::{HybridSearch, SearchOutcome};
use hybridsearch_core::rerank::{LexicalReranker, Reranker};
use hybridsearch_core::search::Fusion;
use hybridsearch_core::store::{self, sql, MemoryStore, Store, VectorColumn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One JSON Lines corpus record.
#[derive(Debug, Deserialize)]
struct CorpusLine {
    text: String,
}

/// Reads a corpus file: JSON Lines when the extension is `.jsonl`, else one
/// document per non-empty line.
pub fn read_corpus(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus '{}'", path.display()))?;
    let jsonl = path.extension().and_then(|e| e.to_str()) == Some("jsonl");

    let mut texts = Vec::new();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if jsonl {
            let record: CorpusLine = serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid JSON line", path.display(), n + 1))?;
            if record.text.trim().is_empty() {
                tracing::warn!("{}:{}: empty text, skipped", path.display(), n + 1);
                continue;
            }
            texts.push(record.text);
        } else {
            texts.push(line.trim().to_string());
        }
    }
    Ok(texts)
}

fn embedder(settings: &Settings) -> Result<Arc<LexicalEmbedder>> {
    let embedder =
        LexicalEmbedder::new(settings.embedding.dense_dims, settings.embedding.sparse_dims)
            .context("Failed to create embedder")?;
    Ok(Arc::new(embedder))
}

/// Indexes a corpus, appending to an existing snapshot for the table if there is one.
pub fn index(settings: &Settings, corpus: &Path, data_dir: Option<PathBuf>) -> Result<()> {
    let data_dir = data_dir.unwrap_or_else(|| settings.store.data_dir.clone());
    let texts = read_corpus(corpus)?;
    if texts.is_empty() {
        bail!("Corpus '{}' contains no documents", corpus.display());
    }

    let snapshot = store::snapshot_path(&data_dir, &settings.store.table);
    let (memory, fresh) = if snapshot.exists() {
        let memory = store::load_store(&snapshot)
            .with_context(|| format!("Failed to load snapshot '{}'", snapshot.display()))?;
        check_schema(settings, &memory)?;
        (memory, false)
    } else {
        (MemoryStore::new(), true)
    };

    let pipeline = HybridSearch::new(
        embedder(settings)?,
        Arc::new(memory.clone()),
        None,
        settings.retrieval,
    )?
    .with_indexes(settings.dense_index(), settings.sparse_index());
    if fresh {
        pipeline.setup(&settings.store.table)?;
    }

    let ids = pipeline.index_documents(&texts)?;
    let path = store::save_store(&memory, &data_dir)
        .with_context(|| format!("Failed to write snapshot to '{}'", data_dir.display()))?;
    println!(
        "Indexed {} documents into '{}' ({} total) -> {}",
        ids.len(),
        settings.store.table,
        memory.len(),
        path.display()
    );
    Ok(())
}

fn check_schema(settings: &Settings, memory: &MemoryStore) -> Result<()> {
    let expected = settings.schema();
    match memory.schema() {
        Some(schema) if schema == expected => Ok(()),
        Some(schema) => bail!(
            "Snapshot schema {:?} does not match configured schema {:?}",
            schema,
            expected
        ),
        None => bail!("Snapshot has no schema"),
    }
}

pub struct SearchOptions {
    pub data_dir: Option<PathBuf>,
    pub top_k: Option<usize>,
    pub fusion: Option<FusionArg>,
    pub rerank: bool,
    pub json: bool,
}

pub fn search(settings: &Settings, query: &str, opts: SearchOptions) -> Result<()> {
    let data_dir = opts.data_dir.unwrap_or_else(|| settings.store.data_dir.clone());
    let snapshot = store::snapshot_path(&data_dir, &settings.store.table);
    if !snapshot.exists() {
        bail!(
            "No snapshot at '{}'. Run `hybridsearch index --corpus <file>` first.",
            snapshot.display()
        );
    }
    let memory = store::load_store(&snapshot)
        .with_context(|| format!("Failed to load snapshot '{}'", snapshot.display()))?;
    check_schema(settings, &memory)?;

    let mut retrieval = settings.retrieval;
    if let Some(k) = opts.top_k {
        retrieval = retrieval.with_k(k);
    }
    match opts.fusion {
        Some(FusionArg::Union) => retrieval.fusion = Fusion::Union,
        Some(FusionArg::Rrf) if !matches!(retrieval.fusion, Fusion::Rrf { .. }) => {
            retrieval.fusion = Fusion::Rrf { k: RRF_K };
        }
        _ => {}
    }
    let reranker: Option<Arc<dyn Reranker>> = if opts.rerank {
        Some(Arc::new(LexicalReranker::new()))
    } else {
        None
    };
    let pipeline = HybridSearch::new(
        embedder(settings)?,
        Arc::new(memory),
        reranker,
        retrieval,
    )?;
    let outcome = pipeline.search(query)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", format_human(query, &outcome));
    }
    Ok(())
}

/// Plain-text rendering of each stage of a search.
pub fn format_human(query: &str, outcome: &SearchOutcome) -> String {
    let mut out = format!("Query: {}\n", query);
    if outcome.ranked.is_empty() {
        out.push_str("No results.\n");
        return out;
    }

    out.push_str("\nDense hits:\n");
    for (i, hit) in outcome.dense_hits.iter().enumerate() {
        out.push_str(&format!("  {:>2}. [{:>9.4}] {}\n", i + 1, hit.distance, hit.text));
    }
    out.push_str("\nSparse hits:\n");
    for (i, hit) in outcome.sparse_hits.iter().enumerate() {
        out.push_str(&format!("  {:>2}. [{:>9.4}] {}\n", i + 1, hit.distance, hit.text));
    }
    out.push_str(&format!("\nRanked ({} candidates):\n", outcome.candidates.len()));
    for (i, r) in outcome.ranked.iter().enumerate() {
        let score = r
            .score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("  {:>2}. [{:>9}] {}\n", i + 1, score, r.candidate.text));
    }
    out
}

/// The statements the pipeline corresponds to on the external extension.
pub fn sql_script(settings: &Settings) -> String {
    let schema = settings.schema();
    let statements = [
        sql::create_extension(),
        sql::create_table(&schema),
        sql::create_index(&schema, &settings.dense_index()),
        sql::create_index(&schema, &settings.sparse_index()),
        sql::insert(&schema),
        sql::nearest(
            &schema,
            VectorColumn::Dense,
            settings.retrieval.dense_metric,
            settings.retrieval.dense_k,
        ),
        sql::nearest(
            &schema,
            VectorColumn::Sparse,
            settings.retrieval.sparse_metric,
            settings.retrieval.sparse_k,
        ),
    ];
    statements.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_plain_corpus_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.txt");
        fs::write(&path, "What is BM25?\n\n  Definition of BM25  \n").unwrap();
        assert_eq!(read_corpus(&path).unwrap(), vec!["What is BM25?", "Definition of BM25"]);
    }

    #[test]
    fn test_read_jsonl_corpus() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.jsonl");
        fs::write(&path, "{\"text\": \"first\"}\n{\"text\": \"second\", \"id\": 7}\n").unwrap();
        assert_eq!(read_corpus(&path).unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_read_jsonl_reports_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.jsonl");
        fs::write(&path, "{\"text\": \"ok\"}\nnot json\n").unwrap();
        let err = format!("{:#}", read_corpus(&path).unwrap_err());
        assert!(err.contains(":2:"), "{}", err);
    }

    #[test]
    fn test_index_then_search_appends() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.embedding.dense_dims = 64;
        settings.embedding.sparse_dims = 10_000;
        let corpus = dir.path().join("docs.txt");
        fs::write(&corpus, "What is BM25?\nDefinition of BM25\n").unwrap();

        let data_dir = dir.path().join("data");
        index(&settings, &corpus, Some(data_dir.clone())).unwrap();
        index(&settings, &corpus, Some(data_dir.clone())).unwrap();

        let loaded = store::load_store(&store::snapshot_path(&data_dir, "documents")).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.indexes().len(), 2);
    }

    #[test]
    fn test_search_requires_snapshot() {
        let dir = TempDir::new().unwrap();
        let opts = SearchOptions {
            data_dir: Some(dir.path().to_path_buf()),
            top_k: None,
            fusion: None,
            rerank: true,
            json: false,
        };
        assert!(search(&Settings::default(), "anything", opts).is_err());
    }

    #[test]
    fn test_sql_script_contains_every_statement() {
        let script = sql_script(&Settings::default());
        assert!(script.starts_with("CREATE EXTENSION IF NOT EXISTS vectors;"));
        assert!(script.contains("dense vector(1024)"));
        assert!(script.contains("documents_dense_idx"));
        assert!(script.contains("sparse svector_dot_ops"));
        assert!(script.contains("ORDER BY sparse <#> $1 LIMIT 5;"));
    }
}
