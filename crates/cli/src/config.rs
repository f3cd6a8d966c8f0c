//! TOML settings for the `hybridsearch` binary.
//!
//! Every section is optional; missing keys fall back to the core defaults.
//!
//! ```toml
//! [embedding]
//! dense_dims = 1024
//! sparse_dims = 250002
//!
//! [retrieval]
//! dense_k = 5
//! sparse_k = 5
//! dense_metric = "euclidean"
//! sparse_metric = "dot_product"
//! fusion = { method = "rrf", k = 60.0 }
//!
//! [index.dense]
//! metric = "euclidean"
//! algorithm = "hnsw"
//! m = 16
//! ef_construction = 100
//!
//! [store]
//! table = "documents"
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use anyhow::{Context, Result};
use hybridsearch_core::config as defaults;
use hybridsearch_core::search::RetrievalConfig;
use hybridsearch_core::store::{IndexAlgorithm, IndexSpec, Schema, VectorColumn};
use hybridsearch_core::vector::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalConfig,
    pub index: IndexSettings,
    pub store: StoreSettings,
    pub logging: LoggingConfig,
}

/// Dimensions of the embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub dense_dims: usize,
    pub sparse_dims: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            dense_dims: defaults::DEFAULT_DENSE_DIMS,
            sparse_dims: defaults::DEFAULT_SPARSE_DIMS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub dense: ColumnIndexSettings,
    pub sparse: ColumnIndexSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    Hnsw,
    Flat,
}

/// Index options for one vector column. A missing `metric` falls back to the
/// column's retrieval metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnIndexSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<DistanceMetric>,
    #[serde(default = "default_algorithm")]
    pub algorithm: AlgorithmKind,
    /// HNSW only.
    #[serde(default = "default_m")]
    pub m: usize,
    /// HNSW only.
    #[serde(default = "default_ef_construction")]
    pub ef_construction: usize,
}

fn default_algorithm() -> AlgorithmKind {
    AlgorithmKind::Hnsw
}

fn default_m() -> usize {
    defaults::HNSW_DEFAULT_M
}

fn default_ef_construction() -> usize {
    defaults::HNSW_DEFAULT_EF_CONSTRUCTION
}

impl Default for ColumnIndexSettings {
    fn default() -> Self {
        Self {
            metric: None,
            algorithm: default_algorithm(),
            m: default_m(),
            ef_construction: default_ef_construction(),
        }
    }
}

impl ColumnIndexSettings {
    pub fn to_spec(&self, column: VectorColumn, fallback: DistanceMetric) -> IndexSpec {
        let algorithm = match self.algorithm {
            AlgorithmKind::Hnsw => IndexAlgorithm::Hnsw {
                m: self.m,
                ef_construction: self.ef_construction,
            },
            AlgorithmKind::Flat => IndexAlgorithm::Flat,
        };
        IndexSpec {
            column,
            metric: self.metric.unwrap_or(fallback),
            algorithm,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub table: String,
    pub data_dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            table: defaults::DEFAULT_TABLE.to_string(),
            data_dir: PathBuf::from(defaults::DEFAULT_DATA_DIR),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Log severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: LogLevel::Warn,
        }
    }
}

impl Settings {
    /// Read, parse and validate a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reports every invalid setting at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if let Err(e) = self.schema().validate() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.retrieval.validate() {
            errors.push(e.to_string());
        }
        let columns = [
            ("dense", self.dense_index(), self.retrieval.dense_metric),
            ("sparse", self.sparse_index(), self.retrieval.sparse_metric),
        ];
        for (name, spec, query_metric) in columns {
            if let Err(e) = spec.validate() {
                errors.push(format!("index.{}: {}", name, e));
            }
            if spec.metric != query_metric {
                errors.push(format!(
                    "index.{name} metric ({}) differs from retrieval.{name}_metric ({}); \
                     queries would not use the index",
                    spec.metric, query_metric
                ));
            }
        }
        if self.store.data_dir.as_os_str().is_empty() {
            errors.push("store.data_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::new(
            self.store.table.clone(),
            self.embedding.dense_dims,
            self.embedding.sparse_dims,
        )
    }

    pub fn dense_index(&self) -> IndexSpec {
        self.index
            .dense
            .to_spec(VectorColumn::Dense, self.retrieval.dense_metric)
    }

    pub fn sparse_index(&self) -> IndexSpec {
        self.index
            .sparse
            .to_spec(VectorColumn::Sparse, self.retrieval.sparse_metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridsearch_core::search::Fusion;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.schema(), Schema::new("documents", 1024, 250_002));
        assert_eq!(settings.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            dense_k = 10
            fusion = { method = "rrf" }

            [index.sparse]
            metric = "dot_product"
            algorithm = "flat"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(settings.retrieval.dense_k, 10);
        assert_eq!(settings.retrieval.sparse_k, 5);
        assert_eq!(settings.retrieval.fusion, Fusion::Rrf { k: 60.0 });
        assert_eq!(settings.sparse_index().algorithm, IndexAlgorithm::Flat);
        assert_eq!(settings.dense_index().metric, DistanceMetric::Euclidean);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.level, LogLevel::Warn);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_index_section_without_metric() {
        let settings: Settings = toml::from_str("[index.dense]\nm = 32\n").unwrap();
        assert_eq!(settings.index.dense.metric, None);
        assert_eq!(
            settings.dense_index().algorithm,
            IndexAlgorithm::Hnsw { m: 32, ef_construction: 100 }
        );
        assert_eq!(settings.dense_index().metric, DistanceMetric::Euclidean);
        assert_eq!(settings.sparse_index().metric, DistanceMetric::DotProduct);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_index_metric_follows_retrieval_metric() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            dense_metric = "cosine"

            [index.dense]
            algorithm = "flat"
            "#,
        )
        .unwrap();
        assert_eq!(settings.dense_index().metric, DistanceMetric::Cosine);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let mut settings = Settings::default();
        settings.embedding.dense_dims = 0;
        settings.index.dense.m = 1;
        settings.index.sparse.metric = Some(DistanceMetric::Cosine);
        let msg = settings.validate().unwrap_err().to_string();
        assert!(msg.contains("dense dimension"), "{}", msg);
        assert!(msg.contains("index.dense"), "{}", msg);
        assert!(msg.contains("index.sparse metric"), "{}", msg);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ntable = \"articles\"").unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.store.table, "articles");
    }

    #[test]
    fn test_load_rejects_invalid_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ntable = \"bad name\"").unwrap();
        assert!(Settings::load(file.path()).is_err());
    }
}
