//! Catalog export loading. JSON and CSV exports both arrive as loosely
//! filled records; rows keep their file position as `source_ref` and rows
//! without an id are assigned one.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use uuid::Uuid;

use dupesift_core::CatalogItem;

/// One row/element of an export file. Every field is optional here; the
/// engine itself decides what is usable and warns about the rest.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

pub fn load(path: &Path) -> Result<Vec<CatalogItem>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => load_json(path),
        Some("csv") => load_csv(path),
        _ => bail!(
            "unsupported catalog format for {} (expected .json or .csv)",
            path.display()
        ),
    }
}

fn load_json(path: &Path) -> Result<Vec<CatalogItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<RawRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {} as a JSON catalog array", path.display()))?;
    Ok(records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| into_item(record, idx))
        .collect())
}

fn load_csv(path: &Path) -> Result<Vec<CatalogItem>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut items = Vec::new();
    for (idx, result) in reader.deserialize::<RawRecord>().enumerate() {
        let record =
            result.with_context(|| format!("bad CSV row {} in {}", idx + 2, path.display()))?;
        items.push(into_item(record, idx));
    }
    Ok(items)
}

fn into_item(record: RawRecord, position: usize) -> CatalogItem {
    let id = non_empty(record.id).unwrap_or_else(|| Uuid::now_v7().to_string());
    CatalogItem {
        id: id.into(),
        title: record.title.unwrap_or_default(),
        author: non_empty(record.author),
        description: non_empty(record.description),
        category: non_empty(record.category),
        source_ref: position as u64,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
