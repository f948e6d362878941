//! On-disk component library written by the scrapers.
//!
//! ```text
//! <root>/<source>/components/<sanitized-name>/metadata.json
//!                                            /layout.json
//!                                            /template.json   (written here)
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tempfile::NamedTempFile;

use super::orchestrator::{PersistenceStatus, TemplatePipeline};
use super::PipelineError;
use crate::models::{ScrapedRecord, Source, TemplateRecord};

pub const COMPONENTS_DIR: &str = "components";
pub const METADATA_FILE: &str = "metadata.json";
pub const LAYOUT_FILE: &str = "layout.json";
pub const TEMPLATE_FILE: &str = "template.json";

/// Directory-safe form of a component name: lowercase, spaces to `-`,
/// only alphanumerics, `-` and `_` kept.
pub fn sanitize_component_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

pub fn components_dir(root: &Path, source: Source) -> PathBuf {
    root.join(source.as_str()).join(COMPONENTS_DIR)
}

pub fn component_dir(root: &Path, source: Source, name: &str) -> PathBuf {
    components_dir(root, source).join(sanitize_component_name(name))
}

/// A component directory holding a layout analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLayout {
    pub source: Source,
    pub dir: PathBuf,
    pub layout_path: PathBuf,
}

/// Component directories under `source` that contain a layout file, sorted by name.
/// A source that was never scraped yields an empty list.
pub fn discover_layouts(root: &Path, source: Source) -> Result<Vec<ComponentLayout>, PipelineError> {
    let dir = components_dir(root, source);
    if !dir.is_dir() {
        tracing::debug!(path = %dir.display(), "No components directory for source");
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))? {
        let entry = entry.map_err(|e| PipelineError::io(&dir, e))?;
        let path = entry.path();
        let layout_path = path.join(LAYOUT_FILE);
        if path.is_dir() && layout_path.is_file() {
            found.push(ComponentLayout {
                source,
                dir: path,
                layout_path,
            });
        }
    }
    found.sort_by(|a, b| a.dir.cmp(&b.dir));
    Ok(found)
}

pub fn read_scraped(path: &Path) -> Result<ScrapedRecord, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(ScrapedRecord::from_json_str(&text)?)
}

#[derive(Deserialize)]
struct ComponentMetadata {
    name: Option<String>,
}

/// Display name recorded by the scraper in `metadata.json`, if readable.
pub fn read_component_name(dir: &Path) -> Option<String> {
    let path = dir.join(METADATA_FILE);
    let text = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<ComponentMetadata>(&text) {
        Ok(meta) => meta.name.filter(|n| !n.trim().is_empty()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Ignoring unreadable metadata");
            None
        }
    }
}

/// Write `template` as pretty JSON, replacing `path` atomically.
pub fn write_template_json(path: &Path, template: &TemplateRecord) -> Result<(), PipelineError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PipelineError::io(parent, e))?;
    serde_json::to_writer_pretty(&mut tmp, template)?;
    tmp.write_all(b"\n").map_err(|e| PipelineError::io(path, e))?;
    tmp.persist(path).map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub sources: Vec<Source>,
    /// Cap on components per source.
    pub limit: Option<usize>,
    pub persist: bool,
    /// Write `template.json` next to each layout.
    pub write_templates: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            sources: Source::ALL.to_vec(),
            limit: None,
            persist: false,
            write_templates: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub persisted: usize,
    /// Converted, but the store rejected or never received the write.
    pub persist_failed: usize,
    /// Could not be read or converted at all.
    pub failed: usize,
}

/// Convert every layout in the library. A failing component is logged and
/// counted, and the batch moves on.
pub fn convert_library(
    pipeline: &TemplatePipeline,
    root: &Path,
    options: &BatchOptions,
) -> Result<BatchSummary, PipelineError> {
    if !root.is_dir() {
        return Err(PipelineError::LibraryNotFound(root.to_path_buf()));
    }

    let mut summary = BatchSummary::default();
    for &source in &options.sources {
        let mut layouts = discover_layouts(root, source)?;
        if let Some(limit) = options.limit {
            layouts.truncate(limit);
        }
        tracing::info!(source = %source, count = layouts.len(), "Converting components");

        for layout in &layouts {
            match convert_component(pipeline, layout, options) {
                Ok(PersistenceStatus::Saved { .. }) => {
                    summary.converted += 1;
                    summary.persisted += 1;
                }
                Ok(PersistenceStatus::Failed(_)) => {
                    summary.converted += 1;
                    summary.persist_failed += 1;
                }
                Ok(PersistenceStatus::Skipped) => summary.converted += 1,
                Err(e) => {
                    tracing::warn!(path = %layout.layout_path.display(), error = %e, "Skipping component");
                    summary.failed += 1;
                }
            }
        }
    }

    tracing::info!(
        converted = summary.converted,
        persisted = summary.persisted,
        persist_failed = summary.persist_failed,
        failed = summary.failed,
        "Batch conversion complete"
    );
    Ok(summary)
}

fn convert_component(
    pipeline: &TemplatePipeline,
    layout: &ComponentLayout,
    options: &BatchOptions,
) -> Result<PersistenceStatus, PipelineError> {
    let scraped = read_scraped(&layout.layout_path)?;
    let name = read_component_name(&layout.dir);
    let outcome = pipeline.process(&scraped, name.as_deref(), options.persist)?;
    if options.write_templates {
        write_template_json(&layout.dir.join(TEMPLATE_FILE), &outcome.template)?;
    }
    Ok(outcome.persistence)
}
