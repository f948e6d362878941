use crate::config::HarvestConfig;
use crate::convert::{convert, ValidationError};
use crate::db::{PersistenceError, SaveOutcome, SqliteTemplateStore, TemplateStore};
use crate::models::{CanvasSize, ScrapedRecord, TemplateRecord};

/// What happened to the converted template on the storage side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// Persistence was not requested.
    Skipped,
    Saved { created: bool },
    /// The store rejected the write or was unreachable. Already logged.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOutcome {
    pub template: TemplateRecord,
    pub persistence: PersistenceStatus,
}

/// Converts scraped layouts and, when asked, upserts them into the template store.
///
/// Conversion errors propagate. Storage errors are logged and reported in
/// [`ConvertOutcome::persistence`], never returned, so one failing write cannot
/// stop a scrape that is working through many components.
pub struct TemplatePipeline {
    config: HarvestConfig,
    store: Option<Box<dyn TemplateStore + Send + Sync>>,
}

impl TemplatePipeline {
    /// The store is resolved from `config.connection_string` whenever a save runs.
    pub fn new(config: HarvestConfig) -> Self {
        Self { config, store: None }
    }

    /// Use an explicit store instead of the configured connection string.
    pub fn with_store(mut self, store: Box<dyn TemplateStore + Send + Sync>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// The scraped viewport when usable, otherwise the configured default.
    pub fn canvas_for(&self, scraped: &ScrapedRecord) -> CanvasSize {
        scraped
            .viewport
            .and_then(|vp| vp.as_canvas())
            .unwrap_or(self.config.default_canvas)
    }

    pub fn convert(
        &self,
        scraped: &ScrapedRecord,
        name: Option<&str>,
    ) -> Result<TemplateRecord, ValidationError> {
        convert(scraped, name, self.canvas_for(scraped))
    }

    /// Upsert one template. Fails when no store is configured.
    pub fn save(&self, template: &TemplateRecord) -> Result<SaveOutcome, PersistenceError> {
        if let Some(store) = &self.store {
            return store.save(template);
        }
        let conn_str = self
            .config
            .connection_string
            .as_deref()
            .ok_or(PersistenceError::MissingConnectionString)?;
        SqliteTemplateStore::from_connection_string(conn_str)?.save(template)
    }

    /// Convert, then persist if `persist` is set, reporting how the save went.
    pub fn process(
        &self,
        scraped: &ScrapedRecord,
        name: Option<&str>,
        persist: bool,
    ) -> Result<ConvertOutcome, ValidationError> {
        let template = self.convert(scraped, name)?;

        let persistence = if persist {
            match self.save(&template) {
                Ok(outcome) => PersistenceStatus::Saved {
                    created: outcome.created,
                },
                Err(e) => {
                    tracing::warn!(
                        template_id = %template.template_id,
                        error = %e,
                        "Template converted but not saved"
                    );
                    PersistenceStatus::Failed(e.to_string())
                }
            }
        } else {
            PersistenceStatus::Skipped
        };

        Ok(ConvertOutcome {
            template,
            persistence,
        })
    }

    /// Convert and optionally persist; returns the template whether or not the save worked.
    pub fn convert_and_save(
        &self,
        scraped: &ScrapedRecord,
        name: Option<&str>,
        persist: bool,
    ) -> Result<TemplateRecord, ValidationError> {
        self.process(scraped, name, persist).map(|outcome| outcome.template)
    }

    /// Hook for the scrape loop once layout analysis has produced a record.
    /// Persists according to `config.persist_enabled`.
    pub fn after_layout_analysis(
        &self,
        scraped: &ScrapedRecord,
        name: Option<&str>,
    ) -> Result<TemplateRecord, ValidationError> {
        self.convert_and_save(scraped, name, self.config.persist_enabled)
    }
}
