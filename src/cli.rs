use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::config::HarvestConfig;
use crate::db::{list_templates, PersistenceError, SqliteTemplateStore};
use crate::models::{CanvasSize, ScreenType, Source};
use crate::pipeline::{
    convert_library, read_scraped, write_template_json, BatchOptions, PersistenceStatus,
    PipelineError, TemplatePipeline,
};

#[derive(Parser, Debug)]
#[command(
    name = "uikit-harvest",
    version,
    about = "Convert scraped component layouts into pixel-space templates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a single layout.json.
    Convert(ConvertArgs),
    /// Convert every layout in a scraped library.
    Batch(BatchArgs),
    /// List templates in the store.
    List(ListArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Template store location; overrides DATABASE_URL.
    #[arg(long)]
    pub database_url: Option<String>,

    /// Save converted templates; SAVE_TO_DB enables this too.
    #[arg(long, conflicts_with = "dry_run")]
    pub persist: bool,

    /// Never save, whatever SAVE_TO_DB says.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Layout JSON produced by the scraper.
    pub layout: PathBuf,

    /// Template name override.
    #[arg(long)]
    pub name: Option<String>,

    /// Write the template here instead of printing it.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Canvas used when the layout has no viewport, e.g. 1920x1080.
    #[arg(long)]
    pub canvas: Option<CanvasSize>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Library root (the scraper's output directory).
    #[arg(default_value = "library")]
    pub root: PathBuf,

    /// Only this source: aceternity, aura or magic.
    #[arg(long)]
    pub source: Option<Source>,

    /// Maximum components per source.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Skip writing template.json next to each layout.
    #[arg(long)]
    pub no_write: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Template store location; overrides DATABASE_URL.
    #[arg(long)]
    pub database_url: Option<String>,

    /// Only templates of this screen type.
    #[arg(long)]
    pub screen_type: Option<ScreenType>,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Could not write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Could not serialize template: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreArgs {
    /// Overlay command-line flags on the environment-derived config.
    pub fn apply(&self, mut config: HarvestConfig) -> HarvestConfig {
        if let Some(url) = &self.database_url {
            config.connection_string = Some(url.clone());
        }
        if self.persist {
            config.persist_enabled = true;
        }
        if self.dry_run {
            config.persist_enabled = false;
        }
        config
    }
}

pub fn execute(cli: Cli, env_config: HarvestConfig) -> Result<(), CliError> {
    match cli.command {
        Command::Convert(args) => convert(args, env_config),
        Command::Batch(args) => batch(args, env_config),
        Command::List(args) => list(args, env_config),
    }
}

fn convert(args: ConvertArgs, env_config: HarvestConfig) -> Result<(), CliError> {
    let mut config = args.store.apply(env_config);
    if let Some(canvas) = args.canvas {
        config.default_canvas = canvas;
    }
    let persist = config.persist_enabled;
    let pipeline = TemplatePipeline::new(config);

    let scraped = read_scraped(&args.layout)?;
    let outcome = pipeline
        .process(&scraped, args.name.as_deref(), persist)
        .map_err(PipelineError::from)?;

    match &outcome.persistence {
        PersistenceStatus::Saved { created } => {
            tracing::info!(template_id = %outcome.template.template_id, created, "Saved to store");
        }
        PersistenceStatus::Failed(reason) => {
            tracing::warn!(%reason, "Template was not saved");
        }
        PersistenceStatus::Skipped => {}
    }

    match &args.output {
        Some(path) => write_template_json(path, &outcome.template)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &outcome.template)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn batch(args: BatchArgs, env_config: HarvestConfig) -> Result<(), CliError> {
    let config = args.store.apply(env_config);
    let options = BatchOptions {
        sources: args.source.map_or_else(|| Source::ALL.to_vec(), |s| vec![s]),
        limit: args.limit,
        persist: config.persist_enabled,
        write_templates: !args.no_write,
    };
    let pipeline = TemplatePipeline::new(config);
    let summary = convert_library(&pipeline, &args.root, &options)?;

    println!(
        "converted: {}, persisted: {}, persist failed: {}, failed: {}",
        summary.converted, summary.persisted, summary.persist_failed, summary.failed
    );
    Ok(())
}

fn list(args: ListArgs, env_config: HarvestConfig) -> Result<(), CliError> {
    let conn_str = args
        .database_url
        .or(env_config.connection_string)
        .ok_or(PersistenceError::MissingConnectionString)?;
    let store = SqliteTemplateStore::from_connection_string(&conn_str)?;
    let conn = store.connect()?;

    let mut stdout = std::io::stdout().lock();
    for t in list_templates(&conn, args.screen_type)? {
        writeln!(stdout, "{}\t{}\t{}\t{}", t.id, t.screen_type, t.updated_at, t.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn parses_convert_command() {
        let cli = Cli::try_parse_from([
            "uikit-harvest", "convert", "layout.json", "--name", "Hero", "--canvas", "1920x1080", "--persist",
        ])
        .unwrap();
        match cli.command {
            Command::Convert(args) => {
                assert_eq!(args.layout, PathBuf::from("layout.json"));
                assert_eq!(args.name.as_deref(), Some("Hero"));
                assert_eq!(args.canvas, CanvasSize::new(1920, 1080));
                assert!(args.store.persist);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_batch_source() {
        let cli = Cli::try_parse_from(["uikit-harvest", "batch", "out", "--source", "magic", "--limit", "5"]).unwrap();
        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.root, PathBuf::from("out"));
                assert_eq!(args.source, Some(Source::Magic));
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["uikit-harvest", "batch", "--source", "shadcn"]).is_err());
    }

    #[test]
    fn persist_and_dry_run_conflict() {
        assert!(Cli::try_parse_from(["uikit-harvest", "convert", "l.json", "--persist", "--dry-run"]).is_err());
    }

    #[test]
    fn flags_override_environment() {
        let env = HarvestConfig {
            persist_enabled: true,
            connection_string: Some("env.db".into()),
            ..HarvestConfig::default()
        };
        let args = StoreArgs {
            database_url: Some("cli.db".into()),
            persist: false,
            dry_run: true,
        };
        let config = args.apply(env.clone());
        assert!(!config.persist_enabled);
        assert_eq!(config.connection_string.as_deref(), Some("cli.db"));

        assert_eq!(StoreArgs::default().apply(env.clone()), env);
    }

    #[test]
    fn convert_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = dir.path().join("layout.json");
        std::fs::write(
            &layout,
            r#"{"id": "x", "sections": [], "slots": [{"id": "a", "type": "image"}]}"#,
        )
        .unwrap();
        let output = dir.path().join("template.json");

        let cli = Cli::try_parse_from([
            OsStr::new("uikit-harvest"),
            OsStr::new("convert"),
            layout.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ])
        .unwrap();
        execute(cli, HarvestConfig::default()).unwrap();

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["templateId"], "x");
        assert_eq!(written["slots"][0]["type"], "image");
    }

    #[test]
    fn convert_reports_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let layout = dir.path().join("layout.json");
        std::fs::write(&layout, r#"{"id": "x", "slots": []}"#).unwrap();

        let cli = Cli::try_parse_from([OsStr::new("uikit-harvest"), OsStr::new("convert"), layout.as_os_str()]).unwrap();
        let err = execute(cli, HarvestConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Pipeline(PipelineError::Validation(_))));
    }
}
