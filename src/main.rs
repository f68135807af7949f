//! taxo CLI: build a taxonomy from a declaration script and query it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use taxonomia::config::TaxonomyConfig;
use taxonomia::export::TaxonomyExport;
use taxonomia::graph::RelationKind;
use taxonomia::graph::closure::Closure;
use taxonomia::message::{JsonSink, NoticeSink, TextSink};
use taxonomia::script::{Script, resolve};
use taxonomia::taxonomy::Taxonomy;
use taxonomia::taxonomy::import::ImportMode;

#[derive(Parser)]
#[command(name = "taxo", version, about = "Constraint-checked class and concept taxonomies")]
struct Cli {
    /// Taxonomy configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How notices are printed on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    notices: NoticeFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum NoticeFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Checked,
    Raw,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Checked => ImportMode::Checked,
            ModeArg::Raw => ImportMode::Raw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a declaration script and show statistics.
    Apply {
        /// Path to the JSON declaration script.
        script: PathBuf,
    },

    /// Compute a closure for one entity.
    Closure {
        script: PathBuf,
        /// Closure name, e.g. `super_classes` or `broader_concepts`.
        closure: String,
        /// Entity name as used in the script.
        entity: String,
    },

    /// Check whether a relation holds between two entities.
    Check {
        script: PathBuf,
        /// Relation kind, e.g. `subClassOf` or `broader`.
        kind: String,
        subject: String,
        object: String,
    },

    /// Print the taxonomy built by a script as JSON.
    Export { script: PathBuf },

    /// Load a previous export (entities, edges and labels) and show statistics.
    Import {
        /// Path to an export JSON file.
        file: PathBuf,
        #[arg(long, value_enum, default_value = "checked")]
        mode: ModeArg,
    },

    /// Print the active constraint profile as TOML.
    Profile,

    /// List the available closure names.
    Closures,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TaxonomyConfig::load(path)?,
        None => TaxonomyConfig::default(),
    };
    let sink: Arc<dyn NoticeSink> = match cli.notices {
        NoticeFormat::Text => Arc::new(TextSink::new(std::io::stderr())),
        NoticeFormat::Json => Arc::new(JsonSink::new(std::io::stderr())),
    };
    let build = |script: &PathBuf| -> Result<Taxonomy> {
        let mut taxonomy = Taxonomy::new(config.clone())?.with_sink(sink.clone());
        Script::load(script)?.apply(&mut taxonomy)?;
        taxonomy.materialize();
        Ok(taxonomy)
    };

    match cli.command {
        Commands::Apply { script } => {
            let taxonomy = build(&script)?;
            println!("{}", taxonomy.info());
        }

        Commands::Closure {
            script,
            closure,
            entity,
        } => {
            let Some(closure) = Closure::from_name(&closure) else {
                miette::bail!("unknown closure \"{closure}\"; run `taxo closures` for the list");
            };
            let taxonomy = build(&script)?;
            let id = resolve(&taxonomy, &entity)?;
            let mut names: Vec<String> = taxonomy
                .answer(closure, id)
                .into_iter()
                .map(|e| taxonomy.registry().display_name(e))
                .collect();
            names.sort();
            if names.is_empty() {
                println!("{closure}({entity}) is empty.");
            } else {
                println!("{closure}({entity}) ({}):", names.len());
                for name in &names {
                    println!("  {name}");
                }
            }
        }

        Commands::Check {
            script,
            kind,
            subject,
            object,
        } => {
            let Some(kind) = RelationKind::from_term(&kind) else {
                miette::bail!("unknown relation kind \"{kind}\"");
            };
            let taxonomy = build(&script)?;
            let s = resolve(&taxonomy, &subject)?;
            let o = resolve(&taxonomy, &object)?;
            println!("{kind}({subject}, {object}): {}", taxonomy.holds(kind, s, o));
        }

        Commands::Export { script } => {
            let taxonomy = build(&script)?;
            let json = taxonomy.export().to_json_pretty().into_diagnostic()?;
            println!("{json}");
        }

        Commands::Import { file, mode } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            let export: TaxonomyExport = serde_json::from_str(&content).into_diagnostic()?;
            let mut taxonomy = Taxonomy::new(config.clone())?.with_sink(sink.clone());
            let summary = taxonomy.import_export(&export, mode.into())?;
            println!("Imported {} edges from {}: {summary}", summary.total(), file.display());
            println!("{}", taxonomy.info());
        }

        Commands::Profile => {
            let profile = config.profile()?;
            println!("{}", profile.to_toml_string()?);
        }

        Commands::Closures => {
            for closure in Closure::ALL {
                println!("{:<24} {}", closure.name(), closure.family());
            }
        }
    }

    Ok(())
}
