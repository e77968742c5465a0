mod state_write;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use whisker_core::pipeline::{load_story, Importer, Markup, RenderConfig};
use whisker_core::story::{StoryDocument, Variables};
use whisker_core::template::Renderer;
use whisker_frontend_twine::variables::infer_value;
use whisker_frontend_twine::{ImportSummary, TwineImporter};

use state_write::StateWriteRuntime;

#[derive(Parser)]
#[command(name = "whisker", about = "Import and preview interactive fiction stories")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a compiled Twine 2 HTML file into a Whisker story document.
    Import {
        /// Path to the Twine HTML file.
        input: PathBuf,
        /// Where to write the JSON document (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize a story: title, format, counts, and import warnings.
    Info {
        /// Twine HTML file or Whisker JSON document.
        input: PathBuf,
    },
    /// Render one passage through the template evaluator.
    Preview {
        /// Twine HTML file or Whisker JSON document.
        input: PathBuf,
        /// Passage id to render (defaults to the start passage).
        #[arg(long)]
        passage: Option<String>,
        /// Override a variable, as `name=value`. Repeatable.
        #[arg(long = "var")]
        vars: Vec<String>,
        /// Placeholder markup: "html" or "plain" (default from config, else html).
        #[arg(long)]
        markup: Option<String>,
        /// JSON render config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Apply literal `game_state:set(...)` writes instead of showing script placeholders.
        #[arg(long)]
        apply_state_writes: bool,
    },
}

fn importers() -> [&'static dyn Importer; 1] {
    [&TwineImporter]
}

fn load(path: &Path) -> Result<StoryDocument> {
    load_story(path, &importers())
        .with_context(|| format!("failed to load story: {}", path.display()))
}

fn cmd_import(input: &Path, output: Option<&Path>) -> Result<()> {
    let doc = load(input)?;
    let json = serde_json::to_string_pretty(&doc).context("failed to serialize story document")?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote story document");
        }
        None => println!("{json}"),
    }
    eprintln!("{}", ImportSummary::from_document(&doc));
    Ok(())
}

fn cmd_info(input: &Path) -> Result<()> {
    let doc = load(input)?;
    println!("{}", ImportSummary::from_document(&doc));
    Ok(())
}

struct PreviewArgs<'a> {
    passage: Option<&'a str>,
    vars: &'a [String],
    markup: Option<&'a str>,
    config: Option<&'a Path>,
    apply_state_writes: bool,
}

fn cmd_preview(input: &Path, args: &PreviewArgs<'_>) -> Result<()> {
    let doc = load(input)?;

    let passage = match args.passage {
        Some(id) => doc
            .passage(id)
            .with_context(|| format!("no passage with id `{id}`"))?,
        None => match doc.start_passage() {
            Some(p) => p,
            None => bail!(
                "start passage `{}` does not exist; pass --passage",
                doc.settings.start_passage
            ),
        },
    };

    let runtime = StateWriteRuntime;
    let renderer = preview_renderer(args, &runtime)?;

    let mut env = doc.initial_values();
    apply_overrides(&mut env, args.vars)?;

    println!("{}", renderer.render(&passage.content, &mut env));
    for choice in &passage.choices {
        println!("-> {} ({})", choice.text, choice.target);
    }
    Ok(())
}

/// Config file first, then `--markup` on top.
fn preview_renderer<'rt>(
    args: &PreviewArgs<'_>,
    runtime: &'rt StateWriteRuntime,
) -> Result<Renderer<'rt>> {
    let mut config = match args.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    if let Some(name) = args.markup {
        config.markup = match Markup::from_name(name) {
            Some(markup) => markup,
            None => bail!("unknown markup `{name}` (expected \"html\" or \"plain\")"),
        };
    }

    let renderer = Renderer::new(config);
    debug!(
        markup = ?renderer.config().markup,
        preview_chars = renderer.config().script_preview_chars,
        state_writes = args.apply_state_writes,
        "rendering preview"
    );
    Ok(if args.apply_state_writes {
        renderer.with_runtime(runtime)
    } else {
        renderer
    })
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    RenderConfig::from_json(&json)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Apply `name=value` overrides. Values are typed like imported literals.
fn apply_overrides(env: &mut Variables, vars: &[String]) -> Result<()> {
    for var in vars {
        let Some((name, value)) = var.split_once('=') else {
            bail!("invalid --var `{var}` (expected name=value)");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("invalid --var `{var}`: empty name");
        }
        env.insert(name.to_string(), infer_value(value.trim()));
    }
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match &cli.command {
        Command::Import { input, output } => cmd_import(input, output.as_deref()),
        Command::Info { input } => cmd_info(input),
        Command::Preview {
            input,
            passage,
            vars,
            markup,
            config,
            apply_state_writes,
        } => {
            let args = PreviewArgs {
                passage: passage.as_deref(),
                vars,
                markup: markup.as_deref(),
                config: config.as_deref(),
                apply_state_writes: *apply_state_writes,
            };
            cmd_preview(input, &args)
        }
    }
}
