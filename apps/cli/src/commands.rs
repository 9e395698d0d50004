//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use pressroom_core::{
    ArticleRenderer, BuildConfig, BuildResult, ContentStore, ProgressReporter, RenderOptions,
    RenderedArticle, build_site, render_page,
};
use pressroom_shared::{
    AppConfig, Toc, init_config, init_config_at, load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Pressroom: tutorial articles with anchored headings and outlines.
#[derive(Parser)]
#[command(
    name = "pressroom",
    version,
    about = "Browse, check, and publish tutorial articles.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.pressroom/pressroom.toml).
    #[arg(long, global = true, env = "PRESSROOM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Content directory (overrides `content.content_dir`).
    #[arg(long, global = true)]
    pub content: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output format for a single article.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ArticleFormat {
    Text,
    Json,
    Html,
}

/// Output format for an outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum TocFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List articles, most recent first.
    List {
        /// Only show articles with this tag.
        #[arg(long)]
        tag: Option<String>,
    },

    /// Render one article.
    Show {
        /// Article slug.
        slug: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: ArticleFormat,
    },

    /// Print an article's table of contents.
    Toc {
        /// Article slug.
        slug: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: TocFormat,
    },

    /// Load and validate every article.
    Check,

    /// Write the static site.
    Build {
        /// Output directory (overrides `content.output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pressroom=info",
        1 => "pressroom=debug",
        _ => "pressroom=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    // `config init` must work even when the current file does not parse.
    if let Command::Config {
        action: ConfigAction::Init,
    } = cli.command
    {
        return cmd_config_init(&cli);
    }

    let config = resolve_config(&cli)?;

    match cli.command {
        Command::List { ref tag } => cmd_list(&cli, &config, tag.as_deref()),
        Command::Show { ref slug, format } => cmd_show(&cli, &config, slug, format),
        Command::Toc { ref slug, format } => cmd_toc(&cli, &config, slug, format),
        Command::Check => cmd_check(&cli, &config),
        Command::Build { ref out } => cmd_build(&cli, &config, out.clone()),
        Command::Config { ref action } => match action {
            ConfigAction::Init => cmd_config_init(&cli),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn content_dir(cli: &Cli, config: &AppConfig) -> PathBuf {
    cli.content
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.content.content_dir))
}

fn open_store(cli: &Cli, config: &AppConfig) -> Result<ContentStore> {
    let dir = content_dir(cli, config);
    let store = ContentStore::load_dir(&dir)
        .wrap_err_with(|| format!("failed to load content from '{}'", dir.display()))?;
    Ok(store)
}

fn renderer(config: &AppConfig) -> ArticleRenderer {
    ArticleRenderer::new(RenderOptions::from(&config.render))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_list(cli: &Cli, config: &AppConfig, tag: Option<&str>) -> Result<()> {
    let store = open_store(cli, config)?;
    let summaries = match tag {
        Some(tag) => store.by_tag(tag),
        None => store.list(),
    };

    info!(count = summaries.len(), tag = tag.unwrap_or("*"), "listing articles");

    if summaries.is_empty() {
        println!("No articles found.");
        return Ok(());
    }

    let width = summaries.iter().map(|s| s.slug.len()).max().unwrap_or(0);
    for summary in &summaries {
        println!(
            "{}  {:<width$}  {}",
            summary.published.format("%Y-%m-%d"),
            summary.slug,
            summary.title
        );
    }
    Ok(())
}

fn cmd_show(cli: &Cli, config: &AppConfig, slug: &str, format: ArticleFormat) -> Result<()> {
    let store = open_store(cli, config)?;
    let article = store.get(slug)?;
    let rendered = renderer(config).render(article);

    match format {
        ArticleFormat::Text => print!("{}", format_article_text(&rendered)),
        ArticleFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered)?),
        ArticleFormat::Html => {
            let neighbors = store.neighbors(slug)?;
            print!("{}", render_page(&rendered, &config.site, &neighbors));
        }
    }
    Ok(())
}

fn cmd_toc(cli: &Cli, config: &AppConfig, slug: &str, format: TocFormat) -> Result<()> {
    let store = open_store(cli, config)?;
    let rendered = renderer(config).render(store.get(slug)?);

    match format {
        TocFormat::Text => print!("{}", format_toc_text(&rendered.toc)),
        TocFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered.toc)?),
    }
    Ok(())
}

fn cmd_check(cli: &Cli, config: &AppConfig) -> Result<()> {
    let store = open_store(cli, config)?;
    let renderer = renderer(config);

    let mut headings = 0;
    for article in store.iter() {
        headings += renderer.render(article).headings().count();
    }

    println!(
        "OK: {} article(s), {} heading(s) in {}",
        store.len(),
        headings,
        content_dir(cli, config).display()
    );
    Ok(())
}

fn cmd_build(cli: &Cli, config: &AppConfig, out: Option<PathBuf>) -> Result<()> {
    let store = open_store(cli, config)?;

    let build_config = BuildConfig {
        output_root: out.unwrap_or_else(|| PathBuf::from(&config.content.output_dir)),
        site: config.site.clone(),
        generator_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    info!(
        articles = store.len(),
        out = %build_config.output_root.display(),
        "building site"
    );

    let reporter = CliProgress::new();
    let result = build_site(&store, &renderer(config), &build_config, &reporter)?;

    println!();
    println!("  Site built successfully!");
    println!("  Articles: {}", result.article_count);
    println!("  Files:    {}", result.manifest.pages.len() + 1);
    println!("  Path:     {}", result.output_root.display());
    println!("  Time:     {:.2}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_config_init(cli: &Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => {
            init_config_at(path)?;
            path.clone()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Indented outline, two spaces per nesting level.
fn format_toc_text(toc: &Toc) -> String {
    let mut out = String::new();
    for (depth, entry) in toc.flatten() {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("- {} (#{})\n", entry.text, entry.anchor));
    }
    out
}

fn format_article_text(article: &RenderedArticle) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", article.meta.title));
    out.push_str(&format!(
        "by {} on {} ({} min read)\n",
        article.meta.author,
        article.meta.published.format("%Y-%m-%d"),
        article.reading_minutes
    ));
    if !article.meta.summary.is_empty() {
        out.push_str(&format!("\n{}\n", article.meta.summary));
    }
    if !article.toc.is_empty() {
        out.push_str("\nContents:\n");
        out.push_str(&format_toc_text(&article.toc));
    }
    out
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn article_written(&self, slug: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Rendering [{current}/{total}] {slug}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_shared::TocEntry;
    use uuid::Uuid;

    #[test]
    fn parses_show_with_format() {
        let cli = Cli::try_parse_from(["pressroom", "show", "responsive-navbar", "-f", "json"])
            .expect("parse");
        match cli.command {
            Command::Show { slug, format } => {
                assert_eq!(slug, "responsive-navbar");
                assert_eq!(format, ArticleFormat::Json);
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pressroom", "build", "--out", "site", "--content", "posts", "-vv"])
            .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.content.as_deref(), Some(std::path::Path::new("posts")));
        assert!(matches!(cli.command, Command::Build { out: Some(_) }));
    }

    #[test]
    fn config_init_rewrites_broken_config_file() {
        let dir = std::env::temp_dir().join(format!("pressroom_cli_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pressroom.toml");
        std::fs::write(&path, "[render]\nwords_per_minute = 0\n").unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["pressroom", "--config", path_arg.as_str(), "config", "init"])
            .expect("parse");
        run(cli).expect("config init");

        let config = load_config_from(&path).expect("load rewritten config");
        assert_eq!(config.render.words_per_minute, 200);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn toc_text_is_indented_by_depth() {
        let toc = Toc {
            entries: vec![TocEntry {
                text: "Markup".into(),
                anchor: "markup".into(),
                level: 2,
                children: vec![TocEntry {
                    text: "Toggle".into(),
                    anchor: "toggle".into(),
                    level: 3,
                    children: vec![],
                }],
            }],
        };
        assert_eq!(format_toc_text(&toc), "- Markup (#markup)\n  - Toggle (#toggle)\n");
    }
}
