use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quire::build::build_site;
use quire::config::Config;
use quire::parser::Parser as PostParser;
use quire::post::slug_for;
use quire::watch::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quire", version, about = "A static blog generator")]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
struct BuildArgs {
    /// The project directory; `quire.yaml` is searched for here and in its
    /// parents
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// The output directory [default: `dist` in the project directory]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep running and rebuild whenever posts, templates, or assets change
    #[arg(short, long, default_value = "false")]
    watch: bool,
}

#[derive(Parser)]
struct ListArgs {
    /// The project directory
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Also list drafts, including those in excluded directories
    #[arg(short, long, default_value = "false")]
    drafts: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory
    Build(BuildArgs),

    /// List posts, newest first
    List(ListArgs),
}

fn main() -> Result<()> {
    init_tracing();
    match Args::parse().command {
        Command::Build(args) => build(&args),
        Command::List(args) => list(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(project: &Path, output: Option<&Path>) -> Result<Config> {
    let project = std::fs::canonicalize(project)
        .with_context(|| format!("resolving project directory `{}`", project.display()))?;
    Config::from_directory(&project, output)
}

fn build(args: &BuildArgs) -> Result<()> {
    let config = load_config(&args.project, args.output.as_deref())?;
    if args.watch {
        return Ok(watch(&config)?);
    }

    build_site(&config)?;
    Ok(())
}

fn list(args: &ListArgs) -> Result<()> {
    let config = load_config(&args.project, None)?;
    let mut parser = PostParser::new(&config.excluded_directories);
    if args.drafts {
        parser = parser.with_drafts();
    }
    let loaded = parser.parse_posts(&config.posts_source_directory)?;
    for source in &loaded.sources {
        println!(
            "{:<9} {} {:<40} {}",
            source.status,
            source.date,
            slug_for(source).unwrap_or_default(),
            source.title
        );
    }
    Ok(())
}
