use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pathseek_indexer::{BuildOptions, Index, IndexBuilder};
use pathseek_protocol::NameFilter;
use pathseek_search::{search_into, CandidateList, SearchSession};

use crate::config::{Overrides, Settings};
use crate::registry::{IndexRegistry, DEFAULT_REGISTRY_CAPACITY};

mod config;
mod output;
mod registry;

#[derive(Parser)]
#[command(name = "pathseek")]
#[command(about = "Fuzzy file path search for jump-to-file pickers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (default: <ROOT>/pathseek.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index for a directory and report what went into it
    Index(IndexArgs),

    /// Rank the files under a directory against one query
    Search(SearchArgs),

    /// Read queries from stdin, one per line, and rank each
    Repl(ReplArgs),
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Only index file names matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    include: Vec<String>,

    /// Skip file names matching this glob (repeatable; ignored with --include)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,
}

#[derive(Args, Clone, Default)]
struct RankArgs {
    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Offer every match to the ranking instead of only non-decreasing scores
    #[arg(long)]
    all_matches: bool,
}

#[derive(Args)]
struct IndexArgs {
    /// Directory to index
    root: PathBuf,

    #[command(flatten)]
    filters: FilterArgs,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Directory to search
    root: PathBuf,

    /// Query; an empty string matches everything
    query: String,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    rank: RankArgs,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ReplArgs {
    /// Directory to start in
    root: PathBuf,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    rank: RankArgs,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // keep stdout clean for JSON consumers
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Search(args) => args.json,
        Commands::Repl(_) => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Index(args) => run_index(args, cli.config),
        Commands::Search(args) => run_search(args, cli.config),
        Commands::Repl(args) => run_repl(args, cli.config),
    }
}

fn overrides(config: Option<PathBuf>, filters: FilterArgs, rank: RankArgs) -> Overrides {
    Overrides {
        config,
        limit: rank.limit,
        include: filters.include,
        exclude: filters.exclude,
        all_matches: rank.all_matches,
    }
}

fn build_index(root: &Path, settings: &Settings) -> Result<Index> {
    let filter = NameFilter::new(&settings.include, &settings.exclude)?;
    let options = BuildOptions {
        arena: settings.arena,
        cancel: None,
    };
    IndexBuilder::new(root, filter)
        .with_options(options)
        .build()
        .with_context(|| format!("Failed to index {}", root.display()))
}

fn run_index(args: IndexArgs, config: Option<PathBuf>) -> Result<()> {
    let overrides = overrides(config, args.filters, RankArgs::default());
    let settings = Settings::resolve(&args.root, &overrides)?;
    let index = build_index(&args.root, &settings)?;

    let mut out = io::stdout().lock();
    output::write_stats(&mut out, index.root(), index.stats(), args.json)
}

fn run_search(args: SearchArgs, config: Option<PathBuf>) -> Result<()> {
    let overrides = overrides(config, args.filters, args.rank);
    let settings = Settings::resolve(&args.root, &overrides)?;
    let index = build_index(&args.root, &settings)?;

    let mut candidates = CandidateList::new(settings.limit)?;
    search_into(
        &index,
        args.query.as_bytes(),
        settings.admission,
        &mut candidates,
    );

    let mut out = io::stdout().lock();
    output::write_matches(&mut out, &candidates.to_records(), args.json)
}

enum ReplInput<'a> {
    Query(&'a str),
    Rescan,
    ChangeDir(&'a str),
    Quit,
}

impl<'a> ReplInput<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            ":q" | ":quit" => ReplInput::Quit,
            ":rescan" => ReplInput::Rescan,
            _ => match line.strip_prefix(":cd ") {
                Some(dir) => ReplInput::ChangeDir(dir.trim()),
                None => ReplInput::Query(line),
            },
        }
    }
}

enum ReplSwitch {
    Rescan,
    ChangeDir(PathBuf),
}

fn run_repl(args: ReplArgs, config: Option<PathBuf>) -> Result<()> {
    let overrides = overrides(config, args.filters, args.rank);
    let build_overrides = overrides.clone();
    let mut registry = IndexRegistry::new(DEFAULT_REGISTRY_CAPACITY, move |root: &Path| {
        let settings = Settings::resolve(root, &build_overrides)?;
        build_index(root, &settings)
    });

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut out = io::stdout().lock();
    let mut root = args.root;

    loop {
        let settings = Settings::resolve(&root, &overrides)?;
        let index = registry.get_or_build(&root)?;
        let mut session = SearchSession::new(index, settings.limit)?.with_admission(settings.admission);

        let switch = loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line.context("Failed to read query")?;

            match ReplInput::parse(&line) {
                ReplInput::Quit => return Ok(()),
                ReplInput::Rescan => break ReplSwitch::Rescan,
                ReplInput::ChangeDir(dir) => {
                    let target = root.join(dir);
                    if target.is_dir() {
                        break ReplSwitch::ChangeDir(target);
                    }
                    writeln!(out, "not a directory: {}", target.display())?;
                }
                ReplInput::Query(query) => {
                    let records = session.search(query.as_bytes()).to_records();
                    output::write_matches(&mut out, &records, false)?;
                }
            }
        };

        match switch {
            ReplSwitch::Rescan => {
                registry.rescan(&root)?;
            }
            ReplSwitch::ChangeDir(target) => root = target,
        }
    }
}
