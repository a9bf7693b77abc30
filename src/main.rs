//! topics - list, read and search a tree of markdown topic notes
//!
//! Notes are laid out as `<topic folder>/<document>.md` under a root directory.

use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topic_index::app::{Format, TopicsApp};
use topic_index::{render, watch};

#[derive(Parser)]
#[command(name = "topics", version, about = "Index a tree of markdown topic notes")]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Include documents in nested folders
    #[arg(long, global = true)]
    recursive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Tree,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List topic folders and their documents
    Scan {
        root: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "tree")]
        format: FormatArg,
        /// Include document bodies in JSON output
        #[arg(long)]
        bodies: bool,
        /// Skip folders that fail to load
        #[arg(long)]
        keep_going: bool,
    },
    /// Print a document's content
    Show {
        folder: String,
        title: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Print a document's heading outline
    Outline {
        folder: String,
        title: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Search document titles and bodies
    Search {
        query: String,
        #[arg(long)]
        root: Option<PathBuf>,
        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,
    },
    /// Print the catalog again whenever the tree changes
    Watch { root: Option<PathBuf> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(level)
        .init();

    let mut app = TopicsApp::new(cli.config)?;
    if cli.recursive {
        app.config.scan.recursive = true;
    }

    let output = match cli.command {
        Command::Scan {
            root,
            format,
            bodies,
            keep_going,
        } => {
            if keep_going {
                app.config.scan.continue_on_error = true;
            }
            let format = match format {
                FormatArg::Tree => Format::Tree,
                FormatArg::Json => Format::Json,
            };
            app.scan(root, format, bodies)?
        }
        Command::Show { folder, title, root } => app.show(root, &folder, &title)?,
        Command::Outline { folder, title, root } => app.outline(root, &folder, &title)?,
        Command::Search { query, root, regex } => app.search(root, &query, regex)?,
        Command::Watch { root } => {
            let root = app.config.resolve_root(root);
            watch::run(&root, &app.config.scan, |catalog| {
                match catalog {
                    Ok(catalog) => println!("{}", render::tree(&catalog)),
                    Err(e) => tracing::error!("Scan failed: {}", e),
                }
                ControlFlow::Continue(())
            })?;
            return Ok(());
        }
    };

    print!("{}", output);
    Ok(())
}
