//! CLI entry point for the note organiser backend.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use noteorg_core::{
    app_data_dir, append_post, create_notebook, find_posts, fuzzy_match, init_logging,
    load_config, load_notebook, preview_notebook, status, write_preview, Config, PostEntry,
    TagTable,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "noteorg")]
#[command(about = "Note organiser: notebooks of dated, tagged posts")]
struct Cli {
    /// Log level (trace|debug|info|warn|error). Defaults to the configured one.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend status and active configuration.
    Status,
    /// Show where the config file is stored (app data directory).
    DataDir,
    /// List the title and posts of a notebook.
    Posts {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Print the preview markdown of a notebook, keeping posts with every given tag.
    Preview {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Tag to filter on; repeat to narrow further.
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Print markdown and tag table as JSON.
        #[arg(long)]
        json: bool,
        /// Do not write the markdown to the preview folder.
        #[arg(long)]
        no_cache: bool,
    },
    /// Print the tags of the posts matching the filter, most frequent first.
    Tags {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Append a new post, dated today, to a notebook.
    NewPost {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(long)]
        title: String,
        /// Comma or semicolon separated tags.
        #[arg(long)]
        tags: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Create an empty notebook.
    NewNotebook {
        #[arg(value_name = "NAME")]
        name: String,
        /// Folder to create it in. Defaults to the library root.
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Find posts whose title loosely matches a query.
    Find {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(value_name = "QUERY")]
        query: String,
    },
}

#[derive(Serialize)]
struct PreviewOutput<'a> {
    markdown: String,
    tags: &'a TagTable,
    cache: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config();

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(e) = init_logging(level) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command.unwrap_or(Commands::Status), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Status => {
            println!("Note organiser backend");
            println!("  core: {}", status());
            match config.library_root() {
                Some(root) => println!("  library: {}", root.display()),
                None => println!("  library: (no home directory)"),
            }
            println!("  extension: .{}", config.extension);
        }
        Commands::DataDir => match app_data_dir() {
            Some(p) => println!("{}", p.display()),
            None => eprintln!("Could not determine app data directory."),
        },
        Commands::Posts { path } => {
            let notebook = load_notebook(&path)?;
            println!("{} ({} post(s))", notebook.title, notebook.posts.len());
            for post in &notebook.posts {
                println!("  {}  {}  [{}]", post.date, post.title, post.tags.join(", "));
            }
        }
        Commands::Preview {
            path,
            tags,
            json,
            no_cache,
        } => {
            let projection = preview_notebook(&path, &tags)?;
            let cache = if no_cache {
                None
            } else {
                Some(write_preview(&path, &tags, &projection, config)?)
            };
            if json {
                let output = PreviewOutput {
                    markdown: projection.markdown_text(),
                    tags: &projection.tags,
                    cache,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", projection.markdown_text());
                if let Some(cache) = cache {
                    debug!("event=preview_cached module=cli path={}", cache.display());
                }
            }
        }
        Commands::Tags { path, tags } => {
            let projection = preview_notebook(&path, &tags)?;
            for (tag, count) in &projection.tags {
                println!("{count:>4}  {tag}");
            }
        }
        Commands::NewPost {
            path,
            title,
            tags,
            body,
        } => {
            let entry = PostEntry::new(title, PostEntry::split_tags(&tags), body);
            append_post(&path, &entry)?;
            println!("Added \"{}\" to {}", entry.title.trim(), path.display());
        }
        Commands::NewNotebook { name, dir } => {
            let dir = match dir.or_else(|| config.library_root()) {
                Some(dir) => dir,
                None => return Err("no folder given and no library root available".into()),
            };
            let path = create_notebook(&dir, &name, config)?;
            println!("{}", path.display());
        }
        Commands::Find { path, query } => {
            let notebook = load_notebook(&path)?;
            let stem = file_stem(&path);
            if fuzzy_match(&query, &stem) || fuzzy_match(&query, &notebook.title) {
                println!("{}: notebook title matches", path.display());
            }
            for post in find_posts(&notebook.posts, &query) {
                println!("  {}  {}", post.date, post.title);
            }
        }
    }
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
