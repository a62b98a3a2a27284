use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use file_tracer::app::commands;
use file_tracer::app::confirm::{AssumeYes, ConfirmationService, TerminalPrompt};
use file_tracer::app::helpers::lock_state;
use file_tracer::app::proxy::ConsoleProxy;
use file_tracer::app::state::AppState;
use file_tracer::app::tasks;
use file_tracer::config::{settings, SearchQuery};
use file_tracer::core::FilterKind;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Search a directory tree by file name or file content, then filter, export,
/// rename, copy, or delete the results.
#[derive(Parser, Debug)]
#[command(name = "file-tracer", version, about)]
struct Cli {
    /// Also append log lines to FILE (defaults to app.log in the data directory)
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<Option<PathBuf>>,

    /// Saved queries file to use instead of the default location
    #[arg(long, global = true, env = "FILE_TRACER_QUERIES", value_name = "FILE")]
    queries_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a search and optionally act on the visible results
    Search {
        #[command(flatten)]
        search: SearchArgs,
        #[command(flatten)]
        action: ActionArgs,
    },
    /// Manage saved queries
    #[command(subcommand)]
    Query(QueryCommand),
}

#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// Save a query under NAME, replacing any query of that name
    Save {
        name: String,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// List saved query names
    List,
    /// Print a saved query as JSON
    Show { name: String },
    /// Delete a saved query
    Delete { name: String },
    /// Run a saved query
    Run {
        name: String,
        #[command(flatten)]
        action: ActionArgs,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Directory to search
    dir: PathBuf,

    /// File name pattern (case-insensitive substring unless --name-regex)
    #[arg(long, default_value = "")]
    name: String,

    /// Comma-separated name suffixes, e.g. ".txt,.md"
    #[arg(long, default_value = "")]
    ext: String,

    /// Treat --name as a regular expression
    #[arg(long)]
    name_regex: bool,

    /// Search file contents for this text instead of matching names only
    #[arg(long)]
    content: Option<String>,

    /// Treat --content as a regular expression
    #[arg(long)]
    content_regex: bool,

    /// Hide rows by size or modification date
    #[arg(long, value_enum, default_value_t = FilterArg::None)]
    filter: FilterArg,

    /// Filter value: kilobytes for size filters, YYYY-MM-DD for date filters
    #[arg(long, default_value = "")]
    value: String,
}

impl SearchArgs {
    fn into_query(self) -> SearchQuery {
        SearchQuery {
            dir_path: self.dir,
            name_pattern: self.name,
            extensions: self.ext,
            name_regex: self.name_regex,
            content_query: self.content.unwrap_or_default(),
            content_regex: self.content_regex,
            filter_kind: self.filter.into(),
            filter_value: self.value,
        }
    }
}

#[derive(Args, Debug)]
struct ActionArgs {
    /// Write the visible rows to FILE (.csv for CSV, anything else tab-separated)
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Rename visible items; placeholders {name}, {ext}, {counter}, {counter:03}
    #[arg(long, value_name = "PATTERN", group = "batch")]
    rename: Option<String>,

    /// Copy visible files into DIR
    #[arg(long, value_name = "DIR", group = "batch")]
    copy_to: Option<PathBuf>,

    /// Delete visible items
    #[arg(long, group = "batch")]
    delete: bool,

    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    yes: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FilterArg {
    None,
    SizeGt,
    SizeLt,
    ModifiedAfter,
    ModifiedBefore,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::None => FilterKind::None,
            FilterArg::SizeGt => FilterKind::SizeGreaterThan,
            FilterArg::SizeLt => FilterKind::SizeLessThan,
            FilterArg::ModifiedAfter => FilterKind::ModifiedAfter,
            FilterArg::ModifiedBefore => FilterKind::ModifiedBefore,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_ref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("Command failed: {:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(log_file: Option<&Option<PathBuf>>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(requested) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    };

    let path = match requested {
        Some(path) => path.clone(),
        None => settings::get_log_file_path().context("Could not determine data directory")?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    tracing::info!("Logging to {:?}", path);
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut initial = AppState::default();
    initial.queries_path = cli.queries_file;
    let state = Arc::new(Mutex::new(initial));
    let proxy = ConsoleProxy;

    match cli.command {
        Command::Search { search, action } => {
            commands::with_query(&state, search.into_query());
            run_search(action, proxy, state).await
        }
        Command::Query(query_command) => {
            commands::load_saved_queries(&state)?;
            run_query_command(query_command, proxy, state).await
        }
    }
}

async fn run_query_command(
    command: QueryCommand,
    proxy: ConsoleProxy,
    state: Arc<Mutex<AppState>>,
) -> Result<ExitCode> {
    match command {
        QueryCommand::Save { name, search } => {
            commands::with_query(&state, search.into_query());
            commands::save_query(&name, &proxy, &state)?;
        }
        QueryCommand::List => {
            let state_guard = lock_state(&state);
            for name in state_guard.saved_queries.names() {
                println!("{name}");
            }
        }
        QueryCommand::Show { name } => {
            let query = commands::load_query(&name, &state)?;
            println!("{}", serde_json::to_string_pretty(&query)?);
        }
        QueryCommand::Delete { name } => {
            commands::delete_query(&name, &proxy, &state)?;
        }
        QueryCommand::Run { name, action } => {
            commands::load_query(&name, &state)?;
            return run_search(action, proxy, state).await;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Search, filter, print, export, then run at most one batch operation.
async fn run_search(
    action: ActionArgs,
    proxy: ConsoleProxy,
    state: Arc<Mutex<AppState>>,
) -> Result<ExitCode> {
    let (content_search, filtered) = {
        let state_guard = lock_state(&state);
        (
            !state_guard.query.content_query.is_empty(),
            state_guard.query.filter_kind != FilterKind::None,
        )
    };

    let outcome = if content_search {
        tasks::start_content_search(proxy, state.clone()).await
    } else {
        tasks::start_file_search(proxy, state.clone()).await
    };
    // The proxy already reported the failure.
    if outcome.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    if filtered && commands::apply_filter(&proxy, &state).is_err() {
        return Ok(ExitCode::FAILURE);
    }

    {
        let state_guard = lock_state(&state);
        for row in state_guard.results.visible_rows() {
            println!("{}\t{}\t{}", row.name, row.path.display(), row.match_text);
        }
    }

    if let Some(target) = &action.export {
        if commands::export_results(target, &proxy, &state).is_err() {
            return Ok(ExitCode::FAILURE);
        }
    }

    let confirm: Box<dyn ConfirmationService> = if action.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompt)
    };
    let selection = commands::visible_selection(&state);

    let report = if let Some(pattern) = &action.rename {
        commands::rename_selected(&selection, pattern, confirm.as_ref(), &proxy, &state)
    } else if let Some(destination) = &action.copy_to {
        match commands::copy_selected(&selection, destination, confirm.as_ref(), &proxy, &state) {
            Ok(report) => report,
            Err(_) => return Ok(ExitCode::FAILURE),
        }
    } else if action.delete {
        commands::delete_selected(&selection, confirm.as_ref(), &proxy, &state)
    } else {
        None
    };

    match report {
        Some(report) if !report.is_clean() => Ok(ExitCode::FAILURE),
        _ => Ok(ExitCode::SUCCESS),
    }
}
