use std::path::{Path, PathBuf};
use std::process::ExitCode;

use background::{FileStorage, History, SessionManager, Storage, load_options};
use bus::{Cardinality, OccurrenceQuery, PopupRequest, PopupResponse};
use clap::Parser;
use content::Page;
use core_types::{SearchOptions, TabId};
use runtime_page::PageHandle;
use url::Url;

mod logger;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const TAB: TabId = 1;

#[derive(Parser, Debug)]
#[command(name = "findr", about = "Regex find and replace over an HTML page")]
struct Args {
    /// HTML file to search
    file: PathBuf,
    /// Expression to search for
    #[arg(short, long)]
    pattern: String,
    /// URL the page is served from; relative links resolve against it
    #[arg(long)]
    url: Option<Url>,
    /// TOML file with search options
    #[arg(long)]
    options: Option<PathBuf>,
    /// JSON storage file: supplies options when --options is absent and
    /// records the pattern in the per-host history
    #[arg(long)]
    storage: Option<PathBuf>,
    /// Match the pattern literally
    #[arg(long)]
    literal: bool,
    #[arg(short, long)]
    ignore_case: bool,
    /// Stop counting after N results (0 = unlimited)
    #[arg(long)]
    max_results: Option<usize>,
    /// Keep highlights on the page after the session ends
    #[arg(long)]
    persistent: bool,
    /// Move the focus forward N times
    #[arg(long, default_value_t = 0)]
    next: usize,
    /// Replace the focused occurrence
    #[arg(long, conflicts_with = "replace_all")]
    replace: Option<String>,
    /// Replace every occurrence
    #[arg(long)]
    replace_all: Option<String>,
    /// Print the page markup after the session ends
    #[arg(long)]
    emit_html: bool,
    /// More log output (repeatable); FINDR_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid options file {path}: {source}")]
    Options {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Storage(#[from] background::StorageError),
    #[error(transparent)]
    Session(#[from] background::SessionError),
    #[error("{0}")]
    Search(String),
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn search_options(args: &Args, storage: Option<&FileStorage>) -> Result<SearchOptions, CliError> {
    let mut options = match (&args.options, storage) {
        (Some(path), _) => toml::from_str(&read(path)?).map_err(|source| CliError::Options {
            path: path.clone(),
            source,
        })?,
        (None, Some(storage)) => load_options(storage),
        (None, None) => SearchOptions::default(),
    };
    if args.literal {
        options.find_by_regex = false;
    }
    if args.ignore_case {
        options.match_case = false;
    }
    if let Some(max) = args.max_results {
        options.max_results = max;
    }
    if args.persistent {
        options.persistent_highlights = true;
    }
    Ok(options)
}

fn describe(response: &PopupResponse) -> Result<(usize, usize), CliError> {
    match response {
        PopupResponse::IndexUpdate { index, total } => Ok((*index, *total)),
        PopupResponse::EmptyRegex => Err(CliError::Search("pattern is empty".to_string())),
        PopupResponse::InvalidRegex { error } => Err(CliError::Search(error.clone())),
        PopupResponse::Unreachable { reason } => {
            Err(CliError::Search(format!("page unreachable: {reason:?}")))
        }
        other => Err(CliError::Search(format!("unexpected response {other:?}"))),
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let mut storage = match &args.storage {
        Some(path) => Some(FileStorage::open(path)?),
        None => None,
    };
    let options = search_options(args, storage.as_ref())?;
    let html = read(&args.file)?;
    let tab_url = args
        .url
        .as_ref()
        .map(Url::to_string)
        .unwrap_or_else(|| format!("file://{}", args.file.display()));

    let handle = PageHandle::spawn(Page::parse(&html, args.url.clone()));
    let mut manager = SessionManager::new();
    manager.open(TAB, handle, &tab_url)?;

    let update = PopupRequest::Update {
        regex: args.pattern.clone(),
        options: options.clone(),
    };
    let mut position = describe(&manager.handle(TAB, update.clone()))?;
    for _ in 0..args.next {
        let next = PopupRequest::Next {
            options: options.clone(),
        };
        position = describe(&manager.handle(TAB, next))?;
    }

    let replace = match (&args.replace, &args.replace_all) {
        (Some(with), _) => Some(PopupRequest::ReplaceNext {
            index: position.0,
            replace_with: with.clone(),
            options: options.clone(),
        }),
        (None, Some(with)) => Some(PopupRequest::ReplaceAll {
            replace_with: with.clone(),
            options: options.clone(),
        }),
        (None, None) => None,
    };
    if let Some(request) = replace {
        let response = manager.handle(TAB, request);
        log::info!("replace answered {response:?}");
        position = describe(&manager.handle(TAB, update))?;
    }

    println!("{}/{}", position.0, position.1);
    let all = PopupRequest::GetOccurrence {
        options: OccurrenceQuery {
            cardinality: Cardinality::All,
        },
    };
    if let PopupResponse::GetOccurrence { response } = manager.handle(TAB, all) {
        if !response.is_empty() {
            println!("{response}");
        }
    }

    if let Some(storage) = storage.as_mut() {
        if let Some(host) = History::host_of(&tab_url) {
            History::save_for_host(storage, &host, &args.pattern)?;
        }
        log::debug!("storage at {} updated (locked: {})", storage.path().display(), storage.is_locked());
    }

    let page = manager.close(TAB).and_then(PageHandle::into_page);
    if args.emit_html {
        match page {
            Some(page) => println!("{}", page.html()),
            None => log::warn!("page runtime did not return the page"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("findr: {err}");
            ExitCode::FAILURE
        }
    }
}
