use crate::config;
use crate::controller::{LoadOutcome, PaginatedSearchController, ResultState};
use crate::logging;
use crate::search::providers::TaigaProjectProvider;
use crate::search::ProjectInSearch;
use crate::session::FileSession;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the query and load its first page
    Search(String),
    /// Scrolled to the end of the list
    NextPage,
    /// 1-based position in the listed results
    Select(usize),
    Quit,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        let Some(directive) = line.strip_prefix(':') else {
            return if line.is_empty() {
                Command::NextPage
            } else {
                Command::Search(line.to_string())
            };
        };

        let mut parts = directive.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("q" | "quit"), None) => Command::Quit,
            (Some("clear"), None) => Command::Search(String::new()),
            (Some("s" | "select"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Command::Select(n),
                _ => Command::Invalid(format!("not a list position: {n}")),
            },
            _ => Command::Invalid(format!("unknown command: {line}")),
        }
    }
}

/// Render a state as printable lines
pub fn format_state(state: &ResultState<ProjectInSearch>) -> String {
    let mut out = String::new();
    for (idx, project) in state.items().iter().enumerate() {
        out.push_str(&format!("{:>3}. {}", idx + 1, project.name));
        if !project.slug.is_empty() {
            out.push_str(&format!("  ({})", project.slug));
        }
        out.push('\n');
    }

    match state {
        ResultState::Idle => {}
        ResultState::Loading { .. } => out.push_str("     loading...\n"),
        ResultState::Success { items } if items.is_empty() => out.push_str("No projects found.\n"),
        ResultState::Success { .. } => {}
        ResultState::Error { message, .. } => {
            out.push_str(&format!("Failed to load projects: {message}\n"))
        }
    }

    out
}

async fn render(mut states: WatchStream<ResultState<ProjectInSearch>>) {
    while let Some(state) = states.next().await {
        if matches!(state, ResultState::Idle) {
            continue;
        }
        println!("{}", format_state(&state));
    }
}

/// Interactive project selection on stdin/stdout
pub async fn run() -> Result<()> {
    let config = config::load_or_create_config()?;
    let _log_guard = logging::init(&config)?;

    let provider = TaigaProjectProvider::new(&config).context("Failed to build HTTP client")?;
    let session = Arc::new(FileSession::new(config::session_path(&config)?));

    match session.current() {
        Ok(Some(current)) => println!(
            "Current project: {} (#{})",
            current.current_project_name, current.current_project_id
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable session file"),
    }
    println!("Type to search, Enter for more, :select N to choose, :quit to leave.");

    let controller: PaginatedSearchController<ProjectInSearch> =
        PaginatedSearchController::new(Arc::new(provider), session.clone());
    let renderer = tokio::spawn(render(controller.stream()));

    controller.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::NextPage => {
                if controller.load_next_page() == LoadOutcome::EndOfResults {
                    println!("No more projects.");
                }
            }
            Command::Search(query) => {
                controller.set_query(&query);
                controller.load_next_page();
            }
            Command::Select(n) => {
                let Some(project) = controller.result().items().get(n - 1).cloned() else {
                    println!("No project #{n} in the list.");
                    continue;
                };
                controller.select(&project);
                println!("Selected {} (saved to {}).", project.name, session.path().display());
                break;
            }
            Command::Invalid(message) => println!("{message}"),
        }
    }

    controller.dispose();
    renderer.abort();

    Ok(())
}
