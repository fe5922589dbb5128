use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use github_profile::{Config, Controller, Profile, Theme, ViewState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Look up GitHub users from the terminal.
///
/// Every line typed is the new contents of the search box. Lines starting
/// with ':' are commands; type ':help' to list them.
#[derive(Debug, Parser)]
#[command(name = "github-profile", version, about)]
struct Cli {
    /// Username to look up right away.
    query: Option<String>,

    /// Base URL of the directory API (overrides GITHUB_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Quiet period before suggestions are fetched, in milliseconds.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Minimum input length that triggers suggestions.
    #[arg(long)]
    min_query_len: Option<usize>,

    /// Maximum number of suggestions shown.
    #[arg(long)]
    suggestions: Option<usize>,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = Config::from_env().context("Invalid environment configuration")?;
        if let Some(url) = &self.api_url {
            config = config.with_api_base(url)?;
        }
        if let Some(ms) = self.debounce_ms {
            config.quiet_period = Duration::from_millis(ms);
        }
        if let Some(len) = self.min_query_len {
            config.min_query_len = len;
        }
        if let Some(limit) = self.suggestions {
            config.suggestion_limit = limit;
        }
        Ok(config)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Input(&'a str),
    Search,
    Pick(usize),
    Open(Option<usize>),
    Theme,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let Some(command) = line.strip_prefix(':') else {
            return Command::Input(line);
        };
        let mut parts = command.split_whitespace();
        let index = |arg: Option<&str>| arg.and_then(|n| n.parse::<usize>().ok());
        match parts.next() {
            Some("go" | "search") | None => Command::Search,
            Some("pick") => match index(parts.next()) {
                Some(n) => Command::Pick(n),
                None => Command::Unknown(line),
            },
            Some("open") => Command::Open(index(parts.next())),
            Some("theme") => Command::Theme,
            Some("help") => Command::Help,
            Some("quit" | "q") => Command::Quit,
            Some(_) => Command::Unknown(line),
        }
    }
}

const HELP: &str = "\
  <text>      set the search box to <text>
  :go         look up the user in the search box
  :pick N     use suggestion N
  :open [N]   open the profile (or repository N) in the browser
  :theme      toggle light/dark
  :quit       exit";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env variables
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let config = cli.config()?;
    let controller = Controller::connect(&config)?;

    let renderer = tokio::spawn(render_loop(
        controller.state().subscribe(),
        controller.theme().subscribe(),
    ));

    if let Some(query) = cli.query.as_deref() {
        controller.on_suggestion_picked(query);
        controller.on_search_confirmed();
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(line.trim_end()) {
            Command::Input(text) => controller.on_query_changed(text),
            Command::Search => {
                controller.on_search_confirmed();
            }
            Command::Pick(n) => {
                let state = controller.state().snapshot();
                match n.checked_sub(1).and_then(|i| state.candidates.get(i)) {
                    Some(candidate) => controller.on_suggestion_picked(&candidate.identifier),
                    None => println!("no suggestion #{n}"),
                }
            }
            Command::Open(target) => open_link(&controller.state().snapshot(), target),
            Command::Theme => {
                controller.toggle_theme();
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(line) => println!("unknown command: {line} (try :help)"),
        }
    }

    renderer.abort();
    Ok(())
}

fn open_link(state: &ViewState, target: Option<usize>) {
    let Some(profile) = &state.profile else {
        println!("no profile loaded");
        return;
    };
    let url = match target {
        None => &profile.external_link,
        Some(n) => match n.checked_sub(1).and_then(|i| profile.repository_list.get(i)) {
            Some(repo) => &repo.external_link,
            None => {
                println!("no repository #{n}");
                return;
            }
        },
    };
    // Open the raw URL in the native Web Browser
    if let Err(e) = open::that(url) {
        warn!(%url, error = %e, "could not open browser");
    }
}

/// Redraws whenever the view state or the theme changes.
async fn render_loop(mut state_rx: watch::Receiver<ViewState>, mut theme_rx: watch::Receiver<Theme>) {
    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = theme_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let theme = *theme_rx.borrow_and_update();
        let state = state_rx.borrow_and_update().clone();
        print!("{}", render(&state, theme));
    }
}

struct Palette {
    accent: &'static str,
    reset: &'static str,
}

impl From<Theme> for Palette {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                accent: "\x1b[34m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Palette {
                accent: "\x1b[96m",
                reset: "\x1b[0m",
            },
        }
    }
}

fn render(state: &ViewState, theme: Theme) -> String {
    let p = Palette::from(theme);
    let mut out = String::new();

    out.push_str(&format!("\n{}> {}{}\n", p.accent, state.query, p.reset));
    for (i, candidate) in state.candidates.iter().enumerate() {
        out.push_str(&format!("  [{}] {}\n", i + 1, candidate.display_label));
    }
    if state.loading {
        out.push_str("  loading...\n");
    }
    if let Some(error) = &state.error {
        out.push_str(&format!("  ! {}\n", error.user_message()));
    }
    if let Some(profile) = &state.profile {
        out.push_str(&render_profile(profile, &p));
    }
    out
}

fn render_profile(profile: &Profile, p: &Palette) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}{}{} @{}\n",
        p.accent,
        profile.display_name.as_deref().unwrap_or(""),
        p.reset,
        profile.identifier
    ));
    if let Some(bio) = &profile.bio {
        out.push_str(&format!("  {bio}\n"));
    }
    if let Some(location) = &profile.location {
        out.push_str(&format!("  location: {location}\n"));
    }
    if let Some(company) = &profile.company {
        out.push_str(&format!("  company: {company}\n"));
    }
    out.push_str(&format!("  avatar: {}\n", profile.avatar_reference));

    out.push_str(&format!(
        "\n{}Repositories ({}){}\n",
        p.accent,
        profile.repository_count(),
        p.reset
    ));
    for (i, repo) in profile.repository_list.iter().enumerate() {
        out.push_str(&format!(
            "  [{}] {}  ★ {}  forks {}\n",
            i + 1,
            repo.name,
            repo.star_count,
            repo.fork_count
        ));
        if let Some(description) = &repo.description {
            out.push_str(&format!("      {description}\n"));
        }
    }

    for (title, people) in [
        ("Followers", &profile.follower_list),
        ("Following", &profile.following_list),
    ] {
        out.push_str(&format!(
            "\n{}{} ({}){}\n",
            p.accent,
            title,
            people.len(),
            p.reset
        ));
        for person in people {
            out.push_str(&format!("  {}  {}\n", person.handle, person.external_link));
        }
    }
    out
}
