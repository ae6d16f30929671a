use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use gitanalyzer::github::DEFAULT_API_BASE;
use gitanalyzer::svg::{self, Theme};
use gitanalyzer::{
    ClientConfig, GithubClient, InputError, ProfileReport, SearchOutcome, Session, Slot, SlotState,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "gitanalyzer",
    version,
    about = "Summarize and chart a GitHub user's public repositories"
)]
struct Cli {
    /// GitHub username to analyze
    username: String,

    /// Second username to compare against
    #[arg(long, value_name = "USERNAME")]
    compare: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Directory the SVG files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = ThemeChoice::Both)]
    theme: ThemeChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeChoice {
    Dark,
    Light,
    Both,
}

impl ThemeChoice {
    fn themes(self) -> &'static [Theme] {
        match self {
            ThemeChoice::Dark => &[Theme::Dark],
            ThemeChoice::Light => &[Theme::Light],
            ThemeChoice::Both => &[Theme::Dark, Theme::Light],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gitanalyzer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let client = GithubClient::new(&ClientConfig {
        api_base: cli.api_base.clone(),
    })
    .context("Failed to build HTTP client")?;
    let session = Session::new(client);

    match cli.compare.as_deref() {
        Some(other) => {
            let (primary, comparison) = session.search_both(&cli.username, other).await;
            accept_input(Slot::Primary, primary)?;
            accept_input(Slot::Comparison, comparison)?;
        }
        None => {
            let primary = session.search(Slot::Primary, &cli.username).await;
            accept_input(Slot::Primary, primary)?;
        }
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("Failed to create {}", cli.out_dir.display()))?;

    let today = Utc::now().date_naive();
    let themes = cli.theme.themes();

    let mut slots = vec![Slot::Primary];
    if cli.compare.is_some() {
        slots.push(Slot::Comparison);
    }

    for slot in &slots {
        match session.slots().state(*slot) {
            SlotState::Ready(report) => {
                print_summary(&report);
                write_profile(&report, today, themes, &cli.out_dir)?;
            }
            SlotState::Failed(e) => {
                eprintln!("{slot}: {} ({e})", e.user_message());
            }
            SlotState::NotRequested | SlotState::Loading => {}
        }
    }

    if session.compare_mode() {
        if let (Some(a), Some(b)) = (
            session.slots().ready(Slot::Primary),
            session.slots().ready(Slot::Comparison),
        ) {
            for theme in themes {
                let path = cli.out_dir.join(format!(
                    "compare_{}_vs_{}_{}.svg",
                    file_stem(&a.profile.login),
                    file_stem(&b.profile.login),
                    theme.name()
                ));
                write_svg(&path, &svg::render_comparison(&a, &b, *theme))?;
            }
        }
    }

    if let SlotState::Failed(e) = session.slots().state(Slot::Primary) {
        bail!("{}", e.user_message());
    }

    Ok(())
}

fn write_profile(
    report: &ProfileReport,
    today: NaiveDate,
    themes: &[Theme],
    out_dir: &Path,
) -> Result<()> {
    for theme in themes {
        let path = out_dir.join(format!(
            "{}_{}.svg",
            file_stem(&report.profile.login),
            theme.name()
        ));
        write_svg(&path, &svg::render_profile(report, today, *theme))?;
    }
    Ok(())
}

/// Input errors on the primary slot abort the run. A bad comparison name only
/// leaves that slot empty so the primary still renders.
fn accept_input(slot: Slot, result: Result<SearchOutcome, InputError>) -> Result<()> {
    match (slot, result) {
        (_, Ok(_)) => Ok(()),
        (Slot::Primary, Err(e)) => Err(e.into()),
        (Slot::Comparison, Err(e)) => {
            eprintln!("{slot}: {e}");
            Ok(())
        }
    }
}

/// Make a server-supplied login safe to use as a file name inside `out_dir`.
fn file_stem(login: &str) -> String {
    let stem: String = login
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() { "user".to_string() } else { stem }
}

fn write_svg(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Generated {}", path.display());
    Ok(())
}

fn print_summary(report: &ProfileReport) {
    let p = &report.profile;
    let s = &report.stats;

    match &p.name {
        Some(name) => println!("@{} ({name})", p.login),
        None => println!("@{}", p.login),
    }
    println!(
        "  repos {}  stars {}  forks {}  watchers {}  followers {}",
        s.total_repos, s.total_stars, s.total_forks, s.total_watchers, p.followers
    );

    let langs: Vec<String> = s
        .languages_by_count(8)
        .into_iter()
        .map(|(lang, n)| format!("{lang} {n}"))
        .collect();
    if !langs.is_empty() {
        println!("  languages: {}", langs.join(", "));
    }

    let years: Vec<String> = s
        .activity_by_year()
        .into_iter()
        .map(|(year, n)| format!("{year}: {n}"))
        .collect();
    if !years.is_empty() {
        println!("  activity: {}", years.join(", "));
    }

    for repo in &s.top_repos {
        println!(
            "  ★ {:>6}  {}  {}",
            repo.stargazers_count, repo.name, repo.html_url
        );
    }
}
