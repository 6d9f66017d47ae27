use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use trackdash::dashboard::{Dashboard, Event, Snapshot};
use trackdash::selection::NodeKind;
use trackdash::views::ViewState;

#[derive(Parser)]
#[command(name = "trackdash", version, about = "Cross-filtered Spotify track dashboards")]
struct Cli {
    /// Tracks CSV (defaults to data_path in the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Genre filter (matches the primary genre)
    #[arg(short, long, global = true)]
    genre: Option<String>,

    /// Node clicks replayed in order, e.g. `artist:Drake` or `genre:pop`
    #[arg(long = "click", value_parser = parse_click, global = true)]
    clicks: Vec<(NodeKind, String)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dataset size and the current selection
    Summary,

    /// List primary genres by track count
    Genres {
        /// Number of results
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Show the ranking view (artists by followers, or an artist's tracks)
    Top {
        /// Number of bars (overrides config top_n)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show the hex-binned duration/popularity distribution
    Bins {
        /// Hexagon radius in pixels (overrides config hex_radius)
        #[arg(short, long)]
        radius: Option<f64>,

        /// Number of densest bins to print
        #[arg(short = 'n', long, default_value = "15")]
        limit: usize,
    },

    /// Show artist → genre links
    Links,

    /// Show percentile thresholds and the median profile
    Profile,

    /// Export every view as JSON
    Snapshot {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn parse_click(s: &str) -> std::result::Result<(NodeKind, String), String> {
    let (kind, node) = s
        .split_once(':')
        .ok_or_else(|| format!("expected KIND:NAME, got {s:?}"))?;
    let kind = match kind.trim().to_lowercase().as_str() {
        "artist" => NodeKind::Artist,
        "genre" => NodeKind::Genre,
        other => return Err(format!("unknown node kind {other:?} (use artist or genre)")),
    };
    let node = node.trim();
    if node.is_empty() {
        return Err("node name is empty".to_string());
    }
    Ok((kind, node.to_string()))
}

#[derive(Serialize)]
struct Export<'a> {
    generated_at: chrono::DateTime<chrono::Utc>,
    source: &'a std::path::Path,
    snapshot: &'a Snapshot,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = match &cli.config {
        Some(path) => trackdash::config::AppConfig::load_from(path),
        None => trackdash::config::AppConfig::load(),
    };

    // Resolve data path: CLI > config
    let data_path = match cli.data.or(config.data_path.clone()) {
        Some(p) => p,
        None => anyhow::bail!("No dataset given. Pass --data or set data_path in config."),
    };

    let mut dash_config = config.dashboard.clone();
    match &cli.command {
        Commands::Top { limit: Some(n) } => dash_config.top_n = *n,
        Commands::Bins { radius: Some(r), .. } => dash_config.hex_radius = *r,
        _ => {}
    }

    let dashboard = match Dashboard::load(&data_path, dash_config) {
        Ok((dashboard, report)) => {
            if report.skipped > 0 {
                eprintln!("Skipped {} malformed rows", report.skipped);
            }
            dashboard
        }
        Err(e) => {
            if let Commands::Snapshot { pretty } = cli.command {
                let snapshot = Snapshot::failed(&e);
                print_json(&Export { generated_at: chrono::Utc::now(), source: &data_path, snapshot: &snapshot }, pretty)?;
            }
            return Err(e).context("Failed to load data");
        }
    };

    // Replay the selection: genre filter first, then clicks in order
    let mut snapshot = dashboard.dispatch(Event::FilterGenre(cli.genre.clone()));
    for (kind, node) in cli.clicks {
        snapshot = dashboard.dispatch(Event::Click { node, kind });
    }

    match cli.command {
        Commands::Summary => {
            let store = dashboard.store();
            println!("Dataset Summary");
            println!("===============");
            println!("Tracks:   {}", store.len());
            println!("Artists:  {}", store.artists().len());
            println!("Genres:   {}", dashboard.genre_options().len());
            println!();
            print_selection(&snapshot);
        }

        Commands::Genres { limit } => {
            let options = dashboard.genre_options();
            println!("{:<35} {:>7}", "Primary genre", "Tracks");
            println!("{}", "-".repeat(43));
            for (genre, count) in options.iter().take(limit) {
                println!("{:<35} {:>7}", truncate(genre, 35), count);
            }
            if options.len() > limit {
                println!("... {} more", options.len() - limit);
            }
        }

        Commands::Top { .. } => {
            print_selection(&snapshot);
            match &snapshot.ranking {
                ViewState::Ready(view) => {
                    println!("{:<35} {:>12}  {}", "Name", "Value", "Band");
                    println!("{}", "-".repeat(60));
                    for bar in &view.bars {
                        println!("{:<35} {:>12}  {}", truncate(&bar.label, 35), bar.display, bar.band.color());
                    }
                }
                other => print_placeholder(other),
            }
        }

        Commands::Bins { limit, .. } => {
            print_selection(&snapshot);
            match &snapshot.distribution {
                ViewState::Ready(view) => {
                    println!(
                        "{} tracks in {} bins (radius {}, densest bin {})",
                        view.total, view.bins.len(), view.radius, view.max_count
                    );
                    println!();
                    println!("{:>8} {:>8} {:>7} {:>8}", "X", "Y", "Tracks", "Density");
                    println!("{}", "-".repeat(34));

                    let mut bins: Vec<_> = view.bins.iter().collect();
                    bins.sort_by(|a, b| b.count.cmp(&a.count));
                    for b in bins.into_iter().take(limit) {
                        println!("{:>8.1} {:>8.1} {:>7} {:>8.2}", b.x, b.y, b.count, b.density);
                    }
                }
                other => print_placeholder(other),
            }
        }

        Commands::Links => {
            print_selection(&snapshot);
            match &snapshot.relationship {
                ViewState::Ready(view) => {
                    for artist in &view.artists {
                        let genres: Vec<String> = view
                            .links
                            .iter()
                            .filter(|l| &l.artist == artist)
                            .map(|l| if l.highlighted { format!("*{}*", l.genre) } else { l.genre.clone() })
                            .collect();
                        println!("{:<30} -> {}", truncate(artist, 30), genres.join(", "));
                    }
                    println!();
                    println!("{} artists, {} genres, {} links", view.artists.len(), view.genres.len(), view.links.len());
                }
                other => print_placeholder(other),
            }
        }

        Commands::Profile => {
            print_selection(&snapshot);
            match &snapshot.profile {
                ViewState::Ready(view) => {
                    println!("Sampled tracks: {}", view.lines.len());
                    println!("Popularity p75: {:.1}   p90: {:.1}", view.p75, view.p90);
                    println!();
                    println!("Median profile:");
                    for (axis, value) in view.axes.iter().zip(view.median) {
                        println!("  {:<20} {:>14.1}", axis.label(), value);
                    }
                }
                other => print_placeholder(other),
            }
        }

        Commands::Snapshot { pretty } => {
            print_json(&Export { generated_at: chrono::Utc::now(), source: &data_path, snapshot: &snapshot }, pretty)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize snapshot")?;
    println!("{out}");
    Ok(())
}

/// One line describing the active cross-filter.
fn print_selection(snapshot: &Snapshot) {
    let sel = &snapshot.selection;
    let genre = sel.genre.as_deref().unwrap_or("(all)");
    let node = match (sel.selected_artist(), sel.selected_genre_node()) {
        (Some(a), _) => format!("artist {a}"),
        (_, Some(g)) => format!("genre {g}"),
        _ => "(none)".to_string(),
    };
    println!("Genre filter: {genre} | Selected: {node}");
    println!();
}

fn print_placeholder<T>(state: &ViewState<T>) {
    match state {
        ViewState::NoData => println!("No data for the current selection."),
        ViewState::Failed(msg) => println!("{msg}"),
        ViewState::Ready(_) => {}
    }
}

// Char-safe: titles are full of non-ASCII
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width - 3).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}
