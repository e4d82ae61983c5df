//! CLI entry point for glovebox.
//!
//! Commands: `init`, `config`, `query`, `cluster`, `cache list` and `game`.
//! Everything except prompting and printing lives in the library.

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use glovebox::cluster::{CacheSource, ClusterCache, JsonCacheStore};
use glovebox::display::{
    THEME, create_cache_table, create_cluster_table, create_match_table, with_spinner,
};
use glovebox::io::ErrorReport;
use glovebox::{
    Expression, GameState, KMeansClusterer, QueryError, RankedMatch, Settings,
    VectorStore, nearest, nearest_to_expression, parse_players,
};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Word arithmetic and clustering over GloVe embeddings
#[derive(Parser)]
#[command(
    name = "glovebox",
    version = env!("CARGO_PKG_VERSION"),
    about = "Word arithmetic and clustering over GloVe embeddings",
    long_about = "Query nearest words for expressions like 'king - man + woman', \
                  cluster the vocabulary with cached K-means, or play the word game.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show loading and clustering progress logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// GloVe vector dimension (50, 100, 200 or 300)
    #[arg(long, global = true)]
    vector_dim: Option<usize>,

    /// Number of words to load from the embedding file
    #[arg(long, global = true)]
    num_words: Option<usize>,

    /// Embedding file to load instead of the GloVe default
    #[arg(long, global = true)]
    vectors: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create .glovebox/settings.toml with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    #[command(about = "Display the active settings")]
    Config,

    #[command(
        about = "Find the nearest words to an expression",
        long_about = "Find the nearest words to an expression such as 'king - man + woman'.\n\
                      Without an expression, reads one expression per line from stdin."
    )]
    Query {
        /// Expression tokens, e.g. king - man + woman
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        expression: Vec<String>,

        /// Number of results
        #[arg(short = 'k', long)]
        num_results: Option<usize>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Partition the vocabulary into clusters, reusing cached results")]
    Cluster {
        /// Number of clusters
        #[arg(short = 'k', long)]
        clusters: Option<usize>,

        /// Fix the K-means seed
        #[arg(long)]
        seed: Option<u64>,

        /// Only show the cluster containing this word
        #[arg(short, long)]
        word: Option<String>,

        /// Words shown per cluster
        #[arg(long, default_value_t = 12)]
        preview: usize,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Inspect the cluster cache")]
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    #[command(about = "Play the word arithmetic game")]
    Game {
        /// Comma separated player names; prompted for when omitted
        #[arg(short, long)]
        players: Option<String>,

        /// Score by distance instead of one point per round
        #[arg(long)]
        soft: bool,

        /// Score needed to win
        #[arg(long)]
        winning_score: Option<u32>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    #[command(about = "List cached partitions")]
    List,
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    expression: String,
    matches: &'a [RankedMatch<'a>],
}

#[derive(Serialize)]
struct ClusterOutput<'a> {
    key: String,
    source: CacheSource,
    elapsed_seconds: f64,
    clusters: Vec<ClusterEntry<'a>>,
}

#[derive(Serialize)]
struct ClusterEntry<'a> {
    index: usize,
    words: &'a [String],
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli) {
        let report = ErrorReport::from_anyhow(&error);
        eprintln!("{}", THEME.error_with_icon(&report.headline(&error)));
        print_suggestions(&report.suggestions);
        tracing::debug!(
            code = i32::from(report.exit_code),
            "{}",
            report.exit_code.description()
        );
        std::process::exit(report.exit_code.into());
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "glovebox=info" } else { "glovebox=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_suggestions(suggestions: &[&str]) {
    for suggestion in suggestions {
        eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init { force } = cli.command {
        let path = Settings::init_config_file(".", force)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("could not create configuration")?;
        println!(
            "{}",
            THEME.success_with_icon(&format!("Created configuration file at {}", path.display()))
        );
        return Ok(());
    }

    let settings = load_settings(&cli)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config => {
            println!("{}", THEME.apply(&THEME.header, "Current Configuration"));
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
        Commands::Query {
            expression,
            num_results,
            json,
        } => {
            let k = num_results.unwrap_or(settings.query.num_results);
            let store = load_vocabulary(&settings)?;
            if expression.is_empty() {
                let stdin = std::io::stdin();
                query_loop(&store, k, json, &mut stdin.lock())
            } else {
                run_query(&store, &expression.join(" "), k, json)
            }
        }
        Commands::Cluster {
            clusters,
            seed,
            word,
            preview,
            json,
        } => {
            let store = load_vocabulary(&settings)?;
            let cluster_count = clusters.unwrap_or(settings.clustering.num_clusters);
            let mut kmeans = settings.clustering.kmeans.clone();
            if seed.is_some() {
                kmeans.seed = seed;
            }
            run_cluster(&settings, &store, cluster_count, kmeans, word, preview, json)
        }
        Commands::Cache {
            action: CacheAction::List,
        } => {
            let cache = JsonCacheStore::new(&settings.cache_dir);
            let keys = cache.keys()?;
            if keys.is_empty() {
                println!(
                    "No cached clusters in {}",
                    THEME.apply(&THEME.path, cache.base_dir().display())
                );
            } else {
                println!("{}", create_cache_table(&keys));
            }
            Ok(())
        }
        Commands::Game {
            players,
            soft,
            winning_score,
        } => {
            let store = load_vocabulary(&settings)?;
            let mode = if soft {
                glovebox::ScoringMode::Soft
            } else {
                settings.game.scoring_mode()
            };
            let winning_score = winning_score.unwrap_or(settings.game.winning_score);
            let stdin = std::io::stdin();
            play_game(&store, players, winning_score, mode, &mut stdin.lock())
        }
    }
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path).map_err(|e| anyhow::Error::new(*e))?,
        None => {
            if let Err(warning) = Settings::check_init() {
                tracing::debug!("{warning}");
            }
            Settings::load().map_err(|e| anyhow::Error::new(*e))?
        }
    };

    if let Some(dim) = cli.vector_dim {
        settings.vector_dim = dim;
    }
    if let Some(num_words) = cli.num_words {
        settings.num_words = num_words;
    }
    if let Some(path) = &cli.vectors {
        settings.vectors_file = Some(path.clone());
    }
    Ok(settings)
}

fn load_vocabulary(settings: &Settings) -> anyhow::Result<VectorStore> {
    let path = settings.vectors_path();
    let message = format!(
        "Loading {} words from {}",
        settings.num_words,
        path.display()
    );
    let store = with_spinner(&message, || VectorStore::load_file(&path, settings.num_words))?;
    Ok(store)
}

fn run_query(store: &VectorStore, input: &str, k: usize, json: bool) -> anyhow::Result<()> {
    let expression = Expression::parse(input).map_err(QueryError::from)?;
    let matches = nearest_to_expression(store, &expression, k)?;

    if json {
        let output = QueryOutput {
            expression: expression.to_string(),
            matches: &matches,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{}",
            THEME.apply(&THEME.header, format!("Nearest to {expression}"))
        );
        println!("{}", create_match_table(&matches));
    }
    Ok(())
}

/// One expression per line until EOF.
fn query_loop(
    store: &VectorStore,
    k: usize,
    json: bool,
    input: &mut impl BufRead,
) -> anyhow::Result<()> {
    while let Some(line) = next_expression(input)? {
        if let Err(e) = run_query(store, &line, k, json) {
            match e.downcast_ref::<QueryError>() {
                Some(query_error) => eprintln!("{}", THEME.warning_with_icon(&query_error.to_string())),
                None => return Err(e),
            }
        }
    }
    Ok(())
}

fn run_cluster(
    settings: &Settings,
    store: &VectorStore,
    cluster_count: usize,
    kmeans: glovebox::KMeansConfig,
    word: Option<String>,
    preview: usize,
    json: bool,
) -> anyhow::Result<()> {
    let cache = ClusterCache::new(JsonCacheStore::new(&settings.cache_dir));
    let clusterer = KMeansClusterer::new(kmeans);

    let message = format!(
        "Clustering {} words into {cluster_count} clusters",
        store.len()
    );
    let started = Instant::now();
    let outcome = with_spinner(&message, || {
        cache.get_or_compute(store, cluster_count, &clusterer)
    })?;
    let elapsed = started.elapsed();

    if let Some(warning) = &outcome.write_warning {
        eprintln!(
            "{}",
            THEME.warning_with_icon(&format!("Clusters were not cached: {warning}"))
        );
        print_suggestions(&warning.recovery_suggestions());
    }

    let path = cache.store().path_for(&outcome.key);
    if !json {
        let origin = match outcome.source {
            CacheSource::Cached => "Loaded",
            CacheSource::Computed if outcome.write_warning.is_none() => "Saved",
            CacheSource::Computed => "Computed",
        };
        println!(
            "{origin} {} clusters: {} ({})",
            THEME.apply(&THEME.number, outcome.partition.len()),
            THEME.apply(&THEME.path, path.display()),
            THEME.apply(&THEME.dim, format!("{:.2} seconds", elapsed.as_secs_f64()))
        );
    }

    // Keep each cluster's position in the full partition.
    let selected: Vec<(usize, &[String])> = match &word {
        Some(word) => {
            let index = outcome
                .partition
                .cluster_of(word)
                .ok_or_else(|| QueryError::UnknownWord { word: word.clone() })?;
            vec![(index, outcome.partition.clusters()[index].as_slice())]
        }
        None => outcome.partition.iter().enumerate().collect(),
    };

    if json {
        let output = ClusterOutput {
            key: outcome.key.to_string(),
            source: outcome.source,
            elapsed_seconds: elapsed.as_secs_f64(),
            clusters: selected
                .iter()
                .map(|&(index, words)| ClusterEntry { index, words })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", create_cluster_table(selected, preview));
    }
    Ok(())
}

/// Prints `message` and reads one trimmed line; `None` at end of input.
fn prompt(input: &mut impl BufRead, message: &str) -> anyhow::Result<Option<String>> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Next non-blank line of input; `None` only at end of input.
fn next_expression(input: &mut impl BufRead) -> anyhow::Result<Option<String>> {
    while let Some(line) = prompt(input, "expression> ")? {
        if !line.is_empty() {
            return Ok(Some(line));
        }
    }
    Ok(None)
}

fn play_game(
    store: &VectorStore,
    players: Option<String>,
    winning_score: u32,
    mode: glovebox::ScoringMode,
    input: &mut impl BufRead,
) -> anyhow::Result<()> {
    let names = match players {
        Some(list) => parse_players(&list)?,
        None => loop {
            let Some(line) = prompt(input, "Players (comma separated): ")? else {
                return Ok(());
            };
            match parse_players(&line) {
                Ok(names) => break names,
                Err(e) => eprintln!("{}", THEME.warning_with_icon(&e.to_string())),
            }
        },
    };
    let mut game = GameState::new(names, winning_score, mode)?;

    while !game.is_over() {
        let setter = game.current_player().to_string();
        println!();
        println!(
            "{}",
            THEME.apply(
                &THEME.header,
                format!("Round {}: {setter} writes an expression", game.round() + 1)
            )
        );

        let answer = loop {
            let Some(line) = prompt(input, &format!("{setter}> "))? else {
                return Ok(());
            };
            let result = Expression::parse(&line)
                .map_err(QueryError::from)
                .and_then(|expression| {
                    let exclude: HashSet<&str> = expression.operands().collect();
                    let query = expression.evaluate(store)?;
                    nearest(store, &query, &exclude, 1)
                });
            match result {
                Ok(matches) => match matches.into_iter().next() {
                    Some(answer) => break answer,
                    None => eprintln!(
                        "{}",
                        THEME.warning_with_icon("Every word is part of the expression")
                    ),
                },
                Err(e) => eprintln!("{}", THEME.warning_with_icon(&e.to_string())),
            }
        };

        let mut guesses: Vec<(String, &[f32])> = Vec::with_capacity(game.players().len());
        let names: Vec<String> = game.players().iter().map(|p| p.name.clone()).collect();
        for name in names {
            let vector = loop {
                let Some(guess) = prompt(input, &format!("{name}, your guess: "))? else {
                    return Ok(());
                };
                match store.vector_of(&guess.to_lowercase()) {
                    Some(vector) => break vector,
                    None => eprintln!(
                        "{}",
                        THEME.warning_with_icon(&format!("'{guess}' is not in the vocabulary"))
                    ),
                }
            };
            guesses.push((name, vector));
        }

        let answers: Vec<(&str, &[f32])> = guesses
            .iter()
            .map(|(name, vector)| (name.as_str(), *vector))
            .collect();
        let outcome = game.resolve_round(&answers, answer.vector)?;

        println!(
            "The computer answered {}",
            THEME.apply(&THEME.word, answer.word)
        );
        for ((name, distance), (_, points)) in outcome.distances.iter().zip(&outcome.awarded) {
            println!(
                "  {name}: distance {}, +{}",
                THEME.apply(&THEME.number, format!("{distance:.3}")),
                THEME.apply(&THEME.number, points)
            );
        }
        println!("{}", THEME.success_with_icon(&format!("{} wins the round", outcome.winner)));
        for player in game.players() {
            println!(
                "  {}: {}",
                player.name,
                THEME.apply(&THEME.number, player.score)
            );
        }
    }

    let leader = game.leader();
    println!();
    println!(
        "{}",
        THEME.success_with_icon(&format!(
            "{} wins with {} points",
            leader.name, leader.score
        ))
    );
    Ok(())
}
