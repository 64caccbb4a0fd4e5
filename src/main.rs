use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use iot_wiring::catalog::Catalog;
use iot_wiring::graph::Snapshot;
use iot_wiring::script;
use iot_wiring::session::Session;
use iot_wiring::store::{DirStore, KvStore, PROGRESS_KEY, ProgressTracker, persist, persist_snapshot};
use iot_wiring::{Notice, Result, Scenario, validate};

const LOG_LEVEL_ENV_VAR: &str = "RUST_LOG";
const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_STORE_DIR: &str = ".iot-wiring";

#[derive(Parser)]
#[command(name = "iot-wiring")]
#[command(about = "IoT scenario wiring validator", long_about = None)]
struct Cli {
    /// Catalog JSON to use instead of the built-in scenarios.
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available scenarios.
    Scenarios,

    /// Print a scenario (palette, rules, completion criteria) as JSON.
    Show {
        #[arg(long)]
        scenario: String,
    },

    /// Check whether an edge between two component types is allowed.
    CheckEdge {
        #[arg(long)]
        scenario: String,

        #[arg(long)]
        source: String,

        #[arg(long)]
        target: String,
    },

    /// Evaluate a graph snapshot (JSON) against a scenario.
    Evaluate {
        #[arg(long)]
        scenario: String,

        #[arg(long)]
        graph: String,
    },

    /// Replay an action script through a session.
    Replay {
        #[arg(long)]
        scenario: String,

        #[arg(long)]
        script: String,

        /// Restore and save the canvas and progress in this directory.
        #[arg(long)]
        store: Option<String>,
    },

    /// Show (or reset) which scenarios have been completed.
    Progress {
        #[arg(long, default_value = DEFAULT_STORE_DIR)]
        store: String,

        #[arg(long)]
        reset: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().filter_or(LOG_LEVEL_ENV_VAR, DEFAULT_LOG_LEVEL))
        .init();

    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_path(path).with_context(|| format!("load catalog {}", path))?,
        None => Catalog::builtin().context("load built-in catalog")?,
    };

    match cli.cmd {
        Commands::Scenarios => {
            for s in catalog.scenarios() {
                println!(
                    "{:<14} {:<22} {:>2} required components, {:>2} required connections  {}",
                    s.key,
                    s.slug,
                    s.required_components.len(),
                    s.required_connections.len(),
                    s.title
                );
            }
        }
        Commands::Show { scenario } => {
            let scenario = catalog.scenario(&scenario)?;
            println!("{}", serde_json::to_string_pretty(scenario)?);
        }
        Commands::CheckEdge {
            scenario,
            source,
            target,
        } => {
            let scenario = catalog.scenario(&scenario)?;
            let verdict = if validate::is_edge_valid(scenario, &source, &target) {
                "valid"
            } else {
                "invalid"
            };
            println!("{}", verdict);
        }
        Commands::Evaluate { scenario, graph } => {
            let scenario = catalog.scenario(&scenario)?;
            let text = std::fs::read_to_string(&graph)
                .with_context(|| format!("read graph file {}", graph))?;
            let snapshot: Snapshot =
                serde_json::from_str(&text).with_context(|| format!("parse graph file {}", graph))?;
            let evaluation = validate::evaluate(scenario, &snapshot.nodes, &snapshot.edges);
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
        Commands::Replay {
            scenario,
            script,
            store,
        } => {
            let scenario = catalog.scenario(&scenario)?;
            let steps = script::parse_script_file(&script)?;
            let mut store = store.map(DirStore::open);
            replay(&catalog, scenario, &script, &steps, store.as_mut())?;
        }
        Commands::Progress { store, reset } => {
            let mut store = DirStore::open(&store);
            let mut tracker = ProgressTracker::load(&store, catalog.slugs())?;
            if reset {
                tracker.reset();
                for s in catalog.scenarios() {
                    store.clear_snapshot(&s.key)?;
                }
                tracker.save(&mut store)?;
            }
            for (slug, done) in tracker.entries() {
                println!("[{}] {}", if done { "x" } else { " " }, slug);
            }
            println!("score: {}%", tracker.score());
        }
    }

    Ok(())
}

fn replay(
    catalog: &Catalog,
    scenario: &Scenario,
    script_path: &str,
    steps: &[script::Step],
    mut store: Option<&mut DirStore>,
) -> Result<()> {
    let mut tracker = match store.as_deref() {
        Some(s) => ProgressTracker::load(s, catalog.slugs())?,
        None => ProgressTracker::new(catalog.slugs()),
    };
    let snapshot = match store.as_deref() {
        Some(s) => s.load_snapshot(&scenario.key)?.unwrap_or_default(),
        None => Snapshot::default(),
    };

    let mut session = Session::restore(scenario, snapshot);
    session.set_already_completed(tracker.is_complete(&scenario.slug));

    for step in steps {
        let update = step
            .action
            .apply(&mut session)
            .with_context(|| format!("replay failed at {}:{}", script_path, step.line))?;

        println!(
            "{:>4}  {:>3}%  {:?}",
            step.line, update.evaluation.progress, update.evaluation.stage
        );
        for notice in &update.notices {
            println!("      [{:?}] {}", notice.severity(), notice);
            if *notice == Notice::Completed && tracker.mark_complete(&scenario.slug) {
                if let Some(s) = store.as_deref_mut() {
                    persist(s, PROGRESS_KEY, &tracker);
                }
            }
        }

        if let Some(s) = store.as_deref_mut() {
            persist_snapshot(s, &scenario.key, &session.snapshot());
        }
    }

    let eval = session.evaluation();
    println!(
        "final: {}% ({} of {} required connections){}",
        eval.progress,
        eval.satisfied_connections,
        eval.total_connections,
        if eval.complete { ", complete" } else { "" }
    );
    if !eval.missing_component_types.is_empty() {
        println!("missing: {}", eval.missing_component_types.join(", "));
    }
    Ok(())
}
