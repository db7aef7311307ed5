//! Waypoint CLI - drive the discovery engine against on-disk storage.

use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use waypoint_core::{CaseStudyId, RegionId, RevealPhase, Signal};
use waypoint_engine::{DiscoveryEngine, DiscoveryView, EngineConfig, SignalBus};
use waypoint_progress::IntersectionEntry;
use waypoint_storage::{JsonStorage, Storage};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Portfolio discovery and progression engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage directory
    #[arg(short, long, default_value = ".waypoint", global = true)]
    storage: PathBuf,

    /// Engine config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print views as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show exploration progress
    Status,
    /// Mark regions as fully scrolled into view
    View {
        /// Region ids (home, about, timeline, case-studies, design-interests, contact)
        #[arg(required = true)]
        regions: Vec<RegionId>,
    },
    /// Publish a case study completion
    Complete {
        /// Case study id (swiggy, skillup, connect)
        case_study: CaseStudyId,
    },
    /// Trigger the hidden reality and wait out the transition
    Reveal,
    /// Forget everything scoped to the current browsing session
    EndSession,
    /// Load the page and play the hint sequence in real time
    Simulate {
        /// What the visitor does when the hint appears
        #[arg(long, value_enum, default_value_t = HintResponse::Dismiss)]
        on_hint: HintResponse,
        /// Use the reveal control right away instead of waiting for the hint
        #[arg(long)]
        skip_hint: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HintResponse {
    /// Close the hint popup
    Dismiss,
    /// Use the manual reveal control
    Reveal,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path).await?,
        None => EngineConfig::default(),
    };
    let storage = JsonStorage::new(&cli.storage).await?;
    let bus = SignalBus::new();
    let mut engine = DiscoveryEngine::mount(storage, &bus, config).await;

    match cli.command {
        Commands::Status => {
            print_status(&engine, cli.json)?;
            engine.unmount();
        }
        Commands::View { regions } => {
            let batch = regions
                .iter()
                .map(|id| IntersectionEntry::new(id.as_str(), 1.0))
                .collect();
            engine.record_intersections(batch).await;
            print_view(&engine.view(), cli.json)?;
            engine.unmount();
        }
        Commands::Complete { case_study } => {
            bus.publish(Signal::case_study_complete(case_study.as_str()));
            engine.pump().await;
            print_view(&engine.view(), cli.json)?;
            engine.unmount();
        }
        Commands::Reveal => {
            play(engine, Visitor::reveal_now(), cli.json).await?;
        }
        Commands::EndSession => {
            let mut storage = engine.unmount();
            storage.end_session().await?;
            println!("Session ended");
        }
        Commands::Simulate { on_hint, skip_hint } => {
            let visitor = if skip_hint { Visitor::reveal_now() } else { Visitor::page_load(on_hint) };
            play(engine, visitor, cli.json).await?;
        }
    }

    Ok(())
}

/// Scripted visitor behaviour for [`play`].
struct Visitor {
    load_page: bool,
    on_hint: HintResponse,
}

impl Visitor {
    fn reveal_now() -> Self {
        Self {
            load_page: false,
            on_hint: HintResponse::Dismiss,
        }
    }

    fn page_load(on_hint: HintResponse) -> Self {
        Self {
            load_page: true,
            on_hint,
        }
    }
}

/// Drive the run loop in real time like a visitor would, printing every view
/// change, until the sequence settles.
async fn play<S: Storage + 'static>(
    engine: DiscoveryEngine<S>,
    visitor: Visitor,
    json: bool,
) -> Result<S> {
    let handle = engine.handle();
    let mut views = engine.subscribe_view();
    let task = tokio::spawn(engine.run());

    // Every first event below changes the view, so the loop always wakes.
    let mut content_seen = !visitor.load_page;
    if visitor.load_page {
        handle.page_load_started()?;
    } else {
        handle.trigger_reveal()?;
    }

    while views.changed().await.is_ok() {
        let view = views.borrow_and_update().clone();
        print_view(&view, json)?;

        if !content_seen && !view.loading {
            content_seen = true;
            if view.phase == RevealPhase::Idle {
                info!("hint already dismissed this session");
                break;
            }
        }

        match view.phase {
            RevealPhase::HintShown => match visitor.on_hint {
                HintResponse::Dismiss => handle.dismiss_hint()?,
                HintResponse::Reveal => handle.trigger_reveal()?,
            },
            RevealPhase::Idle if content_seen => break,
            RevealPhase::Discovered => {
                if view.transition_visible {
                    handle.transition_overlay_complete()?;
                } else if view.discovered_visible {
                    handle.dismiss_discovered()?;
                } else {
                    break;
                }
            }
            _ => {}
        }
    }

    handle.shutdown()?;
    Ok(task.await?)
}

fn print_status<S: Storage>(engine: &DiscoveryEngine<S>, json: bool) -> Result<()> {
    let view = engine.view();
    let breakdown = engine.breakdown();
    let state = engine.state();

    if json {
        let value = serde_json::json!({
            "view": view,
            "breakdown": breakdown,
            "state": state,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Exploration: {}%", view.exploration_percentage);
    println!(
        "  Regions:      {}/{} ({:.1} pts)",
        state.viewed_regions().len(),
        RegionId::ALL.len(),
        breakdown.region_share
    );
    for id in RegionId::ALL {
        let mark = if state.has_viewed_region(id) { "x" } else { " " };
        println!("    [{}] {}", mark, id);
    }
    println!(
        "  Case studies: {}/{} ({:.1} pts)",
        state.viewed_case_studies().len(),
        CaseStudyId::ALL.len(),
        breakdown.case_study_share
    );
    for id in CaseStudyId::ALL {
        let mark = if state.has_viewed_case_study(id) { "x" } else { " " };
        println!("    [{}] {}", mark, id);
    }
    println!(
        "  Hidden reality: {}",
        if state.reality_discovered() { "discovered" } else { "undiscovered" }
    );
    println!(
        "  Hint this session: {}",
        if state.hint_already_shown_this_session() { "dismissed" } else { "not yet" }
    );
    Ok(())
}

fn print_view(view: &DiscoveryView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(view)?);
        return Ok(());
    }

    let mut popups = Vec::new();
    if view.loading {
        popups.push("loading");
    }
    if view.hint_visible {
        popups.push("hint");
    }
    if view.transition_visible {
        popups.push("transition");
    }
    if view.discovered_visible {
        popups.push("discovered");
    }
    println!(
        "{:>3}% | {} | {}",
        view.exploration_percentage,
        view.phase,
        if popups.is_empty() { "-".to_string() } else { popups.join(", ") }
    );
    Ok(())
}
