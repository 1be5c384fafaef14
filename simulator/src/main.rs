use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SessionScript;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Replays scripted AR placement sessions")]
struct Args {
    /// Load a session script from YAML (defaults to the built-in demo)
    #[arg(long)]
    script: Option<PathBuf>,
    /// Override the scene file location
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Override the world-map capture timeout
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Restore the saved scene before replaying the script
    #[arg(long, default_value_t = false)]
    restore: bool,
    /// Append a one-line run summary to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Keep the GUI bridge alive and serve the final session view
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let script = if let Some(path) = &args.script {
        SessionScript::load(path)?
    } else {
        SessionScript::demo()
    };

    let mut persistence = script.persistence.clone();
    if let Some(scene) = args.scene {
        persistence.scene_path = scene;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        persistence.capture_timeout_ms = timeout_ms;
    }

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for session replay")?;

    let restore_first = args.restore;
    let mut runner = Runner::new(&script, persistence)?;
    let summary = runtime.block_on(async {
        if restore_first && !runner.restore()? {
            println!("No saved scene to restore; starting empty.");
        }
        runner.execute(&script.steps).await
    })?;

    println!(
        "Session replay -> steps {}, placements {} ({} anchored), saves {}, restores {}, fallbacks {}",
        summary.steps,
        summary.placements,
        summary.anchored,
        summary.saves,
        summary.restores,
        summary.fallbacks
    );
    let ar = runner.ar();
    println!(
        "AR session -> runs {}, anchors {}, relocalized {}, highlighted {:?}",
        ar.runs(),
        ar.anchors().len(),
        ar.configuration()
            .map(|config| config.initial_world_map.is_some())
            .unwrap_or(false),
        ar.highlighted()
    );
    for record in runner.placements() {
        println!(
            "  placement {} {} ({}) anchor {}",
            record.id.0,
            record.model.name,
            record.model.category.label(),
            record
                .anchor
                .as_ref()
                .map(|anchor| anchor.to_string())
                .unwrap_or_else(|| "pending".into())
        );
    }
    for failure in &summary.failures {
        println!("  recovered: {}", failure);
    }

    if let Some(report_path) = args.report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        writeln!(
            file,
            "steps={} placements={} anchored={} saves={} restores={} failures={:?}",
            summary.steps,
            summary.placements,
            summary.anchored,
            summary.saves,
            summary.restores,
            summary.failures
        )?;
    }

    if args.serve {
        let gui_bridge = GuiBridge::new();
        gui_bridge.publish(&runner.view());
        gui_bridge.serve(gui_bind_address());
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
