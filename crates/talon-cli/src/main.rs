//! The `talon` command: runs simulated reconnaissance missions and inspects
//! their logs.

mod prompt;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use talon_capability::builtin::{EoConfirmer, GridScanPlanner, OrbitPlanner, SarDetector};
use talon_capability::CapabilityRegistry;
use talon_core::{Area, PayloadType, Resolution};
use talon_orchestrator::log::read_log;
use talon_orchestrator::{
    CheckpointGate, CheckpointPolicy, CheckpointRule, EngineConfig, FileCheckpointStore,
    MissionEngine, MissionLog, MissionSpec,
};
use talon_sim::{Fleet, SimPolicy, VehicleSimulator};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "talon", about = "Talon — multi-stage reconnaissance mission orchestrator")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "talon.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a mission against the simulated fleet
    Run {
        /// Approve every checkpoint without prompting
        #[arg(long)]
        auto_approve: bool,
        /// Number of simulated vehicles (overrides config)
        #[arg(long)]
        vehicles: Option<usize>,
    },
    /// Replay the mission log
    Log {
        /// Only show entries for this mission
        #[arg(long)]
        mission: Option<Uuid>,
    },
}

#[derive(Deserialize)]
struct TalonConfig {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_vehicles")]
    vehicles: usize,
    #[serde(default)]
    mission: MissionConfig,
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    sim: SimPolicy,
}

impl Default for TalonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            vehicles: default_vehicles(),
            mission: MissionConfig::default(),
            engine: EngineConfig::default(),
            sim: SimPolicy::default(),
        }
    }
}

#[derive(Deserialize)]
struct MissionConfig {
    #[serde(default)]
    area: AreaBounds,
    #[serde(default = "default_payloads")]
    payloads: Vec<PayloadType>,
    /// Payloads after whose tasks the mission pauses for review.
    #[serde(default = "default_checkpoint_after")]
    checkpoint_after: Vec<PayloadType>,
    #[serde(default)]
    checkpoint_timeout_s: Option<u64>,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            area: AreaBounds::default(),
            payloads: default_payloads(),
            checkpoint_after: default_checkpoint_after(),
            checkpoint_timeout_s: None,
        }
    }
}

#[derive(Deserialize)]
struct AreaBounds {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl Default for AreaBounds {
    fn default() -> Self {
        Self {
            north: 35.2,
            south: 35.0,
            east: 117.7,
            west: 117.4,
        }
    }
}

impl AreaBounds {
    fn to_area(&self) -> Area {
        Area::from_bounds(self.north, self.south, self.east, self.west)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_vehicles() -> usize {
    1
}
fn default_payloads() -> Vec<PayloadType> {
    vec![PayloadType::Sar, PayloadType::Eo]
}
fn default_checkpoint_after() -> Vec<PayloadType> {
    vec![PayloadType::Sar]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config: TalonConfig = if cli.config.exists() {
        let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
            anyhow::anyhow!("failed to read config file '{}': {}", cli.config.display(), e)
        })?;
        toml::from_str(&config_str)?
    } else {
        info!(path = %cli.config.display(), "no config file, using defaults");
        TalonConfig::default()
    };

    match cli.command {
        Commands::Run {
            auto_approve,
            vehicles,
        } => run_mission(config, auto_approve, vehicles).await,
        Commands::Log { mission } => replay_log(&config, mission),
    }
}

async fn run_mission(
    config: TalonConfig,
    auto_approve: bool,
    vehicles: Option<usize>,
) -> anyhow::Result<()> {
    let fleet = Arc::new(Fleet::new());
    let vehicle_count = vehicles.unwrap_or(config.vehicles).max(1);
    for _ in 0..vehicle_count {
        fleet.register(VehicleSimulator::spawn(config.sim.clone()));
    }

    let mut registry = CapabilityRegistry::new();
    registry.register_planner(Arc::new(GridScanPlanner::new()));
    registry.register_planner(Arc::new(OrbitPlanner::new()));
    registry.register_processor(Arc::new(SarDetector::new()));
    registry.register_processor(Arc::new(EoConfirmer::new()));

    let gate = Arc::new(CheckpointGate::new(Box::new(FileCheckpointStore::new(
        config.data_dir.join("checkpoints"),
    )?)));
    std::fs::create_dir_all(&config.data_dir)?;
    let log = Arc::new(MissionLog::open(config.data_dir.join("missions.jsonl"))?);

    let engine = Arc::new(MissionEngine::new(
        fleet,
        Arc::new(registry),
        gate,
        log,
        config.engine,
    ));

    let spec = MissionSpec {
        area: config.mission.area.to_area(),
        payload_sequence: config.mission.payloads.clone(),
        checkpoint_policy: CheckpointPolicy {
            rules: config
                .mission
                .checkpoint_after
                .iter()
                .map(|&payload| CheckpointRule::Payload { payload })
                .collect(),
            timeout_s: config.mission.checkpoint_timeout_s,
        },
    };

    let mission_id = engine.submit(spec).await?;
    info!(mission_id = %mission_id, vehicles = vehicle_count, "mission running");

    let resolver = tokio::spawn(resolve_checkpoints(Arc::clone(&engine), auto_approve));
    let status = engine.wait(mission_id).await?;
    resolver.abort();
    engine.log().sync().await?;

    let mission = engine.mission(mission_id).await?;
    println!("mission {mission_id}: {status}");
    for task in &mission.tasks {
        let retries = if task.retries > 0 {
            format!(" ({} retries)", task.retries)
        } else {
            String::new()
        };
        println!("  task {} [{}]: {}{}", task.id, task.payload, task.phase, retries);
        if let Some(failure) = &task.failure {
            println!("    failure: {failure}");
        }
    }
    if mission.targets.is_empty() {
        println!("  no targets");
    } else {
        for target in &mission.targets {
            let detail = target.detail.as_deref().unwrap_or("-");
            println!(
                "  target {:?} at {:.4}, {:.4}: {}",
                target.confidence, target.position.lat, target.position.lon, detail
            );
        }
    }
    Ok(())
}

/// Services pending checkpoints: prompts the operator, or approves everything
/// under `--auto-approve`.
async fn resolve_checkpoints(engine: Arc<MissionEngine>, auto_approve: bool) {
    let mut seen: HashSet<Uuid> = HashSet::new();
    loop {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let Ok(pending) = engine.gate().pending().await else {
            continue;
        };
        for checkpoint in pending {
            if !seen.insert(checkpoint.id) {
                continue;
            }
            let resolution = if auto_approve {
                info!(checkpoint_id = %checkpoint.id, "auto-approving checkpoint");
                Resolution::Approved
            } else {
                let targets = engine
                    .mission(checkpoint.mission_id)
                    .await
                    .map(|m| m.targets)
                    .unwrap_or_default();
                prompt::prompt_resolution(&checkpoint, &targets).await
            };
            // A racing resolve from elsewhere is fine; the decision stood.
            let _ = engine.resolve_checkpoint(checkpoint.id, resolution).await;
        }
    }
}

fn replay_log(config: &TalonConfig, mission: Option<Uuid>) -> anyhow::Result<()> {
    let path = config.data_dir.join("missions.jsonl");
    let events = read_log(&path)
        .map_err(|e| anyhow::anyhow!("cannot read mission log '{}': {}", path.display(), e))?;

    let mut shown = 0usize;
    for event in &events {
        if mission.is_some_and(|id| id != event.mission_id) {
            continue;
        }
        let kind = serde_json::to_value(event.kind)?;
        println!(
            "{} {} {} {}",
            event.timestamp.to_rfc3339(),
            event.mission_id,
            kind.as_str().unwrap_or("?"),
            event.payload
        );
        shown += 1;
    }
    if shown == 0 {
        println!("no log entries");
    }
    Ok(())
}
