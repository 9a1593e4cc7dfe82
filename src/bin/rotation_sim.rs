use clap::Parser;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use rotsim_rs::character::Character;
use rotsim_rs::rotation::{Assignments, FightDuration, OnUseItem, Rotation, RotationStats};
use rotsim_rs::sim::{SimConfig, SimTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "rotation-sim",
    about = "Sweep healing rotations over characters and report throughput and mana usage"
)]
struct Args {
    /// Path to the sweep config (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Folder receiving output.json
    #[arg(long, default_value = "./generated")]
    out_folder: PathBuf,

    /// Worker threads; 0 uses every core
    #[arg(long, default_value_t = 0)]
    jobs: usize,

    /// Statistics window start (s)
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Statistics window end (s); defaults to the fight duration
    #[arg(long)]
    end: Option<f64>,
}

#[derive(Debug, Serialize)]
struct Window {
    start: SimTime,
    end: SimTime,
}

#[derive(Debug, Serialize)]
struct CombinationOutput {
    #[serde(flatten)]
    stats: RotationStats,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    on_use: BTreeMap<String, Vec<Window>>,
}

fn run_combination(
    character: &Character,
    assignments: &Assignments,
    fight: FightDuration,
    on_use: &[Arc<OnUseItem>],
    start: SimTime,
    end: Option<SimTime>,
) -> CombinationOutput {
    let mut rotation = Rotation::new(assignments.clone());
    rotation
        .optimal_rotation(character, fight)
        .unwrap_or_else(|err| {
            panic!(
                "rotation {} failed for {}: {err}",
                assignments.name, character.name
            )
        });

    let horizon = match fight {
        FightDuration::Bounded(duration) => duration,
        FightDuration::UntilOom => rotation.end(),
    };
    let stats = rotation.stats(character, start, Some(end.unwrap_or(horizon)));
    let on_use = on_use
        .iter()
        .map(|item| {
            let windows = rotation
                .on_use_timeline(item, horizon)
                .iter()
                .map(|e| Window {
                    start: e.start(),
                    end: e.end(),
                })
                .collect();
            (item.name.clone(), windows)
        })
        .collect();
    CombinationOutput { stats, on_use }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let config = SimConfig::load(&args.config)
        .unwrap_or_else(|err| panic!("load {}: {err}", args.config.display()));

    let characters: Vec<Character> = config.characters.iter().map(Character::from_spec).collect();
    let rotations: Vec<Assignments> = config
        .rotations
        .iter()
        .map(|spec| {
            Assignments::from_spec(spec)
                .unwrap_or_else(|err| panic!("rotation {}: {err}", spec.name))
        })
        .collect();
    let on_use: Vec<Arc<OnUseItem>> = config
        .on_use
        .iter()
        .map(|spec| Arc::new(OnUseItem::from_spec(spec)))
        .collect();
    let fight = FightDuration::from_secs(config.fight_duration);
    let start = SimTime(args.start);
    let end = args.end.map(SimTime);

    let combinations: Vec<(&Character, &Assignments)> = characters
        .iter()
        .flat_map(|c| rotations.iter().map(move |r| (c, r)))
        .collect();

    let pool = ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build()
        .expect("build worker pool");
    let outputs: Vec<CombinationOutput> = pool.install(|| {
        combinations
            .par_iter()
            .map(|(character, assignments)| {
                run_combination(character, assignments, fight, &on_use, start, end)
            })
            .collect()
    });

    let mut report = BTreeMap::new();
    for ((character, assignments), output) in combinations.iter().zip(outputs) {
        let key = format!("{}_{}", character.name, assignments.name);
        let oom = output
            .stats
            .overall
            .time_to_oom
            .map(|t| format!("{t:.1}s"))
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{key}: hps={:.1} hpm={:.2} time_to_oom={oom}",
            output.stats.overall.hps, output.stats.overall.hpm
        );
        report.insert(key, output);
    }

    fs::create_dir_all(&args.out_folder).expect("create out folder");
    let path = args.out_folder.join("output.json");
    let json = serde_json::to_string_pretty(&report).expect("serialize output");
    fs::write(&path, json).unwrap_or_else(|err| panic!("write {}: {err}", path.display()));
}
