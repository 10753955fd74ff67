//! padmap - MIDI control mapping for pad instruments

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use padmap::config;
use padmap::engine::{MappingEngine, MidiInputWorker, ParameterSink};
use padmap::mapping::{
    ForwardTransform, MappingPipeline, MidiCurve, MidiParameterMapping, QuantizeMapper, TargetType,
};
use padmap::midi::{MidiMessage, MidiMessageType};
use tracing::Level;

mod cli;

use cli::{Cli, Commands};

/// Prints every change it receives.
struct PrintSink;

impl ParameterSink for PrintSink {
    fn apply_parameter_change(&mut self, target_type: TargetType, target_id: &str, value: f64) {
        println!("  {:?} {} = {:.4}", target_type, target_id, value);
    }

    fn trigger(&mut self, target_id: &str, value: f64) {
        println!("  Trigger {} (velocity {:.4})", target_id, value);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Activation: {:?}", cfg.engine.activation);
                    println!("  Profiles: {}", cfg.profiles.len());
                    for profile in &cfg.profiles {
                        println!(
                            "    - {} ({}) {} mappings {}",
                            profile.id,
                            profile.name,
                            profile.mappings.len(),
                            if profile.is_active { "[active]" } else { "[inactive]" }
                        );
                    }

                    let engine = MappingEngine::from_config(&cfg)?;
                    let conflicts = engine.conflicts();
                    if !conflicts.is_empty() {
                        println!(
                            "  Warning: {} conflicting assignments (run `padmap conflicts`)",
                            conflicts.len()
                        );
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Conflicts { config: config_path } => {
            let cfg = config::load_config(&config_path)?;
            let engine = MappingEngine::from_config(&cfg)?;
            let conflicts = engine.detect_mapping_conflicts();

            if conflicts.is_empty() {
                println!("No conflicts between active profiles.");
                return Ok(());
            }

            println!("{} conflicts:\n", conflicts.len());
            for conflict in &conflicts {
                let source = conflict.source();
                println!(
                    "{:?} ch{} #{}",
                    source.midi_type, source.channel, source.controller
                );
                println!(
                    "  {} -> {:?} {}",
                    conflict.mapping1.id,
                    conflict.conflicting_parameter1.target_type,
                    conflict.conflicting_parameter1.target_id
                );
                println!(
                    "  {} -> {:?} {}",
                    conflict.mapping2.id,
                    conflict.conflicting_parameter2.target_type,
                    conflict.conflicting_parameter2.target_id
                );
            }
        }

        Commands::Simulate {
            config: config_path,
            message_type,
            channel,
            data1,
            data2,
            json,
        } => {
            let message_type = MidiMessageType::from_name(&message_type)
                .ok_or_else(|| anyhow!("Unknown message type '{}'", message_type))?;
            if channel > 15 {
                bail!("MIDI channel must be 0-15, got {}", channel);
            }

            let cfg = config::load_config(&config_path)?;
            let engine = Arc::new(MappingEngine::from_config(&cfg)?);
            let message = MidiMessage::new(message_type, channel, data1, data2);

            if json {
                let changes = engine.process_midi_message(message);
                println!("{}", serde_json::to_string_pretty(&changes)?);
            } else {
                println!("{:?} ch{} {} {}:", message_type, channel, data1, data2);
                let mut worker = MidiInputWorker::spawn(engine, Box::new(PrintSink))?;
                worker.send(message)?;
                worker.stop();
            }
        }

        Commands::Curve {
            name,
            min,
            max,
            steps,
            rows,
        } => {
            let curve =
                MidiCurve::from_name(&name).ok_or_else(|| anyhow!("Unknown curve '{}'", name))?;
            let mapping = MidiParameterMapping::control_change(0, 0, TargetType::MasterVolume, "curve")
                .with_range(min, max)
                .with_curve(curve);
            mapping.validate()?;

            let mut pipeline = MappingPipeline::new().with(ForwardTransform::new(mapping));
            if let Some(steps) = steps {
                pipeline = pipeline.with(QuantizeMapper::new("quantize", min, max, steps)?);
            }

            println!("{} [{}, {}] via {}", curve.name(), min, max, pipeline.stage_names().join(" -> "));
            let rows = rows.max(2);
            for row in 0..rows {
                let raw = (row * 127) as f64 / (rows - 1) as f64;
                let raw = raw.round();
                println!("  {:>3} -> {:.4}", raw, pipeline.apply(raw));
            }
        }

        Commands::Init => {
            let example_config = include_str!("../padmap.example.yaml");

            let path = "padmap.yaml";
            if std::path::Path::new(path).exists() {
                println!("padmap.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created padmap.yaml with example configuration.");
            }
        }
    }

    Ok(())
}
