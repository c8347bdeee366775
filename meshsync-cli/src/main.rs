//! MeshSync CLI
//!
//! Command-line interface for inspecting, refining and generating MeshSync
//! message files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meshsync_binary::Message;
use meshsync_cli::{
    MessageSummary, SampleShape, load_messages, load_settings, refine_messages, sample_mesh,
    save_messages,
};
use meshsync_core::{GetData, GetFlags, MeshRefineFlags, MeshRefineSettings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshsync")]
#[command(about = "Inspect and refine MeshSync message streams")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the messages contained in a message file
    Inspect {
        /// Input message file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (summary, yaml)
        #[arg(short, long, default_value = "summary")]
        format: String,
    },

    /// Run the refine pipeline over every mesh in a message file
    Refine {
        /// Input message file
        #[arg(short, long)]
        input: PathBuf,

        /// Output message file
        #[arg(short, long)]
        output: PathBuf,

        /// YAML file with refine settings; flags below are added to it
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Split into submeshes of at most this many indices
        #[arg(long)]
        split_unit: Option<u32>,

        /// Uniform scale applied to positions
        #[arg(long)]
        scale: Option<f32>,

        #[arg(long)]
        gen_normals: bool,

        #[arg(long)]
        gen_tangents: bool,

        #[arg(long)]
        swap_handedness: bool,

        #[arg(long)]
        swap_faces: bool,

        #[arg(long)]
        apply_transform: bool,
    },

    /// Write a sample message file (a Get request followed by one mesh)
    Sample {
        /// Output message file
        #[arg(short, long)]
        output: PathBuf,

        /// Shape to generate (cube, grid)
        #[arg(long, default_value = "cube")]
        shape: String,

        /// Grid resolution in quads per side
        #[arg(long, default_value_t = 8)]
        size: u32,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { input, format } => inspect_command(input, format),
        Commands::Refine {
            input,
            output,
            settings,
            split_unit,
            scale,
            gen_normals,
            gen_tangents,
            swap_handedness,
            swap_faces,
            apply_transform,
        } => {
            let mut refine = match settings {
                Some(path) => load_settings(&path)?,
                None => MeshRefineSettings::default(),
            };
            if let Some(split_unit) = split_unit {
                refine.flags |= MeshRefineFlags::SPLIT;
                refine.split_unit = split_unit;
            }
            if let Some(scale) = scale {
                refine.scale = scale;
            }
            for (enabled, flag) in [
                (gen_normals, MeshRefineFlags::GEN_NORMALS),
                (gen_tangents, MeshRefineFlags::GEN_TANGENTS),
                (swap_handedness, MeshRefineFlags::SWAP_HANDEDNESS),
                (swap_faces, MeshRefineFlags::SWAP_FACES),
                (apply_transform, MeshRefineFlags::APPLY_TRANSFORM),
            ] {
                if enabled {
                    refine.flags |= flag;
                }
            }
            refine_command(input, output, refine)
        }
        Commands::Sample {
            output,
            shape,
            size,
        } => sample_command(output, shape, size),
    }
}

fn inspect_command(input: PathBuf, format: String) -> Result<()> {
    let messages = load_messages(&input)?;
    let summaries: Vec<MessageSummary> = messages.iter().map(MessageSummary::new).collect();

    match format.as_str() {
        "summary" => {
            println!("{}: {} messages", input.display(), messages.len());
            for (i, summary) in summaries.iter().enumerate() {
                println!("  [{}] {}", i, summary.line());
            }
        }
        "yaml" => {
            let text = serde_yaml::to_string(&summaries).context("Failed to format summary")?;
            print!("{}", text);
        }
        _ => {
            println!(
                "Unknown format: {}. Supported formats: summary, yaml",
                format
            );
        }
    }

    Ok(())
}

fn refine_command(input: PathBuf, output: PathBuf, settings: MeshRefineSettings) -> Result<()> {
    settings.validate()?;
    let mut messages = load_messages(&input)?;
    let outcomes = refine_messages(&mut messages, &settings)?;

    for outcome in &outcomes {
        let report = &outcome.report;
        println!(
            "✓ {}: {} triangles in {} submeshes",
            outcome.path, report.triangle_count, report.submesh_count
        );
        for issue in &report.issues {
            println!("  ! {}", issue);
        }
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
    }

    save_messages(&output, &messages)?;
    println!("Wrote {} messages to {}", messages.len(), output.display());
    Ok(())
}

fn sample_command(output: PathBuf, shape: String, size: u32) -> Result<()> {
    let shape = SampleShape::parse(&shape, size)?;
    let mesh = sample_mesh(shape, "/Sample");
    let request = GetData::new(
        GetFlags::GET_POINTS | GetFlags::GET_INDICES | GetFlags::GET_UV,
        1.0,
    );

    let messages = vec![Message::from(request), Message::from(mesh)];
    save_messages(&output, &messages)?;
    println!("Wrote sample to {}", output.display());
    Ok(())
}
