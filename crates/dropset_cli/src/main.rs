use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dropset_annotate::RecordFormat;
use dropset_app::{logging, Generator, GeneratorConfig};
use log::warn;

#[derive(Parser)]
#[command(name = "dropset", version, about = "Synthetic 2D box datasets from dropped 3D objects")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Place, settle, render and annotate the scene described by a TOML file
    Generate {
        scene: PathBuf,
        /// Override [output].directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override [placement].seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override [output].format
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Summarise an annotation file (legacy or JSON lines)
    Inspect { annotations: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Legacy,
    JsonLines,
}

impl From<FormatArg> for RecordFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Legacy => RecordFormat::Legacy,
            FormatArg::JsonLines => RecordFormat::JsonLines,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(logging::level_for(args.verbose, args.quiet))?;
    match args.cmd {
        Cmd::Generate {
            scene,
            output,
            seed,
            format,
        } => cmd_generate(&scene, output, seed, format),
        Cmd::Inspect { annotations } => cmd_inspect(&annotations),
    }
}

fn cmd_generate(
    scene: &Path,
    output: Option<PathBuf>,
    seed: Option<u64>,
    format: Option<FormatArg>,
) -> Result<()> {
    let config = GeneratorConfig::load(scene)
        .with_context(|| format!("loading scene {}", scene.display()))?;

    let mut generator = Generator::new(config);
    if let Some(dir) = output {
        generator = generator.with_output_dir(dir);
    }
    if let Some(seed) = seed {
        generator = generator.with_seed(seed);
    }
    if let Some(format) = format {
        generator = generator.with_format(format.into());
    }

    let summary = generator.run()?;
    if !summary.exhausted.is_empty() {
        warn!(
            "{} instances kept an overlapping pose: {:?}",
            summary.exhausted.len(),
            summary.exhausted
        );
    }
    println!(
        "placed {}  removed {}  frames {}  -> {}",
        summary.placed,
        summary.culled.len(),
        summary.frames_written,
        summary.annotation_path.display()
    );
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let format = RecordFormat::sniff(&text);
    let records = format
        .parse(&text)
        .with_context(|| format!("parsing {}", path.display()))?;

    println!("{}: {} records ({:?})", path.display(), records.len(), format);
    if let Some(first) = records.first() {
        println!("classes: {}", first.classes.join(", "));
    }
    for rec in &records {
        let mut per_class: BTreeMap<&str, usize> = BTreeMap::new();
        let mut empty = 0;
        for (class, _, bbox) in rec.entries() {
            *per_class.entry(class).or_default() += 1;
            if bbox.is_degenerate() {
                empty += 1;
            }
        }
        let counts: Vec<String> = per_class.iter().map(|(c, n)| format!("{c}={n}")).collect();
        println!(
            "frame {:>5}: {:>3} boxes ({} degenerate)  {}",
            rec.frame,
            rec.len(),
            empty,
            counts.join(" ")
        );
    }
    Ok(())
}
