//! Train the track classifier on a folder of audio files and export it.

use std::path::PathBuf;

use tracknet::config::{self, TrainingConfig};
use tracknet::dataset::ClassSizing;
use tracknet::export::converter_from_settings;
use tracknet::logging;
use tracknet::ml::cnn::TrainingBackend;
use tracknet::pipeline::run_training;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init("tracknet-train") {
        eprintln!("Logging unavailable, continuing without log file: {err}");
    }

    let base = match &options.config_path {
        Some(path) => config::load_from_path(path).map_err(|err| err.to_string())?,
        None => config::load_or_default().map_err(|err| err.to_string())?,
    };
    let config = options.apply(base).normalized();
    config.validate().map_err(|err| err.to_string())?;

    let converter = converter_from_settings(&config.output.export);
    let report = run_training(&config, converter.as_ref()).map_err(|err| err.to_string())?;

    println!(
        "Trained {} classes from {} tracks ({} train / {} test) on {}",
        report.num_classes,
        report.track_count,
        report.train_samples,
        report.test_samples,
        report.backend
    );
    for skipped in &report.skipped {
        println!("skipped {} (label {}): {}", skipped.file_name, skipped.label, skipped.reason);
    }
    if let Some(last) = report.history.last() {
        println!(
            "final epoch: loss={:.4} accuracy={:.4}",
            last.train_loss, last.train_accuracy
        );
    }
    if let Some(acc) = report.test_accuracy {
        println!("test accuracy: {acc:.4}");
    }
    println!("model saved to {}", report.artifacts.dir.display());
    if report.converter != "none" {
        println!("export ({}) written to {}", report.converter, report.export_dir.display());
    } else if config.output.export.enabled {
        println!("export skipped: set output.export.program in the config to run a converter");
    }
    Ok(())
}

#[derive(Debug, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    audio_dir: Option<PathBuf>,
    model_dir: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    epochs: Option<usize>,
    batch_size: Option<usize>,
    learning_rate: Option<f64>,
    seed: Option<u64>,
    backend: Option<TrainingBackend>,
    class_sizing: Option<ClassSizing>,
    no_export: bool,
}

impl CliOptions {
    /// Layer the command-line overrides on top of the loaded config.
    fn apply(&self, mut config: TrainingConfig) -> TrainingConfig {
        if let Some(dir) = &self.audio_dir {
            config.dataset.audio_dir = dir.clone();
        }
        if let Some(dir) = &self.model_dir {
            config.output.model_dir = dir.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.output.export.output_dir = dir.clone();
        }
        if let Some(epochs) = self.epochs {
            config.training.epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.training.batch_size = batch_size;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.training.learning_rate = learning_rate;
        }
        if let Some(seed) = self.seed {
            config.training.seed = seed;
        }
        if let Some(backend) = self.backend {
            config.training.backend = backend;
        }
        if let Some(sizing) = self.class_sizing {
            config.training.class_sizing = sizing;
        }
        if self.no_export {
            config.output.export.enabled = false;
        }
        config
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => return Err(help_text()),
            "--config" => options.config_path = Some(PathBuf::from(value(&args, &mut idx)?)),
            "--audio-dir" => options.audio_dir = Some(PathBuf::from(value(&args, &mut idx)?)),
            "--model-dir" => options.model_dir = Some(PathBuf::from(value(&args, &mut idx)?)),
            "--export-dir" => options.export_dir = Some(PathBuf::from(value(&args, &mut idx)?)),
            "--epochs" => options.epochs = Some(parsed(&args, &mut idx)?),
            "--batch" => options.batch_size = Some(parsed(&args, &mut idx)?),
            "--learning-rate" => options.learning_rate = Some(parsed(&args, &mut idx)?),
            "--seed" => options.seed = Some(parsed(&args, &mut idx)?),
            "--backend" => {
                let raw = value(&args, &mut idx)?;
                options.backend = Some(raw.parse()?);
            }
            "--class-sizing" => {
                options.class_sizing = Some(match value(&args, &mut idx)? {
                    "file_count" | "file-count" | "files" => ClassSizing::FileCount,
                    "processed" => ClassSizing::Processed,
                    other => return Err(format!("Invalid --class-sizing value: {other}")),
                });
            }
            "--no-export" => options.no_export = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn value<'a>(args: &'a [String], idx: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*idx];
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parsed<T: std::str::FromStr>(args: &[String], idx: &mut usize) -> Result<T, String> {
    let flag = args[*idx].clone();
    let raw = value(args, idx)?;
    raw.parse::<T>()
        .map_err(|_| format!("Invalid {flag} value: {raw}"))
}

fn help_text() -> String {
    [
        "tracknet-train",
        "",
        "Trains a track classifier on every audio file in a folder, saves it, and runs the export converter.",
        "Export is off until output.export.program names a converter in the config file.",
        "",
        "Usage:",
        "  tracknet-train [--config config.toml] [--audio-dir <dir>] [options]",
        "",
        "Options:",
        "  --config <file>         TOML config (default: <app dir>/config.toml when present)",
        "  --audio-dir <dir>       Folder of tracks to learn",
        "  --model-dir <dir>       Where model.bpk, model_info.json, tracks.json go (default model)",
        "  --export-dir <dir>      Converter output folder (default model_js)",
        "  --epochs <n>            Training epochs (default 50)",
        "  --batch <n>             Batch size (default 8)",
        "  --learning-rate <f>     Adam learning rate (default 0.001)",
        "  --seed <n>              Split and init seed (default 42)",
        "  --backend <name>        cpu | wgpu (default cpu, TRACKNET_BACKEND overrides)",
        "  --class-sizing <mode>   file_count | processed (default file_count)",
        "  --no-export             Skip the export converter (already skipped when output.export.program is unset)",
    ]
    .join("\n")
}
