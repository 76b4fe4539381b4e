//! Identify which trained track a short clip comes from.

use std::path::PathBuf;

use burn::backend::wgpu::WgpuDevice;
use burn::prelude::Backend;
use tracknet::logging;
#[cfg(feature = "tracknet-cuda")]
use tracknet::ml::cnn::CudaBackend;
use tracknet::ml::cnn::{
    CpuBackend, TrackIdentifier, TrackMatch, TrainingBackend, WgpuBackend, backend_from_env,
    init_cubecl_config, init_wgpu,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init("tracknet-identify") {
        eprintln!("Logging unavailable, continuing without log file: {err}");
    }
    let backend = backend_from_env(options.backend);
    let matches = match backend {
        TrainingBackend::Cpu => {
            let device = <CpuBackend as Backend>::Device::default();
            identify::<CpuBackend>(&options, &device)?
        }
        TrainingBackend::Wgpu => {
            init_cubecl_config();
            let device = WgpuDevice::default();
            init_wgpu(&device);
            identify::<WgpuBackend>(&options, &device)?
        }
        #[cfg(feature = "tracknet-cuda")]
        TrainingBackend::Cuda => {
            init_cubecl_config();
            let device = <CudaBackend as Backend>::Device::default();
            identify::<CudaBackend>(&options, &device)?
        }
    };
    for (rank, found) in matches.iter().enumerate() {
        println!(
            "{:>2}. {:<40} label={:<4} confidence={:.4}",
            rank + 1,
            found.file_name,
            found.label,
            found.confidence
        );
    }
    Ok(())
}

fn identify<B: Backend>(
    options: &CliOptions,
    device: &B::Device,
) -> Result<Vec<TrackMatch>, String> {
    let mut identifier = TrackIdentifier::<B>::load(&options.model_dir, device)
        .map_err(|err| err.to_string())?;
    identifier
        .identify_file(&options.clip, options.top)
        .map_err(|err| err.to_string())
}

#[derive(Debug)]
struct CliOptions {
    model_dir: PathBuf,
    clip: PathBuf,
    top: usize,
    backend: TrainingBackend,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut model_dir = PathBuf::from("model");
    let mut clip: Option<PathBuf> = None;
    let mut top = 3usize;
    let mut backend = TrainingBackend::Cpu;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model-dir" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--model-dir requires a value".to_string())?;
                model_dir = PathBuf::from(value);
            }
            "--clip" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--clip requires a value".to_string())?;
                clip = Some(PathBuf::from(value));
            }
            "--top" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--top requires a value".to_string())?;
                top = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --top value: {value}"))?;
            }
            "--backend" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--backend requires a value".to_string())?;
                backend = value.parse()?;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let clip = clip.ok_or_else(help_text)?;
    Ok(CliOptions {
        model_dir,
        clip,
        top: top.max(1),
        backend,
    })
}

fn help_text() -> String {
    [
        "tracknet-identify",
        "",
        "Ranks the tracks a trained model knows by how likely they produced a clip.",
        "",
        "Usage:",
        "  tracknet-identify --clip <audio file> [--model-dir model] [--top 3]",
        "",
        "Options:",
        "  --clip <file>       Audio clip to identify (required)",
        "  --model-dir <dir>   Trained model directory (default model)",
        "  --top <n>           Number of matches to print (default 3)",
        "  --backend <name>    cpu | wgpu (default cpu, TRACKNET_BACKEND overrides)",
    ]
    .join("\n")
}
