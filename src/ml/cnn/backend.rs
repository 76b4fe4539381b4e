use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use burn::backend::ndarray::NdArray;
#[cfg(target_os = "macos")]
use burn::backend::wgpu::{self, WgpuDevice, graphics::Metal};
#[cfg(not(target_os = "macos"))]
use burn::backend::wgpu::{self, WgpuDevice, graphics::Vulkan};
#[cfg(feature = "tracknet-cuda")]
use burn::backend::Cuda;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable that overrides the configured backend.
pub const BACKEND_ENV: &str = "TRACKNET_BACKEND";

pub type CpuBackend = NdArray;
pub type WgpuBackend = wgpu::Wgpu;
#[cfg(feature = "tracknet-cuda")]
pub type CudaBackend = Cuda;

/// Tensor backend used for training and identification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingBackend {
    #[default]
    Cpu,
    Wgpu,
    #[cfg(feature = "tracknet-cuda")]
    Cuda,
}

impl fmt::Display for TrainingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainingBackend::Cpu => "cpu",
            TrainingBackend::Wgpu => "wgpu",
            #[cfg(feature = "tracknet-cuda")]
            TrainingBackend::Cuda => "cuda",
        };
        f.write_str(name)
    }
}

impl FromStr for TrainingBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cpu" | "ndarray" => Ok(TrainingBackend::Cpu),
            "wgpu" | "vulkan" | "metal" | "gpu" => Ok(TrainingBackend::Wgpu),
            #[cfg(feature = "tracknet-cuda")]
            "cuda" => Ok(TrainingBackend::Cuda),
            other => Err(format!("Unknown backend '{other}'")),
        }
    }
}

/// Apply the `TRACKNET_BACKEND` override on top of `configured`.
pub fn backend_from_env(configured: TrainingBackend) -> TrainingBackend {
    let Ok(requested) = env::var(BACKEND_ENV) else {
        return configured;
    };
    if requested.trim().is_empty() {
        return configured;
    }
    match requested.parse() {
        Ok(kind) => kind,
        Err(err) => {
            warn!("{err} in {BACKEND_ENV}, keeping {configured}.");
            configured
        }
    }
}

static WGPU_INIT: OnceLock<()> = OnceLock::new();

pub fn init_wgpu(device: &WgpuDevice) {
    WGPU_INIT.get_or_init(|| {
        #[cfg(target_os = "macos")]
        wgpu::init_setup::<Metal>(device, Default::default());
        #[cfg(not(target_os = "macos"))]
        wgpu::init_setup::<Vulkan>(device, Default::default());
    });
}

/// Share compiled kernels and autotune results across runs.
pub fn init_cubecl_config() {
    static CUBECL_CONFIG: OnceLock<()> = OnceLock::new();
    CUBECL_CONFIG.get_or_init(|| {
        let mut config = cubecl_runtime::config::GlobalConfig::default();
        config.compilation.cache = Some(cubecl_runtime::config::cache::CacheConfig::Global);
        config.autotune.cache = cubecl_runtime::config::cache::CacheConfig::Global;
        let _ = std::panic::catch_unwind(|| cubecl_runtime::config::GlobalConfig::set(config));
    });
}
