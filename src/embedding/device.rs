use candle_core::Device;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

/// Selects the compute device for model weights (falls back to CPU).
///
/// GPU backends are only tried when the matching cargo feature is enabled.
pub fn select_device() -> Device {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Scoring on Metal GPU");
                return device;
            }
            Err(e) => {
                warn!(error = %e, "Metal device unavailable");
                failures.push(format!("metal failed: {e}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Scoring on CUDA GPU");
                return device;
            }
            Err(e) => {
                warn!(error = %e, "CUDA device unavailable");
                failures.push(format!("cuda failed: {e}"));
            }
        }
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        debug!("No GPU features enabled, scoring on CPU");
        Device::Cpu
    }

    #[cfg(any(feature = "metal", feature = "cuda"))]
    {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
        Device::Cpu
    }
}
