use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PlasmaError, PlasmaResult};

/// Default display refresh target.
pub const DEFAULT_TARGET_FPS: u32 = 30;
/// Default cap on outstanding + queued frames.
pub const DEFAULT_MAX_PENDING: usize = 2;
/// Default icon edge length in pixels.
pub const DEFAULT_ICON_SIZE: u32 = 96;

/// Tunables for the frame pipeline.
///
/// Every field has a default, so a JSON file only needs to mention what it overrides:
///
/// ```json
/// { "target_fps": 24, "icon": { "width": 64, "height": 64 } }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Display refresh target. Sets the tick period and caps in-flight requests.
    pub target_fps: u32,
    /// Joint cap on outstanding requests plus queued, undisplayed frames.
    pub max_pending: usize,
    /// Icon surface dimensions, used as the render target while iconified.
    pub icon: Canvas,
    /// Worker process count. `None` uses the detected CPU count.
    pub workers: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            max_pending: DEFAULT_MAX_PENDING,
            icon: Canvas::new(DEFAULT_ICON_SIZE, DEFAULT_ICON_SIZE),
            workers: None,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_path(path: &Path) -> PlasmaResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(std::io::BufReader::new(f))
            .map_err(|e| PlasmaError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the dispatcher cannot run with.
    pub fn validate(&self) -> PlasmaResult<()> {
        if self.target_fps == 0 {
            return Err(PlasmaError::validation("target_fps must be > 0"));
        }
        if self.target_fps > 1000 {
            return Err(PlasmaError::validation("target_fps must be <= 1000"));
        }
        if self.max_pending == 0 {
            return Err(PlasmaError::validation("max_pending must be > 0"));
        }
        if self.icon.is_empty() {
            return Err(PlasmaError::validation("icon dimensions must be non-zero"));
        }
        if self.workers == Some(0) {
            return Err(PlasmaError::validation("workers must be >= 1 when set"));
        }
        Ok(())
    }

    /// Period between dispatcher ticks (`1000 / target_fps` ms).
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(1000 / self.target_fps.max(1)))
    }

    /// Cap on in-flight requests: at most one per live worker and never above the target FPS.
    pub fn max_outstanding(&self, live_workers: usize) -> usize {
        (self.target_fps as usize).min(live_workers).max(1)
    }

    /// Number of worker processes to spawn.
    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
