use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;

use crate::foundation::core::{Canvas, FrameIndex, SurfaceKind};
use crate::foundation::error::PlasmaResult;

/// Host surface that shows installed frames.
///
/// Ordering contract: within one generation, `present` sees non-decreasing `idx` values.
pub trait PresentSink {
    /// Show `image` on `surface`.
    fn present(
        &mut self,
        surface: SurfaceKind,
        idx: FrameIndex,
        image: &RgbaImage,
    ) -> PlasmaResult<()>;
}

impl<T: PresentSink + ?Sized> PresentSink for Box<T> {
    fn present(
        &mut self,
        surface: SurfaceKind,
        idx: FrameIndex,
        image: &RgbaImage,
    ) -> PlasmaResult<()> {
        (**self).present(surface, idx, image)
    }
}

/// Sink that only counts what it is shown.
#[derive(Debug, Default)]
pub struct NullSink {
    /// Frames presented so far.
    pub presented: u64,
}

impl PresentSink for NullSink {
    fn present(&mut self, _: SurfaceKind, _: FrameIndex, _: &RgbaImage) -> PlasmaResult<()> {
        self.presented += 1;
        Ok(())
    }
}

/// One frame captured by [`InMemorySink`].
#[derive(Clone, Debug, PartialEq)]
pub struct PresentedFrame {
    /// Surface it was shown on.
    pub surface: SurfaceKind,
    /// Frame index within its generation.
    pub index: FrameIndex,
    /// Copy of the shown image.
    pub image: RgbaImage,
}

impl PresentedFrame {
    /// Image dimensions.
    pub fn size(&self) -> Canvas {
        Canvas::new(self.image.width(), self.image.height())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    frames: Vec<PresentedFrame>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames in presentation order.
    pub fn frames(&self) -> &[PresentedFrame] {
        &self.frames
    }
}

impl PresentSink for InMemorySink {
    fn present(
        &mut self,
        surface: SurfaceKind,
        idx: FrameIndex,
        image: &RgbaImage,
    ) -> PlasmaResult<()> {
        self.frames.push(PresentedFrame {
            surface,
            index: idx,
            image: image.clone(),
        });
        Ok(())
    }
}

/// Writes every presented frame to `<dir>/<seq>_<surface>_<index>.png`.
///
/// `seq` counts presentations across generations, so file names sort in display order.
#[derive(Debug)]
pub struct PngDirSink {
    dir: PathBuf,
    written: u64,
}

impl PngDirSink {
    /// Create `dir` if needed.
    pub fn create(dir: impl Into<PathBuf>) -> PlasmaResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        Ok(Self { dir, written: 0 })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn path_for(&self, surface: SurfaceKind, idx: FrameIndex) -> PathBuf {
        let tag = match surface {
            SurfaceKind::Main => "main",
            SurfaceKind::Icon => "icon",
        };
        self.dir.join(format!("{:06}_{tag}_{:05}.png", self.written, idx.0))
    }
}

impl PresentSink for PngDirSink {
    fn present(
        &mut self,
        surface: SurfaceKind,
        idx: FrameIndex,
        image: &RgbaImage,
    ) -> PlasmaResult<()> {
        let path = self.path_for(surface, idx);
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/sink.rs"]
mod tests;
