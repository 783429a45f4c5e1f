use image::RgbaImage;

use crate::foundation::core::SurfaceKind;
use crate::foundation::error::{PlasmaError, PlasmaResult};
use crate::present::sink::PresentSink;
use crate::schedule::queue::Frame;

/// Keeps the installed image for each surface and shows it through a sink.
///
/// Installing is a straight move of the frame's pixel buffer into an [`RgbaImage`]; there is no
/// scaling or color conversion.
#[derive(Debug, Default)]
pub struct Presenter {
    main: Option<RgbaImage>,
    icon: Option<RgbaImage>,
    presented: u64,
}

impl Presenter {
    /// Create a presenter with nothing installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the frame's surface image with the frame, then show it.
    pub fn present<K: PresentSink + ?Sized>(
        &mut self,
        frame: Frame,
        sink: &mut K,
    ) -> PlasmaResult<()> {
        let Frame {
            index,
            size,
            surface,
            pixels,
            ..
        } = frame;
        let image = RgbaImage::from_raw(size.width, size.height, pixels).ok_or_else(|| {
            PlasmaError::protocol(format!("frame {} does not fill a {size} image", index.0))
        })?;

        let slot = match surface {
            SurfaceKind::Main => &mut self.main,
            SurfaceKind::Icon => &mut self.icon,
        };
        let image = slot.insert(image);
        sink.present(surface, index, image)?;
        self.presented += 1;
        Ok(())
    }

    /// Image currently installed on `surface`.
    pub fn installed(&self, surface: SurfaceKind) -> Option<&RgbaImage> {
        match surface {
            SurfaceKind::Main => self.main.as_ref(),
            SurfaceKind::Icon => self.icon.as_ref(),
        }
    }

    /// Frames shown so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/adapter.rs"]
mod tests;
