use std::collections::VecDeque;

use crate::foundation::core::{Canvas, DisplayState};

/// Source of display size/visibility, sampled once per tick.
pub trait DisplaySource {
    /// Current display state.
    fn sample(&mut self) -> DisplayState;
}

impl<T: DisplaySource + ?Sized> DisplaySource for Box<T> {
    fn sample(&mut self) -> DisplayState {
        (**self).sample()
    }
}

/// A display that never changes.
#[derive(Clone, Copy, Debug)]
pub struct FixedDisplay(pub DisplayState);

impl FixedDisplay {
    /// A visible display of the given size.
    pub fn visible(canvas: Canvas) -> Self {
        Self(DisplayState::visible(canvas))
    }
}

impl DisplaySource for FixedDisplay {
    fn sample(&mut self) -> DisplayState {
        self.0
    }
}

/// A change a [`ScriptedDisplay`] applies at a given sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayChange {
    /// The canvas takes a new size; visibility is unchanged.
    Resize(Canvas),
    /// The window is iconified.
    Iconify,
    /// The window is restored from the icon.
    Restore,
}

/// A display driven by a fixed script of changes keyed by sample number.
///
/// Sample numbers count calls to [`DisplaySource::sample`] starting at 0. A change keyed to
/// sample `n` is visible in the value returned by the `n`-th call and every call after it. A
/// [`Session`](crate::session::event_loop::Session) takes sample 0 when it is built and one more
/// per tick, so sample `n` is what tick `n` sees.
#[derive(Clone, Debug)]
pub struct ScriptedDisplay {
    state: DisplayState,
    script: VecDeque<(u64, DisplayChange)>,
    samples: u64,
}

impl ScriptedDisplay {
    /// Start from `initial` with an empty script.
    pub fn new(initial: DisplayState) -> Self {
        Self {
            state: initial,
            script: VecDeque::new(),
            samples: 0,
        }
    }

    /// Schedule `change` for sample `at`. Changes for the same sample apply in the order given.
    pub fn at(mut self, at: u64, change: DisplayChange) -> Self {
        let i = self.script.partition_point(|(k, _)| *k <= at);
        self.script.insert(i, (at, change));
        self
    }

    /// Samples taken so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// State as of the last sample.
    pub fn current(&self) -> DisplayState {
        self.state
    }
}

impl DisplaySource for ScriptedDisplay {
    fn sample(&mut self) -> DisplayState {
        while let Some(&(at, change)) = self.script.front() {
            if at > self.samples {
                break;
            }
            self.script.pop_front();
            match change {
                DisplayChange::Resize(canvas) => self.state.canvas = canvas,
                DisplayChange::Iconify => self.state.iconified = true,
                DisplayChange::Restore => self.state.iconified = false,
            }
            tracing::debug!(sample = self.samples, ?change, "display changed");
        }
        self.samples += 1;
        self.state
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/host.rs"]
mod tests;
