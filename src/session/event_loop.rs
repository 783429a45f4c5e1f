use std::time::{Duration, Instant};

use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{PlasmaError, PlasmaResult};
use crate::present::adapter::Presenter;
use crate::present::host::DisplaySource;
use crate::present::sink::PresentSink;
use crate::schedule::dispatcher::{DispatchStats, Dispatcher};
use crate::worker::pool::{EventSource, TaskSubmit};

/// When [`Session::run`] returns. Unset bounds do not apply; with both unset the run only ends
/// when every worker is gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunLimit {
    /// Stop after this many frames were presented.
    pub max_presented: Option<u64>,
    /// Stop after this many ticks.
    pub max_ticks: Option<u64>,
}

impl RunLimit {
    /// Stop after `n` presented frames.
    pub fn frames(n: u64) -> Self {
        Self {
            max_presented: Some(n),
            max_ticks: None,
        }
    }

    /// Stop after `n` ticks.
    pub fn ticks(n: u64) -> Self {
        Self {
            max_presented: None,
            max_ticks: Some(n),
        }
    }

    fn reached(&self, presented: u64, ticks: u64) -> bool {
        self.max_presented.is_some_and(|n| presented >= n)
            || self.max_ticks.is_some_and(|n| ticks >= n)
    }
}

/// One coordinator: a dispatcher plus the host collaborators it is driven by.
///
/// The loop waits for worker events until the next tick deadline. Events are handled as they
/// arrive; at the deadline the display is sampled, at most one frame is presented and the timer is
/// re-armed. Ticks missed while busy are not replayed.
pub struct Session<P, S, K> {
    dispatcher: Dispatcher<P>,
    display: S,
    sink: K,
    presenter: Presenter,
    ticks: u64,
}

impl<P, S, K> Session<P, S, K>
where
    P: TaskSubmit + EventSource,
    S: DisplaySource,
    K: PresentSink,
{
    /// Sample the display once and build the dispatcher for that state.
    pub fn new(cfg: PipelineConfig, pool: P, mut display: S, sink: K) -> PlasmaResult<Self> {
        let initial = display.sample();
        tracing::debug!(
            canvas = %initial.canvas,
            iconified = initial.iconified,
            "initial display state"
        );
        Ok(Self {
            dispatcher: Dispatcher::new(cfg, pool, initial)?,
            display,
            sink,
            presenter: Presenter::new(),
            ticks: 0,
        })
    }

    /// Run until `limit` is reached.
    ///
    /// Fails with a connection error once no worker is left, and with the sink's error if
    /// presentation fails.
    pub fn run(&mut self, limit: RunLimit) -> PlasmaResult<DispatchStats> {
        let interval = self.dispatcher.config().tick_interval();
        self.dispatcher.top_up();
        let mut deadline = Instant::now() + interval;

        while !limit.reached(self.presenter.presented(), self.ticks) {
            if self.dispatcher.live_workers() == 0 {
                return Err(PlasmaError::connection("every worker is gone"));
            }

            let now = Instant::now();
            if now < deadline {
                match self.dispatcher.pool_mut().next_event(deadline - now) {
                    Some(event) => {
                        self.dispatcher.handle_event(event);
                        continue;
                    }
                    // Timed out, or no reader is left; either way wait out the tick.
                    None => std::thread::sleep(deadline.saturating_duration_since(Instant::now())),
                }
            }

            self.tick()?;
            deadline = rearm(deadline, interval, Instant::now());
        }

        let stats = self.dispatcher.stats();
        tracing::info!(
            ticks = self.ticks,
            presented = self.presenter.presented(),
            stale = stats.stale_discarded,
            malformed = stats.malformed_discarded,
            "session finished"
        );
        Ok(stats)
    }

    fn tick(&mut self) -> PlasmaResult<()> {
        self.ticks += 1;
        let state = self.display.sample();
        if let Some(frame) = self.dispatcher.tick(state) {
            self.presenter.present(frame, &mut self.sink)?;
        }
        Ok(())
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presenter.presented()
    }

    /// Borrow the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<P> {
        &self.dispatcher
    }

    /// Borrow the presenter.
    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Borrow the display source.
    pub fn display(&self) -> &S {
        &self.display
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Tear the session apart, returning the pool, display source and sink.
    pub fn into_parts(self) -> (P, S, K) {
        (self.dispatcher.into_pool(), self.display, self.sink)
    }
}

// Next deadline one interval on; a deadline already behind `now` restarts from `now`.
fn rearm(deadline: Instant, interval: Duration, now: Instant) -> Instant {
    let next = deadline + interval;
    if next <= now { now + interval } else { next }
}

#[cfg(test)]
#[path = "../../tests/unit/session/event_loop.rs"]
mod tests;
