use crate::foundation::config::PipelineConfig;
use crate::foundation::core::{Canvas, DisplayState, FrameIndex, Generation, SurfaceKind};
use crate::foundation::error::{PlasmaError, PlasmaResult};
use crate::protocol::wire::{ResultHeader, Task};
use crate::schedule::queue::{Frame, FrameQueue};
use crate::worker::pool::{TaskSubmit, WorkerEvent};

/// Running counters for one dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DispatchStats {
    /// Tasks written to a worker.
    pub tasks_submitted: u64,
    /// Results accepted into the reassembly queue.
    pub frames_received: u64,
    /// Frames handed to presentation.
    pub frames_presented: u64,
    /// Results dropped because their generation was superseded.
    pub stale_discarded: u64,
    /// Results dropped for breaking the payload size contract.
    pub malformed_discarded: u64,
    /// Current-generation results that arrived after a later frame was already shown.
    pub late_discarded: u64,
    /// Results from workers already taken out of rotation.
    pub orphaned_discarded: u64,
    /// Queued frames dropped by generation changes.
    pub frames_purged: u64,
    /// Generation changes caused by resize or iconify/restore.
    pub generation_bumps: u64,
    /// Workers taken out of rotation after a connection failure.
    pub workers_lost: u64,
}

#[derive(Clone, Copy, Debug)]
struct WorkerSlot {
    alive: bool,
    in_flight: usize,
}

/// Single-threaded control loop state: what to request next and what to show next.
///
/// All mutation happens through [`Dispatcher::tick`] and [`Dispatcher::handle_event`], which the
/// session calls from one thread. Tasks go out round-robin over live workers, bounded by
/// `max_outstanding` in flight and `max_pending` in flight plus queued. A resize or an
/// iconify/restore starts a new generation: counters reset, the queue is purged, and results
/// still in flight from older generations are discarded when they arrive.
pub struct Dispatcher<P> {
    cfg: PipelineConfig,
    pool: P,
    slots: Vec<WorkerSlot>,
    next_worker: usize,

    generation: Generation,
    iconified: bool,
    target: Canvas,

    next_request: FrameIndex,
    next_display: FrameIndex,
    outstanding: usize,
    queue: FrameQueue,

    stats: DispatchStats,
}

impl<P: TaskSubmit> Dispatcher<P> {
    /// Create a dispatcher in generation 1 targeting the initial display state.
    ///
    /// Nothing is submitted until [`Dispatcher::top_up`] or [`Dispatcher::tick`] runs.
    pub fn new(cfg: PipelineConfig, pool: P, initial: DisplayState) -> PlasmaResult<Self> {
        cfg.validate()?;
        let n = pool.worker_count();
        if n == 0 {
            return Err(PlasmaError::validation("dispatcher needs at least one worker"));
        }
        let target = if initial.iconified {
            cfg.icon
        } else {
            initial.canvas
        };
        Ok(Self {
            cfg,
            pool,
            slots: vec![
                WorkerSlot {
                    alive: true,
                    in_flight: 0,
                };
                n
            ],
            next_worker: 0,
            generation: Generation::FIRST,
            iconified: initial.iconified,
            target,
            next_request: FrameIndex(0),
            next_display: FrameIndex(0),
            outstanding: 0,
            queue: FrameQueue::new(),
            stats: DispatchStats::default(),
        })
    }

    /// One timer tick: re-sample the display, release the oldest queued frame, then top up
    /// outstanding work.
    pub fn tick(&mut self, state: DisplayState) -> Option<Frame> {
        self.observe(state);

        let frame = self.queue.pop_oldest();
        if let Some(f) = frame.as_ref() {
            if f.index > self.next_display {
                self.next_display = f.index;
            }
            self.next_display = self.next_display.next();
            self.stats.frames_presented += 1;
        }

        self.top_up();
        frame
    }

    /// Apply a display sample. Returns `true` when it started a new generation.
    ///
    /// Toggling iconified state always bumps the generation and switches the target between icon
    /// and canvas dimensions. While visible, any change of a non-empty canvas size bumps too;
    /// empty canvas samples are ignored. Restoring onto an empty canvas leaves the target empty,
    /// so nothing is requested until the canvas is laid out.
    pub fn observe(&mut self, state: DisplayState) -> bool {
        let mut bumped = false;
        if state.iconified != self.iconified {
            self.iconified = state.iconified;
            self.bump_generation();
            bumped = true;
        }

        if self.iconified {
            self.target = self.cfg.icon;
        } else if !state.canvas.is_empty() && state.canvas != self.target {
            self.target = state.canvas;
            if !bumped {
                self.bump_generation();
                bumped = true;
            }
        } else if bumped && state.canvas.is_empty() {
            self.target = Canvas::default();
        }
        bumped
    }

    /// React to one worker event, then top up immediately so freed capacity is reused. Events from
    /// workers already out of rotation are counted and dropped.
    pub fn handle_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Result {
                worker,
                header,
                payload,
            } => {
                if self.is_orphaned(worker, &header) {
                    return;
                }
                self.settle(worker);
                if self.is_current(&header) && !self.is_late(&header) {
                    match Frame::from_result(header, payload) {
                        Ok(frame) => {
                            self.stats.frames_received += 1;
                            self.queue.insert(frame);
                        }
                        Err(e) => self.reject(worker, &e),
                    }
                }
            }
            WorkerEvent::Malformed { worker, header } => {
                if self.is_orphaned(worker, &header) {
                    return;
                }
                self.settle(worker);
                if self.is_current(&header) {
                    let err = header
                        .validate()
                        .err()
                        .unwrap_or_else(|| PlasmaError::protocol("malformed result"));
                    self.reject(worker, &err);
                }
            }
            WorkerEvent::Disconnected { worker, reason } => {
                let reason = reason.unwrap_or_else(|| "end of stream".to_string());
                self.lose_worker(worker, &reason);
            }
        }
        self.top_up();
    }

    /// Submit tasks while both caps allow it.
    ///
    /// Afterwards `outstanding <= max_outstanding` and `outstanding + queued <= max_pending`
    /// hold unless they already failed before the call.
    pub fn top_up(&mut self) {
        if self.target.is_empty() {
            return;
        }
        let live = self.live_workers();
        if live == 0 {
            return;
        }
        let max_outstanding = self.cfg.max_outstanding(live);
        let max_pending = self.cfg.max_pending.max(1);

        while self.outstanding < max_outstanding
            && self.outstanding + self.queue.count() < max_pending
        {
            let Some(worker) = self.next_live_worker() else {
                return;
            };
            let task = Task {
                generation: self.generation,
                frame_index: self.next_request,
                size: self.target,
                surface: self.surface(),
            };
            match self.pool.submit(worker, &task) {
                Ok(()) => {
                    self.outstanding += 1;
                    self.slots[worker].in_flight += 1;
                    self.next_request = self.next_request.next();
                    self.stats.tasks_submitted += 1;
                }
                Err(e) if e.is_connection() => {
                    self.lose_worker(worker, &e.to_string());
                    return;
                }
                Err(e) => {
                    tracing::warn!(worker, error = %e, "task not submitted");
                    return;
                }
            }
        }
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Size requested for new tasks.
    pub fn target(&self) -> Canvas {
        self.target
    }

    /// Surface new tasks are rendered for.
    pub fn surface(&self) -> SurfaceKind {
        if self.iconified {
            SurfaceKind::Icon
        } else {
            SurfaceKind::Main
        }
    }

    /// Whether the display is currently iconified.
    pub fn is_iconified(&self) -> bool {
        self.iconified
    }

    /// Tasks submitted but not yet answered.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Frames received but not yet presented.
    pub fn queued(&self) -> usize {
        self.queue.count()
    }

    /// Frame index the next task will carry.
    pub fn next_request(&self) -> FrameIndex {
        self.next_request
    }

    /// Frame index expected to be shown next.
    pub fn next_display(&self) -> FrameIndex {
        self.next_display
    }

    /// Workers still in rotation.
    pub fn live_workers(&self) -> usize {
        self.slots.iter().filter(|s| s.alive).count()
    }

    /// Whether worker `worker` is still in rotation.
    pub fn is_worker_alive(&self, worker: usize) -> bool {
        self.slots.get(worker).is_some_and(|s| s.alive)
    }

    /// Counters so far.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Borrow the reassembly queue.
    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    /// Borrow the worker pool.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Mutably borrow the worker pool.
    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    /// Give the worker pool back, dropping all dispatcher state.
    pub fn into_pool(self) -> P {
        self.pool
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.bump();
        self.next_request = FrameIndex(0);
        self.next_display = FrameIndex(0);
        let purged = self.queue.purge_all();
        self.stats.generation_bumps += 1;
        self.stats.frames_purged += purged as u64;
        tracing::info!(
            generation = self.generation.0,
            purged,
            in_flight = self.outstanding,
            iconified = self.iconified,
            "generation changed"
        );
    }

    fn is_current(&mut self, header: &ResultHeader) -> bool {
        if header.generation == self.generation {
            return true;
        }
        self.stats.stale_discarded += 1;
        tracing::debug!(
            frame = header.frame_index.0,
            generation = header.generation.0,
            current = self.generation.0,
            "discarding stale result"
        );
        false
    }

    // Presented indices only move forward within a generation.
    fn is_late(&mut self, header: &ResultHeader) -> bool {
        if header.frame_index >= self.next_display {
            return false;
        }
        self.stats.late_discarded += 1;
        tracing::debug!(
            frame = header.frame_index.0,
            next_display = self.next_display.0,
            "discarding result that missed its slot"
        );
        true
    }

    // The in-flight work of a lost worker was written off when it was lost.
    fn is_orphaned(&mut self, worker: usize, header: &ResultHeader) -> bool {
        if self.is_worker_alive(worker) {
            return false;
        }
        self.stats.orphaned_discarded += 1;
        tracing::debug!(
            worker,
            frame = header.frame_index.0,
            "discarding result from a lost worker"
        );
        true
    }

    fn reject(&mut self, worker: usize, err: &PlasmaError) {
        self.stats.malformed_discarded += 1;
        tracing::warn!(worker, error = %err, "discarding malformed result");
    }

    // Lost workers already had their in-flight count written off.
    fn settle(&mut self, worker: usize) {
        if let Some(slot) = self.slots.get_mut(worker)
            && slot.alive
            && slot.in_flight > 0
        {
            slot.in_flight -= 1;
            self.outstanding = self.outstanding.saturating_sub(1);
        }
    }

    fn lose_worker(&mut self, worker: usize, reason: &str) {
        let Some(slot) = self.slots.get_mut(worker) else {
            return;
        };
        if !slot.alive {
            return;
        }
        slot.alive = false;
        self.outstanding = self.outstanding.saturating_sub(slot.in_flight);
        slot.in_flight = 0;
        self.stats.workers_lost += 1;
        tracing::warn!(
            worker,
            reason,
            live = self.live_workers(),
            "worker removed from rotation"
        );
    }

    fn next_live_worker(&mut self) -> Option<usize> {
        let n = self.slots.len();
        for step in 0..n {
            let i = (self.next_worker + step) % n;
            if self.slots[i].alive {
                self.next_worker = (i + 1) % n;
                return Some(i);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/dispatcher.rs"]
mod tests;
