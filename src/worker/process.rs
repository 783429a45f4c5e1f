use std::io::{Read, Write};

use crate::foundation::error::{PlasmaError, PlasmaResult};
use crate::protocol::stream::{read_task, write_result};
use crate::protocol::wire::{MAX_PAYLOAD_BYTES, ResultHeader};
use crate::worker::render::FrameRenderer;

/// Counters reported when a worker loop ends cleanly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerExit {
    /// Tasks answered with a result.
    pub tasks_served: u64,
    /// Tasks dropped without a response (degenerate or oversized dimensions).
    pub tasks_skipped: u64,
}

/// Serve tasks from `input` until the coordinator closes it.
///
/// Each valid task is answered on `output` with one header + payload message. Tasks with a zero
/// dimension get no response. Returns once `input` reaches a clean end-of-stream; any write failure
/// ends the loop with an error, after which the process is expected to exit.
pub fn run_worker<R, W>(
    input: &mut R,
    output: &mut W,
    renderer: &dyn FrameRenderer,
) -> PlasmaResult<WorkerExit>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut exit = WorkerExit::default();
    let steps = renderer.time_steps().max(1);

    while let Some(task) = read_task(input)? {
        if task.size.is_empty() || task.size.rgba8_len() > MAX_PAYLOAD_BYTES {
            tracing::debug!(
                frame = task.frame_index.0,
                size = %task.size,
                "skipping task with unusable dimensions"
            );
            exit.tasks_skipped += 1;
            continue;
        }

        let sequence_id = task.frame_index.0 / steps;
        let pixels = renderer.render(task.size, task.frame_index, sequence_id);
        if pixels.len() != task.size.rgba8_len() {
            return Err(PlasmaError::validation(format!(
                "renderer produced {} bytes for {}, expected {}",
                pixels.len(),
                task.size,
                task.size.rgba8_len()
            )));
        }

        let header = ResultHeader::for_task(&task, pixels.len())?;
        write_result(output, &header, &pixels)?;
        exit.tasks_served += 1;
    }

    Ok(exit)
}

#[cfg(test)]
#[path = "../../tests/unit/worker/process.rs"]
mod tests;
