use super::*;
use crate::foundation::core::{Canvas, FrameIndex, Generation, SurfaceKind};
use crate::protocol::stream::{Incoming, read_result, write_task};
use crate::protocol::wire::Task;
use crate::worker::render::CheckerRenderer;
use std::io::Cursor;
use std::sync::Mutex;

fn task(frame: u32, w: u32, h: u32) -> Task {
    Task {
        generation: Generation(4),
        frame_index: FrameIndex(frame),
        size: Canvas::new(w, h),
        surface: SurfaceKind::Main,
    }
}

fn encode_tasks(tasks: &[Task]) -> Cursor<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    for t in tasks {
        write_task(&mut buf, t).unwrap();
    }
    Cursor::new(buf)
}

/// Records the `sequence_id` of every call; fills pixels with the low byte of the frame index.
struct Recording {
    seqs: Mutex<Vec<u32>>,
}

impl FrameRenderer for Recording {
    fn render(&self, size: Canvas, frame: FrameIndex, sequence_id: u32) -> Vec<u8> {
        self.seqs.lock().unwrap().push(sequence_id);
        vec![frame.0 as u8; size.rgba8_len()]
    }

    fn time_steps(&self) -> u32 {
        10
    }
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn results_echo_task_fields_with_exact_payload() {
    let tasks = [task(0, 3, 2), task(1, 5, 4)];
    let mut input = encode_tasks(&tasks);
    let mut output: Vec<u8> = Vec::new();

    let exit = run_worker(&mut input, &mut output, &CheckerRenderer::default()).unwrap();
    assert_eq!(exit.tasks_served, 2);
    assert_eq!(exit.tasks_skipped, 0);

    let mut r = Cursor::new(output);
    for t in &tasks {
        let Some(Incoming::Frame { header, payload }) = read_result(&mut r).unwrap() else {
            panic!("expected a frame for {t:?}");
        };
        assert_eq!(header.generation, t.generation);
        assert_eq!(header.frame_index, t.frame_index);
        assert_eq!(header.width as u32, t.size.width);
        assert_eq!(header.height as u32, t.size.height);
        assert_eq!(header.surface, t.surface);
        assert_eq!(payload.len(), t.size.rgba8_len());
    }
    assert!(read_result(&mut r).unwrap().is_none());
}

#[test]
fn zero_sized_tasks_get_no_response() {
    let mut input = encode_tasks(&[task(0, 0, 10), task(1, 2, 2)]);
    let mut output: Vec<u8> = Vec::new();

    let exit = run_worker(&mut input, &mut output, &CheckerRenderer::default()).unwrap();
    assert_eq!(exit.tasks_served, 1);
    assert_eq!(exit.tasks_skipped, 1);

    let mut r = Cursor::new(output);
    let Some(Incoming::Frame { header, .. }) = read_result(&mut r).unwrap() else {
        panic!("expected one frame");
    };
    assert_eq!(header.frame_index, FrameIndex(1));
    assert!(read_result(&mut r).unwrap().is_none());
}

#[test]
fn sequence_id_is_frame_over_time_steps() {
    let renderer = Recording {
        seqs: Mutex::new(Vec::new()),
    };
    let mut input = encode_tasks(&[task(0, 1, 1), task(9, 1, 1), task(10, 1, 1), task(25, 1, 1)]);
    run_worker(&mut input, &mut Vec::<u8>::new(), &renderer).unwrap();
    assert_eq!(*renderer.seqs.lock().unwrap(), vec![0, 0, 1, 2]);
}

#[test]
fn empty_input_exits_cleanly() {
    let mut input = Cursor::new(Vec::<u8>::new());
    let exit = run_worker(&mut input, &mut Vec::<u8>::new(), &CheckerRenderer::default()).unwrap();
    assert_eq!(exit, WorkerExit::default());
}

#[test]
fn write_failure_ends_the_loop() {
    let mut input = encode_tasks(&[task(0, 2, 2), task(1, 2, 2)]);
    let err = run_worker(&mut input, &mut Broken, &CheckerRenderer::default()).unwrap_err();
    assert!(err.is_connection());
}

#[test]
fn truncated_task_is_a_connection_error() {
    let mut bytes = encode_tasks(&[task(0, 2, 2)]).into_inner();
    bytes.truncate(bytes.len() - 3);
    let err = run_worker(
        &mut Cursor::new(bytes),
        &mut Vec::<u8>::new(),
        &CheckerRenderer::default(),
    )
    .unwrap_err();
    assert!(err.is_connection());
}
