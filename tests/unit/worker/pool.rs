use super::*;
use crate::foundation::core::{Canvas, FrameIndex, Generation, SurfaceKind};

fn task() -> Task {
    Task {
        generation: Generation(1),
        frame_index: FrameIndex(0),
        size: Canvas::new(2, 2),
        surface: SurfaceKind::Main,
    }
}

#[test]
fn zero_workers_is_rejected() {
    let err = WorkerPool::spawn(&WorkerCommand::new("true"), 0).err().unwrap();
    assert!(matches!(err, PlasmaError::Validation(_)));
}

#[test]
fn missing_program_is_a_fatal_spawn_error() {
    let cmd = WorkerCommand::new("/nonexistent/plasma-worker-binary").arg("worker");
    let err = WorkerPool::spawn(&cmd, 3).err().unwrap();
    assert!(matches!(err, PlasmaError::Spawn(_)));
}

#[test]
fn worker_command_appends_args() {
    let cmd = WorkerCommand::new("prog").arg("worker").arg("--quiet");
    assert_eq!(cmd.program, PathBuf::from("prog"));
    assert_eq!(
        cmd.args,
        vec![OsString::from("worker"), OsString::from("--quiet")]
    );
}

#[cfg(unix)]
#[test]
fn exiting_workers_report_clean_disconnect() {
    let mut pool = WorkerPool::spawn(&WorkerCommand::new("true"), 2).unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.pids().len(), 2);

    let mut seen = [false; 2];
    while !seen.iter().all(|s| *s) {
        match pool.poll_readable(Duration::from_secs(10)) {
            Some(WorkerEvent::Disconnected { worker, reason }) => {
                assert!(reason.is_none());
                seen[worker] = true;
            }
            Some(other) => panic!("unexpected event {other:?}"),
            None => panic!("timed out waiting for workers to exit"),
        }
    }

    // Both read ends are gone once the processes exit.
    let err = pool.submit(0, &task()).unwrap_err();
    assert!(err.is_connection());
    let err = pool.submit(0, &task()).unwrap_err();
    assert!(err.is_connection());
    assert!(matches!(
        pool.submit(9, &task()),
        Err(PlasmaError::Validation(_))
    ));

    pool.shutdown();
    assert!(pool.is_empty());
    assert!(pool.poll_readable(Duration::from_millis(1)).is_none());
}
