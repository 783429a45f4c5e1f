use std::io::{ErrorKind, Read, Write};

use crate::foundation::error::{PlasmaError, PlasmaResult};
use crate::protocol::wire::{MAX_PAYLOAD_BYTES, RESULT_HEADER_LEN, ResultHeader, TASK_LEN, Task};

/// Outcome of [`read_all`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadStatus {
    /// The buffer was filled.
    Complete,
    /// The stream ended before any byte was read. This is a clean close, not an error.
    Eof,
}

/// One result read off a worker stream.
#[derive(Debug)]
pub enum Incoming {
    /// Header passed validation and the payload was read in full.
    Frame {
        /// Validated header.
        header: ResultHeader,
        /// `width * height * 4` RGBA8 bytes.
        payload: Vec<u8>,
    },
    /// Header failed validation; its declared payload was skipped so the stream stays aligned.
    Malformed {
        /// Offending header.
        header: ResultHeader,
    },
}

/// Write every byte of `bytes`, retrying interrupted writes.
///
/// Any other failure, including a zero-length write, is a connection error.
pub fn write_all<W: Write + ?Sized>(stream: &mut W, bytes: &[u8]) -> PlasmaResult<()> {
    let mut sent = 0;
    while sent < bytes.len() {
        match stream.write(&bytes[sent..]) {
            Ok(0) => {
                return Err(PlasmaError::connection(format!(
                    "stream accepted no bytes after {sent} of {}",
                    bytes.len()
                )));
            }
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(PlasmaError::connection(format!("write failed: {e}"))),
        }
    }
    Ok(())
}

/// Fill `buf` from `stream`, retrying interrupted reads.
///
/// End-of-stream before the first byte yields [`ReadStatus::Eof`]; end-of-stream part way through
/// is a connection error.
pub fn read_all<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> PlasmaResult<ReadStatus> {
    let mut got = 0;
    while got < buf.len() {
        match stream.read(&mut buf[got..]) {
            Ok(0) if got == 0 => return Ok(ReadStatus::Eof),
            Ok(0) => {
                return Err(PlasmaError::connection(format!(
                    "stream closed after {got} of {} bytes",
                    buf.len()
                )));
            }
            Ok(n) => got += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(PlasmaError::connection(format!("read failed: {e}"))),
        }
    }
    Ok(ReadStatus::Complete)
}

/// Send one task and flush.
pub fn write_task<W: Write + ?Sized>(stream: &mut W, task: &Task) -> PlasmaResult<()> {
    write_all(stream, &task.encode()?)?;
    flush(stream)
}

/// Read one task. `Ok(None)` means the coordinator closed the stream.
pub fn read_task<R: Read + ?Sized>(stream: &mut R) -> PlasmaResult<Option<Task>> {
    let mut buf = [0u8; TASK_LEN];
    match read_all(stream, &mut buf)? {
        ReadStatus::Eof => Ok(None),
        ReadStatus::Complete => Task::decode(&buf).map(Some),
    }
}

/// Send a result header followed by its payload, then flush.
pub fn write_result<W: Write + ?Sized>(
    stream: &mut W,
    header: &ResultHeader,
    payload: &[u8],
) -> PlasmaResult<()> {
    if usize::try_from(header.payload_size).ok() != Some(payload.len()) {
        return Err(PlasmaError::validation(format!(
            "header declares {} payload bytes but {} were given",
            header.payload_size,
            payload.len()
        )));
    }
    write_all(stream, &header.encode()?)?;
    write_all(stream, payload)?;
    flush(stream)
}

/// Read one result. `Ok(None)` means the worker closed its stream cleanly.
///
/// A header whose payload size breaks the `width * height * 4` contract is returned as
/// [`Incoming::Malformed`] after skipping the declared bytes. Headers that cannot be skipped
/// (negative payloads, unparsable fields) and payloads above [`MAX_PAYLOAD_BYTES`] are connection
/// errors: the stream can no longer be trusted.
pub fn read_result<R: Read + ?Sized>(stream: &mut R) -> PlasmaResult<Option<Incoming>> {
    let mut buf = [0u8; RESULT_HEADER_LEN];
    if read_all(stream, &mut buf)? == ReadStatus::Eof {
        return Ok(None);
    }
    let header = ResultHeader::decode(&buf)
        .map_err(|e| PlasmaError::connection(format!("undecodable result header: {e}")))?;

    if header.validate().is_err() {
        let Some(skip) = header.drainable_len() else {
            return Err(PlasmaError::connection(format!(
                "result header declares unusable payload size {}",
                header.payload_size
            )));
        };
        drain(stream, skip)?;
        return Ok(Some(Incoming::Malformed { header }));
    }

    let len = header.payload_size as usize;
    if len > MAX_PAYLOAD_BYTES {
        return Err(PlasmaError::connection(format!(
            "result payload of {len} bytes exceeds the {MAX_PAYLOAD_BYTES} byte limit"
        )));
    }
    let mut payload = vec![0u8; len];
    if read_all(stream, &mut payload)? == ReadStatus::Eof {
        return Err(PlasmaError::connection("stream closed before result payload"));
    }
    Ok(Some(Incoming::Frame { header, payload }))
}

fn drain<R: Read + ?Sized>(stream: &mut R, len: usize) -> PlasmaResult<()> {
    let mut scratch = [0u8; 8192];
    let mut left = len;
    while left > 0 {
        let n = left.min(scratch.len());
        if read_all(stream, &mut scratch[..n])? == ReadStatus::Eof {
            return Err(PlasmaError::connection(
                "stream closed while skipping a malformed payload",
            ));
        }
        left -= n;
    }
    Ok(())
}

fn flush<W: Write + ?Sized>(stream: &mut W) -> PlasmaResult<()> {
    stream
        .flush()
        .map_err(|e| PlasmaError::connection(format!("flush failed: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/stream.rs"]
mod tests;
