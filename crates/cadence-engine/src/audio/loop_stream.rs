use std::io::{self, Read, Seek, SeekFrom};

/// Errors specific to [`LoopStream`], carried inside `io::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoopStreamError {
    /// Seeking relative to the end has no meaning for an endless stream.
    #[error("loop streams only seek from the start or the current position")]
    InvalidSeekMode,
}

/// Endless view over a seekable stream of logical length `size`.
///
/// Reads pass through until the underlying stream ends, then continue from
/// the start. Seek positions are normalized modulo `size`.
#[derive(Debug)]
pub struct LoopStream<S> {
    stream: S,
    size: u64,
}

impl<S: Read + Seek> LoopStream<S> {
    /// Wraps `stream`. A `size` of zero is treated as one byte.
    pub fn new(stream: S, size: u64) -> Self {
        Self {
            stream,
            size: size.max(1),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Seek> Read for LoopStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stream.read(buf)?;
        if n > 0 || buf.is_empty() {
            return Ok(n);
        }

        // End of stream: wrap and keep reading.
        self.seek(SeekFrom::Start(0))?;
        self.stream.read(buf)
    }
}

impl<S: Read + Seek> Seek for LoopStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let next = match pos {
            SeekFrom::Start(offset) => offset % self.size,
            SeekFrom::Current(delta) => {
                let current = self.stream.stream_position()?;
                let size = self.size as i128;
                (i128::from(current) + i128::from(delta)).rem_euclid(size) as u64
            }
            SeekFrom::End(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    LoopStreamError::InvalidSeekMode,
                ));
            }
        };
        self.stream.seek(SeekFrom::Start(next))
    }
}
