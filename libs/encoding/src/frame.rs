//! Length-prefixed framing over byte streams.
//!
//! A frame is a little-endian `u64` length followed by that many bytes. Writers send frames of any size,
//! readers pass the largest frame they are willing to accept.

use std::io::{self, Read, Write};

/// An error reading or writing a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The underlying stream failed.
    #[error("frame io: {0}")]
    Io(#[from] io::Error),

    /// The frame exceeds the reader's limit.
    #[error("frame of {length} bytes exceeds the limit of {limit} bytes")]
    TooLarge {
        /// The announced frame length.
        length: u64,
        /// The largest frame the reader accepts.
        limit: u64,
    },
}

/// Writes `payload` as a single frame and flushes the writer.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    let length = u64::try_from(payload.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    writer.write_all(&length.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Reads a single frame of at most `limit` bytes.
pub fn read_frame<R: Read>(reader: &mut R, limit: u64) -> Result<Vec<u8>, FrameError> {
    let mut length = [0; 8];
    reader.read_exact(&mut length)?;
    let length = u64::from_le_bytes(length);
    if length > limit {
        return Err(FrameError::TooLarge { length, limit });
    }
    let size = usize::try_from(length)
        .map_err(|_| FrameError::TooLarge { length, limit: usize::MAX as u64 })?;
    let mut payload = vec![0; size];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}
