//! Transport Adapter
//!
//! Moves one encoded request to the native side and returns its encoded
//! reply. Implementations decide how (stream, channel, in-process).

use std::io::{self, Read, Write};
use std::time::Duration;

/// Frames larger than this are rejected before allocation
pub const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// Frame header: u32 length + u8 XOR checksum
const HEADER_LEN: usize = 5;

/// Transport failure
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("channel closed")]
    Closed,

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("bad frame: {0}")]
    Frame(String),
}

/// Blocking request/response pipe to the native side
///
/// Exactly one request is in flight at a time; `send` returns only once the
/// reply for that request has arrived.
pub trait Transport {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).send(request)
    }
}

fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Write one length + checksum framed payload
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), TransportError> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_LEN)
        .ok_or_else(|| TransportError::Frame(format!("payload too large: {} bytes", payload.len())))?;

    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(&len.to_le_bytes());
    header[4] = checksum(payload);

    writer.write_all(&header)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one framed payload, verifying its checksum
///
/// A stream that ends cleanly before a header is `Closed`.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, TransportError> {
    let mut header = [0u8; HEADER_LEN];
    match reader.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(TransportError::Closed),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if len > MAX_FRAME_LEN {
        return Err(TransportError::Frame(format!("frame too large: {} bytes", len)));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;

    if checksum(&payload) != header[4] {
        return Err(TransportError::Frame("checksum mismatch".into()));
    }
    Ok(payload)
}

/// Framed request/response over any duplex byte stream
///
/// Works with a `UnixStream`, a TCP stream or a pair of pipes joined into
/// one `Read + Write` value.
#[derive(Debug)]
pub struct FramedTransport<S> {
    stream: S,
}

impl<S: Read + Write> FramedTransport<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for FramedTransport<S> {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        write_frame(&mut self.stream, request)?;
        let reply = read_frame(&mut self.stream)?;
        tracing::trace!("Framed round-trip: {} bytes out, {} bytes in", request.len(), reply.len());
        Ok(reply)
    }
}
