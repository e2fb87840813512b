//! Node protocol
//!
//! This module defines the messages exchanged between the coordinator and
//! worker nodes. Messages are serialized with MessagePack (rmp-serde); sort
//! payloads are carried as MessagePack binaries, so each one is
//! length-prefixed on the wire.
//!
//! # Message Flow
//!
//! ```text
//! Coordinator                     Worker Node
//!     |                              |
//!     |-- SORT_REQUEST(data) ------->|
//!     |                              |  (local parallel sort)
//!     |<----- SORT_RESPONSE(data) ---|
//!     |                              |
//!     |          ... repeat ...      |
//!     |                              |
//!     |-------- TERMINATION -------->|
//! ```
//!
//! # Message Framing
//!
//! Each message is prefixed with a 4-byte length field (little-endian u32):
//!
//! ```text
//! [4 bytes: message length][N bytes: MessagePack-serialized message]
//! ```

use crate::error::{Result, SortError};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame body the 4-byte length prefix can describe
pub const MAX_FRAME_BYTES: usize = u32::MAX as usize;

/// Protocol message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Partition to sort (Coordinator → Node)
    SortRequest(SortRequest),

    /// Sorted partition (Node → Coordinator)
    ///
    /// Same length as the request it answers.
    SortResponse(SortResponse),

    /// End of connection (Coordinator → Node)
    ///
    /// The node closes the connection after receiving it.
    Termination,
}

impl Message {
    /// Short name used in logs and violation reports
    pub fn kind(&self) -> &'static str {
        match self {
            Message::SortRequest(_) => "SortRequest",
            Message::SortResponse(_) => "SortResponse",
            Message::Termination => "Termination",
        }
    }

    /// Reject payload-carrying messages that arrived empty
    fn validate(self) -> Result<Self> {
        let empty = match &self {
            Message::SortRequest(req) => req.payload.is_empty(),
            Message::SortResponse(resp) => resp.payload.is_empty(),
            Message::Termination => false,
        };
        if empty {
            return Err(SortError::violation(format!(
                "{} with empty payload",
                self.kind()
            )));
        }
        Ok(self)
    }
}

/// Sort request carrying a copy of one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRequest {
    #[serde(with = "serde_bytes")]
    payload: Vec<u8>,
}

impl SortRequest {
    /// Build a request from a copy of `data`
    ///
    /// Fails with [`SortError::InvalidMessage`] if `data` is empty.
    pub fn new(data: &[i8]) -> Result<Self> {
        if data.is_empty() {
            return Err(SortError::InvalidMessage("sort request payload is empty"));
        }
        Ok(Self {
            payload: to_wire(data),
        })
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Copy of the carried values
    pub fn data(&self) -> Vec<i8> {
        from_wire(&self.payload)
    }

    /// Take ownership of the carried values
    pub fn into_data(self) -> Vec<i8> {
        from_wire(&self.payload)
    }
}

/// Sort response carrying the sorted partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortResponse {
    #[serde(with = "serde_bytes")]
    payload: Vec<u8>,
}

impl SortResponse {
    /// Build a response from a copy of `data`
    ///
    /// Fails with [`SortError::InvalidMessage`] if `data` is empty.
    pub fn new(data: &[i8]) -> Result<Self> {
        if data.is_empty() {
            return Err(SortError::InvalidMessage("sort response payload is empty"));
        }
        Ok(Self {
            payload: to_wire(data),
        })
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn data(&self) -> Vec<i8> {
        from_wire(&self.payload)
    }

    pub fn into_data(self) -> Vec<i8> {
        from_wire(&self.payload)
    }
}

// i8 <-> u8 is a bit-preserving reinterpretation
fn to_wire(data: &[i8]) -> Vec<u8> {
    data.iter().map(|&v| v as u8).collect()
}

fn from_wire(payload: &[u8]) -> Vec<i8> {
    payload.iter().map(|&b| b as i8).collect()
}

/// Serialize a message to bytes
///
/// Prepends a 4-byte length field for framing.
///
/// # Message Format
///
/// ```text
/// [4 bytes: message length (little-endian u32)][N bytes: MessagePack message]
/// ```
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>> {
    serialize_message_with_limit(msg, MAX_FRAME_BYTES)
}

/// Serialize a message, refusing bodies larger than `max_body` bytes
///
/// An oversized body is reported as [`SortError::FrameTooLarge`]; nothing is
/// sent, so no peer is at fault.
pub fn serialize_message_with_limit(msg: &Message, max_body: usize) -> Result<Vec<u8>> {
    let max_body = max_body.min(MAX_FRAME_BYTES);
    let msg_bytes = rmp_serde::to_vec(msg)
        .map_err(|e| SortError::violation(format!("failed to serialize {}: {}", msg.kind(), e)))?;

    if msg_bytes.len() > max_body {
        return Err(SortError::FrameTooLarge {
            bytes: msg_bytes.len(),
            max: max_body,
        });
    }

    let msg_len = msg_bytes.len() as u32;
    let mut framed = Vec::with_capacity(4 + msg_bytes.len());
    framed.extend_from_slice(&msg_len.to_le_bytes());
    framed.extend_from_slice(&msg_bytes);

    Ok(framed)
}

/// Deserialize a message from bytes
///
/// Expects a 4-byte length prefix followed by a MessagePack-serialized message.
///
/// # Returns
///
/// Returns (message, bytes_consumed) where bytes_consumed includes the length prefix.
pub fn deserialize_message(buf: &[u8]) -> Result<(Message, usize)> {
    if buf.len() < 4 {
        return Err(SortError::violation(format!(
            "buffer too small for message length (need 4 bytes, got {})",
            buf.len()
        )));
    }

    let msg_len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

    if buf.len() < 4 + msg_len {
        return Err(SortError::violation(format!(
            "incomplete message (need {} bytes, got {})",
            4 + msg_len,
            buf.len()
        )));
    }

    let msg = decode_body(&buf[4..4 + msg_len])?;
    Ok((msg, 4 + msg_len))
}

fn decode_body(body: &[u8]) -> Result<Message> {
    let msg: Message = rmp_serde::from_slice(body)
        .map_err(|e| SortError::violation(format!("failed to deserialize message: {}", e)))?;
    msg.validate()
}

/// Read a complete message from a stream
///
/// Returns [`SortError::ConnectionClosed`] if the peer closes the stream
/// cleanly between frames. A frame that fails to decode is consumed in full
/// and reported as a [`SortError::ProtocolViolation`], leaving the stream
/// positioned at the next frame.
pub async fn read_message<S>(stream: &mut S) -> Result<Message>
where
    S: AsyncRead + Unpin,
{
    read_message_with_limit(stream, MAX_FRAME_BYTES).await
}

/// Read a message, skipping frames whose body exceeds `max_body` bytes
///
/// An oversized body is drained without buffering it and reported as a
/// [`SortError::ProtocolViolation`].
pub async fn read_message_with_limit<S>(stream: &mut S, max_body: usize) -> Result<Message>
where
    S: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(SortError::ConnectionClosed);
        }
        Err(e) => return Err(SortError::Io(e)),
    }

    let msg_len = u32::from_le_bytes(len_buf) as usize;

    if msg_len > max_body {
        // Drain the oversized body so the next read starts at a frame boundary
        let mut body = (&mut *stream).take(msg_len as u64);
        let drained = tokio::io::copy(&mut body, &mut tokio::io::sink()).await?;
        if drained < msg_len as u64 {
            return Err(SortError::ConnectionClosed);
        }
        return Err(SortError::violation(format!(
            "message too large: {} bytes (max {})",
            msg_len, max_body
        )));
    }

    let mut msg_buf = vec![0u8; msg_len];
    stream.read_exact(&mut msg_buf).await?;

    decode_body(&msg_buf)
}

/// Write a message to a stream
///
/// Serializes the message with length prefix, writes it, and flushes.
pub async fn write_message<S>(stream: &mut S, msg: &Message) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let framed = serialize_message(msg)?;
    write_frame(stream, &framed).await
}

/// Write an already serialized frame to a stream and flush
pub async fn write_frame<S>(stream: &mut S, framed: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(framed).await?;
    stream.flush().await?;
    Ok(())
}
