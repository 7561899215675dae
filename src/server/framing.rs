//! Length-prefixed JSON framing shared by the server and the client.
//!
//! Each frame is a 4-byte big-endian length followed by that many bytes of
//! JSON.

use std::io;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Errors that end a connection.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Oversized frame or a payload that does not decode.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Peer went away mid-frame, or the socket failed.
    #[error("connection lost: {0}")]
    ConnectionLost(#[from] io::Error),
}

pub type FramedConnection<T> = Framed<T, LengthDelimitedCodec>;

pub fn frame_codec(max_frame_bytes: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(max_frame_bytes)
        .new_codec()
}

pub fn framed<T: AsyncRead + AsyncWrite>(io: T, max_frame_bytes: usize) -> FramedConnection<T> {
    Framed::new(io, frame_codec(max_frame_bytes))
}

/// Next message, or `None` when the peer closed cleanly between frames.
pub async fn read_message<T, M>(conn: &mut FramedConnection<T>) -> Result<Option<M>, FrameError>
where
    T: AsyncRead + AsyncWrite + Unpin,
    M: DeserializeOwned,
{
    let Some(frame) = conn.next().await else {
        return Ok(None);
    };
    let bytes = frame.map_err(|err| match err.kind() {
        io::ErrorKind::InvalidData => FrameError::MalformedFrame(err.to_string()),
        _ => FrameError::ConnectionLost(err),
    })?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| FrameError::MalformedFrame(err.to_string()))
}

pub async fn write_message<T, M>(
    conn: &mut FramedConnection<T>,
    message: &M,
) -> Result<(), FrameError>
where
    T: AsyncRead + AsyncWrite + Unpin,
    M: Serialize,
{
    let payload =
        serde_json::to_vec(message).map_err(|err| FrameError::MalformedFrame(err.to_string()))?;
    conn.send(Bytes::from(payload)).await?;
    Ok(())
}
