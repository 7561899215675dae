//! Async client for the table protocol.
//!
//! Wraps one framed connection and turns `err` envelopes into
//! `ClientError::Rejected`. Positions come back as parsed `Position` values so
//! callers can preview legal moves locally before submitting.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::chess_errors::ChessError;
use crate::game_state::chess_types::{Color, Position};
use crate::server::config::DEFAULT_MAX_FRAME_BYTES;
use crate::server::framing::{framed, read_message, write_message, FrameError, FramedConnection};
use crate::server::protocol::{Command, Response, SeatAssignment};
use crate::server::table::{StatusReport, TableId, TableSummary};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("server closed the connection")]
    Closed,

    /// The server answered with an `err` envelope.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("unexpected response data: {0}")]
    BadData(String),

    #[error("bad position from server: {0}")]
    BadPosition(#[from] ChessError),
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct TableClient<T = TcpStream> {
    conn: FramedConnection<T>,
}

impl TableClient<TcpStream> {
    pub async fn connect(addr: impl ToSocketAddrs) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr).await.map_err(FrameError::from)?;
        Ok(Self::new(stream))
    }
}

impl<T> TableClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: T) -> Self {
        Self {
            conn: framed(io, DEFAULT_MAX_FRAME_BYTES),
        }
    }

    /// Sends `command` and returns the raw envelope, `err` included.
    pub async fn request(&mut self, command: &Command) -> ClientResult<Response> {
        write_message(&mut self.conn, command).await?;
        read_message(&mut self.conn).await?.ok_or(ClientError::Closed)
    }

    async fn call(&mut self, command: &Command) -> ClientResult<Response> {
        let response = self.request(command).await?;
        if response.is_ok() {
            Ok(response)
        } else {
            Err(ClientError::Rejected(response.msg.unwrap_or_default()))
        }
    }

    async fn call_for<D: DeserializeOwned>(&mut self, command: &Command) -> ClientResult<D> {
        let data = self.call(command).await?.data.unwrap_or_default();
        serde_json::from_value(data).map_err(|err| ClientError::BadData(err.to_string()))
    }

    pub async fn register(&mut self, name: &str) -> ClientResult<()> {
        self.call(&Command::Register {
            name: name.to_owned(),
        })
        .await
        .map(drop)
    }

    pub async fn create_table(&mut self, color: Option<Color>) -> ClientResult<SeatAssignment> {
        self.call_for(&Command::CreateTable { color }).await
    }

    pub async fn join(
        &mut self,
        table_id: Option<TableId>,
        color: Option<Color>,
    ) -> ClientResult<SeatAssignment> {
        self.call_for(&Command::Join { table_id, color }).await
    }

    pub async fn list_tables(&mut self) -> ClientResult<Vec<TableSummary>> {
        self.call_for(&Command::ListTables).await
    }

    pub async fn ready(&mut self, table_id: TableId) -> ClientResult<()> {
        self.call(&Command::ReadyPlay {
            table_id,
            user: None,
        })
        .await
        .map(drop)
    }

    pub async fn submit_move(&mut self, table_id: TableId, uci: &str) -> ClientResult<()> {
        self.call(&Command::Move {
            table_id,
            uci: uci.to_owned(),
        })
        .await
        .map(drop)
    }

    pub async fn board_fen(&mut self, table_id: TableId) -> ClientResult<String> {
        self.call_for(&Command::GetBoard { table_id }).await
    }

    pub async fn board(&mut self, table_id: TableId) -> ClientResult<Position> {
        let fen = self.board_fen(table_id).await?;
        Ok(Position::from_fen(&fen)?)
    }

    pub async fn status(&mut self, table_id: TableId) -> ClientResult<StatusReport> {
        self.call_for(&Command::Status { table_id }).await
    }

    pub async fn leave(&mut self, table_id: TableId, color: Color) -> ClientResult<()> {
        self.call(&Command::Leave {
            table_id,
            color,
            user: None,
        })
        .await
        .map(drop)
    }

    pub async fn quit(mut self) -> ClientResult<()> {
        self.call(&Command::Quit).await.map(drop)
    }
}
