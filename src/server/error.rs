//! Error types for the table server.
//!
//! `TableError` values are recoverable: the session answers with an `err`
//! envelope carrying the `Display` text and keeps the connection open.

use thiserror::Error;

use crate::game_state::chess_types::Color;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Name taken")]
    NameTaken,

    #[error("Invalid name")]
    InvalidName,

    #[error("Register first")]
    NotRegistered,

    #[error("Already registered as {0}")]
    AlreadyRegistered(String),

    #[error("No such table")]
    TableNotFound,

    /// The requested seat is occupied, or the caller already sits at the table.
    #[error("Seat {0} is taken")]
    SeatTaken(Color),

    #[error("Table is full")]
    SeatsFull,

    #[error("No table with a free seat")]
    NoAvailableTable,

    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

pub type TableResult<T> = Result<T, TableError>;
