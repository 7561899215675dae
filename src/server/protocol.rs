//! Wire messages: the closed `Command` set and the response envelope.
//!
//! Payloads are JSON objects. Commands carry their name in an `"action"` field;
//! the legacy names `create`, `view` and `quit_table` are accepted as aliases.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game_state::chess_types::Color;
use crate::server::error::TableError;
use crate::server::table::TableId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    Register {
        name: String,
    },
    #[serde(rename = "createtable", alias = "create")]
    CreateTable {
        #[serde(default)]
        color: Option<Color>,
    },
    Join {
        #[serde(default)]
        table_id: Option<TableId>,
        #[serde(default)]
        color: Option<Color>,
    },
    ListTables,
    ReadyPlay {
        table_id: TableId,
        /// Ignored; the session identity is used.
        #[serde(default)]
        user: Option<String>,
    },
    Move {
        table_id: TableId,
        uci: String,
    },
    #[serde(alias = "view")]
    GetBoard {
        table_id: TableId,
    },
    #[serde(alias = "quit_table")]
    Leave {
        table_id: TableId,
        color: Color,
        /// Ignored; the session identity is used.
        #[serde(default)]
        user: Option<String>,
    },
    Status {
        table_id: TableId,
    },
    Quit,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::CreateTable { .. } => "createtable",
            Command::Join { .. } => "join",
            Command::ListTables => "list_tables",
            Command::ReadyPlay { .. } => "ready_play",
            Command::Move { .. } => "move",
            Command::GetBoard { .. } => "get_board",
            Command::Leave { .. } => "leave",
            Command::Status { .. } => "status",
            Command::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Err,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    pub msg: Option<String>,
    pub data: Option<Value>,
}

impl Response {
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            msg: Some(msg.into()),
            data: None,
        }
    }

    pub fn ok_with(msg: Option<String>, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                status: ResponseStatus::Ok,
                msg,
                data: Some(data),
            },
            Err(err) => Self::err(format!("Internal error: {err}")),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Err,
            msg: Some(msg.into()),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

impl From<TableError> for Response {
    fn from(err: TableError) -> Self {
        Self::err(err.to_string())
    }
}

/// `data` of `createtable` and `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub table_id: TableId,
    pub color: Color,
}
