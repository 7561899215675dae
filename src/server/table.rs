//! One game table: two seats, the authoritative position and its status.
//!
//! A `Table` is always reached through the registry, which wraps it in a
//! mutex; nothing here synchronizes on its own.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::{Color, Position};
use crate::game_state::game_status::{evaluate_status, GameStatus};
use crate::move_generation::legal_move_apply::make_move;
use crate::move_generation::legal_move_generator::{LegalMoveGenerator, MoveGenerator};
use crate::moves::chess_move::ChessMove;
use crate::server::clock::{ClockCharge, SideClock, TimeControl};
use crate::server::error::{TableError, TableResult};
use crate::utils::long_algebraic::decode_move;

pub type TableId = u32;

/// Row of the `list_tables` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub id: TableId,
    pub white: Option<String>,
    pub black: Option<String>,
    pub in_progress: bool,
    pub active_players: Vec<String>,
}

/// Payload of the `status` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: String,
    pub winner: Option<Color>,
    pub side_to_move: Color,
    pub white_ms: Option<i64>,
    pub black_ms: Option<i64>,
}

impl StatusReport {
    /// True once no further moves will be accepted.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.state.as_str(), "ongoing" | "check")
    }
}

#[derive(Debug)]
pub struct Table {
    id: TableId,
    seats: [Option<String>; 2],
    position: Position,
    ready: BTreeSet<String>,
    status: GameStatus,
    clock: Option<SideClock>,
    created_at: DateTime<Utc>,
    closed: bool,
}

impl Table {
    pub fn new(
        id: TableId,
        creator: &str,
        color: Color,
        time_control: Option<TimeControl>,
        now: DateTime<Utc>,
    ) -> Self {
        let position = Position::new_game();
        let status = evaluate_status(&position);
        let mut seats = [None, None];
        seats[color.index()] = Some(creator.to_owned());
        Self {
            id,
            seats,
            position,
            ready: BTreeSet::new(),
            status,
            clock: time_control.map(SideClock::new),
            created_at: now,
            closed: false,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Marks the table as deleted. Handles cloned before the deletion see
    /// `TableNotFound` from then on.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn ensure_open(&self) -> TableResult<()> {
        if self.closed {
            Err(TableError::TableNotFound)
        } else {
            Ok(())
        }
    }

    pub fn seat(&self, color: Color) -> Option<&str> {
        self.seats[color.index()].as_deref()
    }

    pub fn is_seated(&self, identity: &str) -> bool {
        self.seats_of(identity).next().is_some()
    }

    pub fn seats_of<'a>(&'a self, identity: &'a str) -> impl Iterator<Item = Color> + 'a {
        Color::BOTH
            .into_iter()
            .filter(move |&color| self.seat(color) == Some(identity))
    }

    /// First free seat, white before black.
    pub fn vacant_seat(&self) -> Option<Color> {
        Color::BOTH.into_iter().find(|&color| self.seat(color).is_none())
    }

    pub fn is_full(&self) -> bool {
        self.vacant_seat().is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.iter().all(Option::is_none)
    }

    /// Seats `identity`; the clock starts once both seats are filled.
    pub fn take_seat(
        &mut self,
        color: Color,
        identity: &str,
        now: DateTime<Utc>,
    ) -> TableResult<()> {
        self.ensure_open()?;
        if self.is_seated(identity) || self.seat(color).is_some() {
            return Err(TableError::SeatTaken(color));
        }
        self.seats[color.index()] = Some(identity.to_owned());
        if self.is_full() {
            if let Some(clock) = self.clock.as_mut() {
                clock.start(now);
            }
        }
        Ok(())
    }

    /// Clears `color` only if `identity` holds it. Returns whether it did.
    pub fn vacate(&mut self, color: Color, identity: &str) -> bool {
        if self.seat(color) != Some(identity) {
            return false;
        }
        self.seats[color.index()] = None;
        self.ready.remove(identity);
        true
    }

    pub fn mark_ready(&mut self, identity: &str) -> TableResult<()> {
        self.ensure_open()?;
        self.ready.insert(identity.to_owned());
        Ok(())
    }

    /// FEN of the authoritative position.
    pub fn fen(&self) -> TableResult<String> {
        self.ensure_open()?;
        Ok(self.position.get_fen())
    }

    /// Decodes `uci` against the current position and applies it if legal.
    ///
    /// Nothing is mutated on rejection, except that a move arriving after the
    /// mover's clock ran out ends the game on time.
    pub fn submit_move(&mut self, uci: &str, now: DateTime<Utc>) -> TableResult<ChessMove> {
        self.ensure_open()?;
        self.refresh_clock(now);
        if self.status.is_terminal() {
            return Err(TableError::IllegalMove("game is over".to_owned()));
        }

        let mv = decode_move(uci, &self.position)
            .map_err(|err| TableError::IllegalMove(err.to_string()))?;
        if !LegalMoveGenerator.legal_moves(&self.position).contains(&mv) {
            return Err(TableError::IllegalMove(mv.to_uci()));
        }

        let mover = self.position.side_to_move;
        if let Some(clock) = self.clock.as_mut() {
            if clock.charge(mover, now) == ClockCharge::Expired {
                self.status = GameStatus::LostOnTime {
                    winner: mover.opposite(),
                };
                return Err(TableError::IllegalMove("time is up".to_owned()));
            }
        }

        make_move(&mut self.position, mv)
            .map_err(|err| TableError::IllegalMove(err.to_string()))?;
        self.status = evaluate_status(&self.position);
        if self.status.is_terminal() {
            let side_to_move = self.position.side_to_move;
            if let Some(clock) = self.clock.as_mut() {
                clock.stop(side_to_move, now);
            }
        }
        Ok(mv)
    }

    /// Flags the side to move if its time has run out.
    pub fn refresh_clock(&mut self, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        let side_to_move = self.position.side_to_move;
        if let Some(clock) = self.clock.as_mut() {
            if clock.has_expired(side_to_move, now) {
                clock.stop(side_to_move, now);
                self.status = GameStatus::LostOnTime {
                    winner: side_to_move.opposite(),
                };
            }
        }
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.id,
            white: self.seat(Color::White).map(str::to_owned),
            black: self.seat(Color::Black).map(str::to_owned),
            in_progress: self.is_full(),
            active_players: self.ready.iter().cloned().collect(),
        }
    }

    pub fn status_report(&self, now: DateTime<Utc>) -> TableResult<StatusReport> {
        self.ensure_open()?;
        let side_to_move = self.position.side_to_move;
        let millis = |color: Color| {
            self.clock
                .as_ref()
                .map(|clock| clock.remaining(color, side_to_move, now))
                .map(|left: TimeDelta| left.num_milliseconds())
        };
        Ok(StatusReport {
            state: self.status.name().to_owned(),
            winner: self.status.winner(),
            side_to_move,
            white_ms: millis(Color::White),
            black_ms: millis(Color::Black),
        })
    }
}
