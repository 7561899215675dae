//! Users and tables shared by every session.
//!
//! The registry lock guards the user map and the table index; each table has
//! its own lock. Locks are always taken registry first, then table, and never
//! held across an `.await` (every method here is synchronous).

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::prelude::IndexedRandom;
use tracing::{debug, info};

use crate::game_state::chess_types::Color;
use crate::server::clock::TimeControl;
use crate::server::config::DisconnectPolicy;
use crate::server::error::{TableError, TableResult};
use crate::server::table::{StatusReport, Table, TableId, TableSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub peer: Option<SocketAddr>,
    pub registered_at: DateTime<Utc>,
}

pub type TableHandle = Arc<Mutex<Table>>;

#[derive(Default)]
struct RegistryState {
    users: HashMap<String, UserRecord>,
    tables: BTreeMap<TableId, TableHandle>,
}

impl RegistryState {
    fn require_user(&self, identity: &str) -> TableResult<()> {
        if self.users.contains_key(identity) {
            Ok(())
        } else {
            Err(TableError::NotRegistered)
        }
    }

    fn table(&self, table_id: TableId) -> TableResult<TableHandle> {
        self.tables
            .get(&table_id)
            .cloned()
            .ok_or(TableError::TableNotFound)
    }

    /// Smallest positive id not in use.
    fn next_table_id(&self) -> TableId {
        (1..)
            .find(|id| !self.tables.contains_key(id))
            .unwrap_or(TableId::MAX)
    }
}

#[derive(Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
    time_control: Option<TimeControl>,
}

impl Registry {
    pub fn new(time_control: Option<TimeControl>) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            time_control,
        }
    }

    /// Registers `name` and returns it as the session identity.
    pub fn register(&self, name: &str, peer: Option<SocketAddr>) -> TableResult<String> {
        if name.trim().is_empty() {
            return Err(TableError::InvalidName);
        }
        let mut state = self.state.lock();
        if state.users.contains_key(name) {
            return Err(TableError::NameTaken);
        }
        state.users.insert(
            name.to_owned(),
            UserRecord {
                name: name.to_owned(),
                peer,
                registered_at: Utc::now(),
            },
        );
        info!(user = name, ?peer, "registered");
        Ok(name.to_owned())
    }

    pub fn user(&self, identity: &str) -> Option<UserRecord> {
        self.state.lock().users.get(identity).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }

    /// Opens a table seating `creator`, on a random color unless one is given.
    pub fn create_table(
        &self,
        creator: &str,
        color: Option<Color>,
    ) -> TableResult<(TableId, Color)> {
        let color = color
            .or_else(|| Color::BOTH.as_slice().choose(&mut rand::rng()).copied())
            .unwrap_or(Color::White);

        let mut state = self.state.lock();
        state.require_user(creator)?;
        let table_id = state.next_table_id();
        let table = Table::new(table_id, creator, color, self.time_control, Utc::now());
        state.tables.insert(table_id, Arc::new(Mutex::new(table)));
        info!(table_id, user = creator, %color, "table created");
        Ok((table_id, color))
    }

    /// Seats `identity` at `table_id`, or at the first table with a free seat.
    pub fn join_table(
        &self,
        identity: &str,
        table_id: Option<TableId>,
        color: Option<Color>,
    ) -> TableResult<(TableId, Color)> {
        let state = self.state.lock();
        state.require_user(identity)?;
        let now = Utc::now();

        let Some(table_id) = table_id else {
            for (&id, handle) in &state.tables {
                let mut table = handle.lock();
                if table.is_seated(identity) {
                    continue;
                }
                let seat = match color {
                    Some(wanted) if table.seat(wanted).is_none() => wanted,
                    Some(_) => continue,
                    None => match table.vacant_seat() {
                        Some(seat) => seat,
                        None => continue,
                    },
                };
                table.take_seat(seat, identity, now)?;
                info!(table_id = id, user = identity, color = %seat, "joined table");
                return Ok((id, seat));
            }
            return Err(TableError::NoAvailableTable);
        };

        let handle = state.table(table_id)?;
        let mut table = handle.lock();
        let seat = match color {
            Some(wanted) => wanted,
            None => table.vacant_seat().ok_or(TableError::SeatsFull)?,
        };
        table.take_seat(seat, identity, now)?;
        info!(table_id, user = identity, color = %seat, "joined table");
        Ok((table_id, seat))
    }

    /// Tables ordered by id.
    pub fn list_tables(&self) -> Vec<TableSummary> {
        let state = self.state.lock();
        state
            .tables
            .values()
            .map(|handle| handle.lock().summary())
            .collect()
    }

    pub fn mark_ready(&self, table_id: TableId, identity: &str) -> TableResult<()> {
        let handle = self.state.lock().table(table_id)?;
        handle.lock().mark_ready(identity)?;
        debug!(table_id, user = identity, "ready");
        Ok(())
    }

    /// Applies `uci` to the table's position if it is legal there.
    pub fn submit_move(&self, table_id: TableId, uci: &str) -> TableResult<()> {
        let handle = self.state.lock().table(table_id)?;
        let mut table = handle.lock();
        match table.submit_move(uci, Utc::now()) {
            Ok(mv) => {
                info!(table_id, uci = %mv, status = %table.status(), "move accepted");
                Ok(())
            }
            Err(err) => {
                debug!(table_id, uci, %err, "move rejected");
                Err(err)
            }
        }
    }

    /// FEN of the authoritative position.
    pub fn query_position(&self, table_id: TableId) -> TableResult<String> {
        let handle = self.state.lock().table(table_id)?;
        let fen = handle.lock().fen();
        fen
    }

    pub fn game_status(&self, table_id: TableId) -> TableResult<StatusReport> {
        let handle = self.state.lock().table(table_id)?;
        let mut table = handle.lock();
        let now = Utc::now();
        table.refresh_clock(now);
        table.status_report(now)
    }

    /// Clears `color` at `table_id` if `identity` holds it; deletes the table
    /// once both seats are empty. Returns whether the table was deleted.
    pub fn leave(&self, table_id: TableId, color: Color, identity: &str) -> TableResult<bool> {
        let mut state = self.state.lock();
        let handle = state.table(table_id)?;
        let mut table = handle.lock();
        if table.vacate(color, identity) {
            info!(table_id, user = identity, %color, "left table");
        }
        let empty = table.is_empty();
        if empty {
            close_table(&mut table, table_id);
            drop(table);
            state.tables.remove(&table_id);
        }
        Ok(empty)
    }

    /// Drops the user record and, under `VacateSeats`, every seat it holds.
    /// Returns the tables that were left.
    pub fn disconnect(&self, identity: &str, policy: DisconnectPolicy) -> Vec<TableId> {
        let mut state = self.state.lock();
        let Some(record) = state.users.remove(identity) else {
            return Vec::new();
        };
        let online = Utc::now() - record.registered_at;
        info!(
            user = identity,
            peer = ?record.peer,
            online_secs = online.num_seconds(),
            ?policy,
            "user removed"
        );
        if policy == DisconnectPolicy::KeepSeats {
            return Vec::new();
        }

        let mut left = Vec::new();
        let mut emptied = Vec::new();
        for (&table_id, handle) in &state.tables {
            let mut table = handle.lock();
            let seats: Vec<Color> = table.seats_of(identity).collect();
            if seats.is_empty() {
                continue;
            }
            for color in seats {
                table.vacate(color, identity);
            }
            left.push(table_id);
            if table.is_empty() {
                close_table(&mut table, table_id);
                emptied.push(table_id);
            }
        }
        for table_id in emptied {
            state.tables.remove(&table_id);
        }
        left
    }
}

/// Closes a table that is about to leave the index. Runs under the registry
/// lock so no new handle to it can be cloned afterwards.
fn close_table(table: &mut Table, table_id: TableId) {
    table.close();
    let age = Utc::now() - table.created_at();
    info!(table_id, age_secs = age.num_seconds(), "table deleted");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::Utc;

    use super::Registry;
    use crate::game_state::chess_types::Color;
    use crate::game_state::game_status::GameStatus;
    use crate::server::config::DisconnectPolicy;
    use crate::server::error::TableError;

    fn registry_with(users: &[&str]) -> Registry {
        let registry = Registry::new(None);
        for user in users {
            registry.register(user, None).expect("name is free");
        }
        registry
    }

    #[test]
    fn register_rejects_duplicates_and_blank_names() {
        let registry = registry_with(&["alice"]);
        assert_eq!(registry.register("alice", None), Err(TableError::NameTaken));
        assert_eq!(registry.register("  ", None), Err(TableError::InvalidName));
        assert_eq!(registry.user_count(), 1);
        assert!(registry.user("alice").is_some());
    }

    #[test]
    fn unregistered_users_cannot_open_tables() {
        let registry = Registry::new(None);
        assert_eq!(
            registry.create_table("ghost", None),
            Err(TableError::NotRegistered)
        );
    }

    #[test]
    fn table_ids_reuse_the_smallest_free_number() {
        let registry = registry_with(&["alice", "bob", "carol"]);
        assert_eq!(registry.create_table("alice", Some(Color::White)), Ok((1, Color::White)));
        assert_eq!(registry.create_table("bob", Some(Color::White)), Ok((2, Color::White)));
        assert_eq!(registry.leave(1, Color::White, "alice"), Ok(true));
        assert_eq!(registry.create_table("carol", Some(Color::Black)), Ok((1, Color::Black)));
    }

    #[test]
    fn join_without_id_takes_first_free_seat() {
        let registry = registry_with(&["alice", "bob", "carol", "dave"]);
        assert_eq!(registry.join_table("bob", None, None), Err(TableError::NoAvailableTable));
        registry.create_table("alice", Some(Color::Black)).expect("create");
        assert_eq!(registry.join_table("bob", None, None), Ok((1, Color::White)));
        assert_eq!(registry.join_table("carol", Some(1), None), Err(TableError::SeatsFull));
        assert_eq!(registry.join_table("dave", None, None), Err(TableError::NoAvailableTable));
        assert_eq!(registry.join_table("dave", Some(9), None), Err(TableError::TableNotFound));
    }

    #[test]
    fn join_skips_tables_the_user_already_sits_at() {
        let registry = registry_with(&["alice", "bob"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        assert_eq!(
            registry.join_table("alice", Some(1), None),
            Err(TableError::SeatTaken(Color::Black))
        );
        assert_eq!(registry.join_table("alice", None, None), Err(TableError::NoAvailableTable));
        assert_eq!(
            registry.join_table("bob", Some(1), Some(Color::White)),
            Err(TableError::SeatTaken(Color::White))
        );
        assert_eq!(registry.join_table("bob", Some(1), Some(Color::Black)), Ok((1, Color::Black)));
    }

    #[test]
    fn create_then_leave_deletes_table() {
        let registry = registry_with(&["alice"]);
        let (table_id, color) = registry.create_table("alice", None).expect("create");
        assert_eq!(registry.list_tables().len(), 1);
        assert_eq!(registry.leave(table_id, color, "alice"), Ok(true));
        assert!(registry.list_tables().is_empty());
        assert_eq!(registry.query_position(table_id), Err(TableError::TableNotFound));
    }

    #[test]
    fn handle_cloned_before_delete_sees_table_not_found() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        // A request that resolved the handle just before the table was deleted.
        let stale = registry.state.lock().table(1).expect("table exists");
        assert_eq!(registry.leave(1, Color::White, "alice"), Ok(true));

        let mut table = stale.lock();
        assert_eq!(table.submit_move("e2e4", Utc::now()), Err(TableError::TableNotFound));
        assert_eq!(table.mark_ready("alice"), Err(TableError::TableNotFound));
        assert_eq!(table.fen(), Err(TableError::TableNotFound));
        assert!(registry.list_tables().is_empty());
    }

    #[test]
    fn disconnect_closes_emptied_tables() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::Black)).expect("create");
        let stale = registry.state.lock().table(1).expect("table exists");
        assert_eq!(registry.disconnect("alice", DisconnectPolicy::VacateSeats), vec![1]);
        assert_eq!(
            stale.lock().status_report(Utc::now()),
            Err(TableError::TableNotFound)
        );
    }

    #[test]
    fn leave_for_someone_elses_seat_keeps_ready_state() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        registry.mark_ready(1, "alice").expect("table exists");
        assert_eq!(registry.leave(1, Color::Black, "alice"), Ok(false));
        assert_eq!(registry.list_tables()[0].active_players, vec!["alice".to_owned()]);
    }

    #[test]
    fn leave_only_clears_own_seat() {
        let registry = registry_with(&["alice", "bob"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        registry.join_table("bob", Some(1), None).expect("join");
        assert_eq!(registry.leave(1, Color::White, "bob"), Ok(false));
        let summary = &registry.list_tables()[0];
        assert_eq!(summary.white.as_deref(), Some("alice"));
        assert!(summary.in_progress);
        assert_eq!(registry.leave(7, Color::White, "bob"), Err(TableError::TableNotFound));
    }

    #[test]
    fn ready_players_are_listed() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        registry.mark_ready(1, "alice").expect("table exists");
        assert_eq!(registry.list_tables()[0].active_players, vec!["alice".to_owned()]);
        assert_eq!(registry.mark_ready(2, "alice"), Err(TableError::TableNotFound));
    }

    #[test]
    fn query_position_is_a_stable_snapshot() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        registry.submit_move(1, "e2e4").expect("legal");
        let first = registry.query_position(1).expect("table exists");
        assert_eq!(first, registry.query_position(1).expect("table exists"));
        assert_eq!(first, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
    }

    #[test]
    fn fools_mate_reports_black_win() {
        let registry = registry_with(&["alice", "bob"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        registry.join_table("bob", Some(1), None).expect("join");
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            registry.submit_move(1, uci).expect("legal");
        }
        let report = registry.game_status(1).expect("table exists");
        assert_eq!(report.state, GameStatus::Checkmate { winner: Color::Black }.name());
        assert_eq!(report.winner, Some(Color::Black));
        assert_eq!(report.white_ms, None);
    }

    #[test]
    fn castling_through_attacked_square_is_illegal() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        // Bishop on a6 covers f1 once the white bishop has left it.
        for uci in ["e2e4", "b7b6", "g1f3", "c8a6", "g2g3", "h7h6", "f1g2", "h6h5"] {
            registry.submit_move(1, uci).expect("legal");
        }
        assert!(matches!(
            registry.submit_move(1, "e1g1"),
            Err(TableError::IllegalMove(_))
        ));
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        for uci in ["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"] {
            registry.submit_move(1, uci).expect("legal");
        }
        let fen = registry.query_position(1).expect("table exists");
        assert_eq!(fen, "rnbqkbnr/1pp1pppp/p2P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3");
    }

    #[test]
    fn concurrent_moves_on_one_table_accept_exactly_one() {
        let registry = Arc::new(registry_with(&["alice"]));
        registry.create_table("alice", Some(Color::White)).expect("create");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.submit_move(1, "e2e4"))
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker should not panic"))
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|err| matches!(err, TableError::IllegalMove(_))));
        assert_eq!(
            registry.query_position(1).expect("table exists"),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn disconnect_vacates_seats_by_default() {
        let registry = registry_with(&["alice", "bob"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        registry.join_table("bob", Some(1), None).expect("join");
        registry.create_table("alice", Some(Color::Black)).expect("create");

        assert_eq!(registry.disconnect("alice", DisconnectPolicy::VacateSeats), vec![1, 2]);
        assert!(registry.user("alice").is_none());
        let tables = registry.list_tables();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].white, None);
        assert_eq!(tables[0].black.as_deref(), Some("bob"));
        assert!(registry.register("alice", None).is_ok());
    }

    #[test]
    fn disconnect_can_keep_seats() {
        let registry = registry_with(&["alice"]);
        registry.create_table("alice", Some(Color::White)).expect("create");
        assert!(registry.disconnect("alice", DisconnectPolicy::KeepSeats).is_empty());
        assert_eq!(registry.list_tables()[0].white.as_deref(), Some("alice"));
    }
}
