//! Per-connection command loop.
//!
//! A connection is anonymous until `register` succeeds; after that every
//! command acts as that identity, whatever `user` field the client sends.
//! Dropping a `Session` removes its user from the registry.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::server::config::{DisconnectPolicy, ServerConfig};
use crate::server::error::TableError;
use crate::server::framing::{framed, read_message, write_message, FrameError};
use crate::server::protocol::{Command, Response, SeatAssignment};
use crate::server::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

pub struct Session {
    registry: Arc<Registry>,
    policy: DisconnectPolicy,
    peer: Option<SocketAddr>,
    identity: Option<String>,
}

impl Session {
    pub fn new(
        registry: Arc<Registry>,
        policy: DisconnectPolicy,
        peer: Option<SocketAddr>,
    ) -> Self {
        Self {
            registry,
            policy,
            peer,
            identity: None,
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn handle_command(&mut self, command: Command) -> (Response, Flow) {
        match command {
            Command::Quit => (Response::ok("Bye"), Flow::Close),
            Command::Register { name } => (self.register(&name), Flow::Continue),
            command => {
                let response = match self.identity.clone() {
                    Some(identity) => self
                        .dispatch(&identity, command)
                        .unwrap_or_else(Response::from),
                    None => Response::from(TableError::NotRegistered),
                };
                (response, Flow::Continue)
            }
        }
    }

    fn register(&mut self, name: &str) -> Response {
        if let Some(current) = &self.identity {
            return TableError::AlreadyRegistered(current.clone()).into();
        }
        match self.registry.register(name, self.peer) {
            Ok(identity) => {
                let response = Response::ok(format!("Welcome, {identity}"));
                self.identity = Some(identity);
                response
            }
            Err(err) => err.into(),
        }
    }

    fn dispatch(&self, identity: &str, command: Command) -> Result<Response, TableError> {
        let registry = &self.registry;
        let response = match command {
            Command::CreateTable { color } => {
                let (table_id, color) = registry.create_table(identity, color)?;
                Response::ok_with(
                    Some(format!("Table {table_id} created, waiting for second player")),
                    SeatAssignment { table_id, color },
                )
            }
            Command::Join { table_id, color } => {
                let (table_id, color) = registry.join_table(identity, table_id, color)?;
                Response::ok_with(
                    Some(format!("You joined table {table_id} as {color}")),
                    SeatAssignment { table_id, color },
                )
            }
            Command::ListTables => Response::ok_with(None, registry.list_tables()),
            Command::ReadyPlay { table_id, .. } => {
                registry.mark_ready(table_id, identity)?;
                Response::ok(format!("{identity} is ready at table {table_id}"))
            }
            Command::Move { table_id, uci } => {
                registry.submit_move(table_id, &uci)?;
                Response::ok("Move accepted")
            }
            Command::GetBoard { table_id } => {
                Response::ok_with(None, registry.query_position(table_id)?)
            }
            Command::Leave {
                table_id, color, ..
            } => {
                registry.leave(table_id, color, identity)?;
                Response::ok(format!("{identity} left table {table_id} ({color})"))
            }
            Command::Status { table_id } => {
                Response::ok_with(None, registry.game_status(table_id)?)
            }
            Command::Register { .. } | Command::Quit => {
                Response::err("Unexpected command")
            }
        };
        Ok(response)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(identity) = self.identity.take() {
            let left = self.registry.disconnect(&identity, self.policy);
            debug!(user = %identity, ?left, "session ended");
        }
    }
}

/// Serves one connection until the peer closes, sends `quit`, or breaks framing.
///
/// An undecodable frame is answered with an `err` response before the
/// connection is closed.
pub async fn run_session<T>(
    io: T,
    peer: Option<SocketAddr>,
    registry: Arc<Registry>,
    config: &ServerConfig,
) -> Result<(), FrameError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut conn = framed(io, config.max_frame_bytes);
    let mut session = Session::new(registry, config.disconnect_policy, peer);

    loop {
        let command = match read_message::<_, Command>(&mut conn).await {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(FrameError::MalformedFrame(reason)) => {
                debug!(?peer, %reason, "malformed frame");
                let reply = Response::err("Malformed frame");
                let _ = write_message(&mut conn, &reply).await;
                return Err(FrameError::MalformedFrame(reason));
            }
            Err(err) => return Err(err),
        };

        let action = command.name();
        let (response, flow) = session.handle_command(command);
        debug!(
            ?peer,
            user = session.identity().unwrap_or("-"),
            action,
            ok = response.is_ok(),
            "handled command"
        );
        write_message(&mut conn, &response).await?;

        if flow == Flow::Close {
            info!(?peer, user = session.identity().unwrap_or("-"), "client quit");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::{run_session, Flow, Session};
    use crate::game_state::chess_types::Color;
    use crate::server::config::{DisconnectPolicy, ServerConfig};
    use crate::server::framing::{framed, read_message, write_message, FrameError};
    use crate::server::protocol::{Command, Response, ResponseStatus};
    use crate::server::registry::Registry;

    fn session(registry: &Arc<Registry>) -> Session {
        Session::new(Arc::clone(registry), DisconnectPolicy::VacateSeats, None)
    }

    fn run(session: &mut Session, command: Command) -> Response {
        let (response, flow) = session.handle_command(command);
        assert_eq!(flow, Flow::Continue);
        response
    }

    #[test]
    fn commands_before_register_are_rejected() {
        let registry = Arc::new(Registry::new(None));
        let mut alice = session(&registry);
        let response = run(&mut alice, Command::ListTables);
        assert_eq!(response.status, ResponseStatus::Err);
        assert_eq!(response.msg.as_deref(), Some("Register first"));

        assert!(run(&mut alice, Command::Register { name: "alice".into() }).is_ok());
        assert!(run(&mut alice, Command::ListTables).is_ok());
        let again = run(&mut alice, Command::Register { name: "bob".into() });
        assert_eq!(again.msg.as_deref(), Some("Already registered as alice"));
    }

    #[test]
    fn wire_user_field_cannot_impersonate() {
        let registry = Arc::new(Registry::new(None));
        let mut alice = session(&registry);
        let mut mallory = session(&registry);
        run(&mut alice, Command::Register { name: "alice".into() });
        run(&mut mallory, Command::Register { name: "mallory".into() });
        let created = run(&mut alice, Command::CreateTable { color: Some(Color::White) });
        assert_eq!(created.data, Some(json!({"table_id": 1, "color": "white"})));

        run(
            &mut mallory,
            Command::Leave {
                table_id: 1,
                color: Color::White,
                user: Some("alice".into()),
            },
        );
        assert_eq!(registry.list_tables()[0].white.as_deref(), Some("alice"));
    }

    #[test]
    fn dropping_a_session_vacates_its_seats() {
        let registry = Arc::new(Registry::new(None));
        {
            let mut alice = session(&registry);
            run(&mut alice, Command::Register { name: "alice".into() });
            run(&mut alice, Command::CreateTable { color: None });
            assert_eq!(registry.list_tables().len(), 1);
        }
        assert!(registry.list_tables().is_empty());
        assert_eq!(registry.user_count(), 0);
    }

    #[test]
    fn quit_closes() {
        let registry = Arc::new(Registry::new(None));
        let mut anon = session(&registry);
        let (response, flow) = anon.handle_command(Command::Quit);
        assert!(response.is_ok());
        assert_eq!(flow, Flow::Close);
    }

    #[tokio::test]
    async fn malformed_frame_gets_an_error_reply_then_closes() {
        let registry = Arc::new(Registry::new(None));
        let (client, server) = tokio::io::duplex(4096);
        let config = ServerConfig::default();
        let task = tokio::spawn(async move { run_session(server, None, registry, &config).await });

        let mut conn = framed(client, 4096);
        write_message(&mut conn, &json!({"action": "dance"}))
            .await
            .expect("write succeeds");
        let reply: Response = read_message(&mut conn)
            .await
            .expect("reply frame")
            .expect("server replied before closing");
        assert_eq!(reply.status, ResponseStatus::Err);
        assert_eq!(reply.msg.as_deref(), Some("Malformed frame"));

        let outcome = task.await.expect("session task should not panic");
        assert!(matches!(outcome, Err(FrameError::MalformedFrame(_))));
    }
}
