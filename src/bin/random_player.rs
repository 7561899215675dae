//! Bot that joins a table and plays uniformly random legal moves.
//!
//! Run with:
//! `cargo run --bin random_player -- --name bot1`
//! `cargo run --bin random_player -- --name bot2 --table 1 --poll-ms 200`

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use plum_tables::client::table_client::{ClientError, TableClient};
use plum_tables::engines::engine_random::RandomMover;
use plum_tables::server::protocol::SeatAssignment;

#[derive(Parser, Debug)]
#[command(name = "random_player", version, about = "Plays random legal moves on a table server")]
struct Cli {
    /// Server address.
    #[arg(long, default_value = "127.0.0.1:5555")]
    server: String,

    /// Name to register under.
    #[arg(long)]
    name: String,

    /// Table to join; without it the bot joins any open table or opens one.
    #[arg(long)]
    table: Option<u32>,

    /// Delay between board polls.
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,

    /// Seed for reproducible move choices.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut client = TableClient::connect(cli.server.as_str())
        .await
        .with_context(|| format!("cannot reach {}", cli.server))?;
    client.register(&cli.name).await.context("register failed")?;

    let seat = take_seat(&mut client, cli.table).await?;
    info!(table_id = seat.table_id, color = %seat.color, "seated");
    client.ready(seat.table_id).await?;

    let mut mover = match cli.seed {
        Some(seed) => RandomMover::seeded(seed),
        None => RandomMover::new(),
    };
    let poll = Duration::from_millis(cli.poll_ms);

    loop {
        let status = client.status(seat.table_id).await?;
        if status.is_terminal() {
            info!(state = %status.state, winner = ?status.winner, "game over");
            break;
        }

        let opponent_seated = client
            .list_tables()
            .await?
            .iter()
            .any(|table| table.id == seat.table_id && table.in_progress);
        if !opponent_seated || status.side_to_move != seat.color {
            tokio::time::sleep(poll).await;
            continue;
        }

        let position = client.board(seat.table_id).await?;
        debug!("board before our move:\n{position}");
        let Some(mv) = mover.choose_move(&position) else {
            tokio::time::sleep(poll).await;
            continue;
        };
        match client.submit_move(seat.table_id, &mv.to_uci()).await {
            Ok(()) => info!(uci = %mv, "played"),
            Err(ClientError::Rejected(reason)) => warn!(uci = %mv, %reason, "move rejected"),
            Err(err) => return Err(err.into()),
        }
    }

    client.leave(seat.table_id, seat.color).await?;
    client.quit().await?;
    Ok(())
}

async fn take_seat(client: &mut TableClient, table: Option<u32>) -> Result<SeatAssignment> {
    if let Some(table_id) = table {
        return client
            .join(Some(table_id), None)
            .await
            .with_context(|| format!("cannot join table {table_id}"));
    }
    match client.join(None, None).await {
        Ok(seat) => Ok(seat),
        Err(ClientError::Rejected(_)) => Ok(client.create_table(None).await?),
        Err(err) => bail!(err),
    }
}
