//! Server configuration.
//!
//! `ServerArgs` is the clap surface flattened into the `plum_tables` binary;
//! `ServerConfig` is the validated value the listener and registry consume.

use clap::Args;

use crate::server::clock::TimeControl;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5555;
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// What happens to a user's seats when their connection ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisconnectPolicy {
    /// Implicit `leave` for every seat the user holds.
    #[default]
    VacateSeats,
    /// Seats stay occupied until an explicit `leave`.
    KeepSeats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_frame_bytes: usize,
    pub disconnect_policy: DisconnectPolicy,
    pub time_control: Option<TimeControl>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            disconnect_policy: DisconnectPolicy::default(),
            time_control: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Interface to listen on.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port; 0 picks an ephemeral port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest accepted frame payload in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: usize,

    /// Keep a user's seats when their connection drops.
    #[arg(long)]
    pub keep_seats_on_disconnect: bool,

    /// Initial time per side. Tables are untimed when omitted.
    #[arg(long)]
    pub clock_seconds: Option<u64>,

    /// Time added to the mover's clock after each move.
    #[arg(long, default_value_t = 0, requires = "clock_seconds")]
    pub increment_seconds: u64,
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_frame_bytes: args.max_frame_bytes,
            disconnect_policy: if args.keep_seats_on_disconnect {
                DisconnectPolicy::KeepSeats
            } else {
                DisconnectPolicy::VacateSeats
            },
            time_control: args
                .clock_seconds
                .map(|initial| TimeControl::from_seconds(initial, args.increment_seconds)),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{DisconnectPolicy, ServerArgs, ServerConfig};
    use crate::server::clock::TimeControl;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        server: ServerArgs,
    }

    fn parse(args: &[&str]) -> ServerConfig {
        let argv = std::iter::once("plum_tables").chain(args.iter().copied());
        Cli::try_parse_from(argv).expect("arguments should parse").server.into()
    }

    #[test]
    fn defaults_match_server_config_default() {
        assert_eq!(parse(&[]), ServerConfig::default());
        assert_eq!(ServerConfig::default().bind_addr(), "0.0.0.0:5555");
    }

    #[test]
    fn flags_map_onto_config() {
        let config = parse(&[
            "--port",
            "7000",
            "--keep-seats-on-disconnect",
            "--clock-seconds",
            "300",
            "--increment-seconds",
            "3",
        ]);
        assert_eq!(config.port, 7000);
        assert_eq!(config.disconnect_policy, DisconnectPolicy::KeepSeats);
        assert_eq!(config.time_control, Some(TimeControl::from_seconds(300, 3)));
    }

    #[test]
    fn increment_without_clock_is_rejected() {
        let argv = ["plum_tables", "--increment-seconds", "2"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
