use std::process;

use clap::{CommandFactory, Parser};

/// Rudimentary WebSocket load generator. Opens N concurrent connections to a
/// server, sends one fixed message on each, then reads replies until the
/// server closes the connection.
#[derive(Parser, Debug, Clone)]
#[command(name = "ws-load")]
pub struct Config {
    /// Number of concurrent connections
    #[arg(short = 'n', default_value_t = 0)]
    pub connections: usize,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "")]
    pub url: String,

    /// Print replies from the server
    #[arg(short = 'p', long = "print", default_value_t = false)]
    pub print_replies: bool,
}

impl Config {
    /// Parses the command line and validates the required flags. On a
    /// validation failure the usage text is printed to stderr and the process
    /// exits with status 1 before any connection is attempted.
    pub fn from_args() -> Self {
        let config = Self::parse();

        if let Err(e) = config.validate() {
            let mut cmd = Self::command();
            eprintln!("{}: {}\n", cmd.get_name(), e);
            eprintln!("{}", cmd.render_long_help());
            process::exit(1);
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err(String::from("a WebSocket server URL is required"));
        }

        if self.connections == 0 {
            return Err(String::from("the connection count must be positive"));
        }

        Ok(())
    }
}
