//! Server Config

use std::time::Duration;

use clap::Args;

/// Listener and shutdown settings.
#[derive(Debug, Args)]
pub struct ServerRuntimeConfig {
    /// Address to listen on
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8698")]
    pub port: u16,

    /// Time in-flight requests get to finish after a shutdown signal, in
    /// milliseconds. Defaults to the settlement deadline.
    #[arg(long, env = "SERVER_SHUTDOWN_GRACE_MS")]
    pub shutdown_grace_ms: Option<u64>,
}

impl ServerRuntimeConfig {
    /// `host:port` for the listener.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Drain period on shutdown, never shorter than `settlement_deadline`
    /// so a settlement that has started can still finish.
    #[must_use]
    pub fn shutdown_grace(&self, settlement_deadline: Duration) -> Duration {
        self.shutdown_grace_ms
            .map(Duration::from_millis)
            .map_or(settlement_deadline, |grace| grace.max(settlement_deadline))
    }
}
