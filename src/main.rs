#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use pair_signal_server::config;
use pair_signal_server::logging;
use pair_signal_server::server::{PairingServer, ServerConfig};
use pair_signal_server::websocket;
use std::{net::SocketAddr, sync::Arc};

/// Pair Signal -- anonymous one-to-one pairing with WebRTC signaling and chat relay
#[derive(Parser, Debug)]
#[command(name = "pair-signal-server")]
#[command(
    about = "An in-memory WebSocket server that pairs strangers and relays their WebRTC signaling"
)]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,

    /// Listen port. Overrides every configuration source.
    #[arg(long, short = 'p')]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load();
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    let cfg = Arc::new(cfg);

    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // config::load() only reports validation problems; here they are fatal.
    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Server name: {}", cfg.server.server_name);
                println!(
                    "  Match greeting: {}",
                    if cfg.server.match_greeting.is_some() {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
                println!(
                    "  Strict signal routing: {}",
                    cfg.server.strict_signal_routing
                );
                println!(
                    "  Waiting timeout: {}",
                    match cfg.server.waiting_timeout_secs {
                        0 => "disabled".to_string(),
                        secs => format!("{secs}s"),
                    }
                );
                println!(
                    "  Max connections per IP: {}",
                    cfg.security.max_connections_per_ip
                );
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));

    let pairing_server = PairingServer::new(ServerConfig::from(cfg.as_ref()));

    let reaper_server = pairing_server.clone();
    tokio::spawn(async move {
        reaper_server.reaper_task().await;
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.security.cors_origins,
        instance_id = %pairing_server.instance_id(),
        "Server started over HTTP - WebSocket: /ws, Health: /health, Metrics: /metrics"
    );

    websocket::run_server(listener, pairing_server, &cfg.security.cors_origins).await
}
