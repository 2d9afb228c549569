//! Startup banner and URL display

use super::config::{AppConfig, is_all_interfaces};
use super::constants::APP_NAME;

// "OTLP gRPC:" and friends, padded for alignment
const W: usize = 12;

/// Banner rows as (label, value) pairs
pub fn banner_rows(config: &AppConfig, data_dir: &str) -> Vec<(&'static str, String)> {
    let host = config.server.host.as_str();
    let port = config.server.port;

    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    let mut rows = vec![
        ("Dashboard:", format!("http://{}:{}", display_host, port)),
        (
            "OTLP HTTP:",
            format!("http://{}:{}/v1/traces", display_host, port),
        ),
    ];

    if config.otel.grpc_enabled {
        rows.push((
            "OTLP gRPC:",
            format!("{}:{}", display_host, config.otel.grpc_port),
        ));
    }

    if host == "127.0.0.1" || host == "localhost" {
        rows.push(("Network:", "use --host 0.0.0.0 to expose".to_string()));
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                rows.push(("Network:", format!("http://{}:{}", ip, port)));
            }
        }
    } else {
        rows.push(("Network:", format!("http://{}:{}", host, port)));
    }

    rows.push(("Data:", data_dir.to_string()));
    rows
}

/// Print the startup banner with URLs
pub fn print_banner(config: &AppConfig, data_dir: &str) {
    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    for (label, value) in banner_rows(config, data_dir) {
        match label {
            "Data:" => println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", label, value),
            "OTLP HTTP:" | "OTLP gRPC:" => {
                println!("  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}", label, value)
            }
            _ => println!("  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}", label, value),
        }
    }

    println!();
}
