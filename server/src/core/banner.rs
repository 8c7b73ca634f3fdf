//! Startup banner and URL display

use super::config::is_all_interfaces;
use super::constants::APP_NAME;
use crate::utils::terminal::terminal_link;

/// Print the startup banner with the scrape URLs and upstream endpoint
pub fn print_banner(host: &str, port: u16, metrics_path: &str, endpoint: &str, devices: usize) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    const W: usize = 10;

    let local_url = format!("http://{}:{}{}", display_host, port, metrics_path);
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Metrics:",
        terminal_link(&local_url)
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        // Enumerate LAN IPs when binding to all interfaces
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{}:{}{}", ip, port, metrics_path);
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    terminal_link(&network_url)
                );
            }
        }
    } else {
        let network_url = format!("http://{}:{}{}", host, port, metrics_path);
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Network:",
            terminal_link(&network_url)
        );
    }

    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {} \x1b[90m({} devices)\x1b[0m",
        "Upstream:", endpoint, devices
    );

    println!();
}
