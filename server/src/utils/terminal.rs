//! Terminal utility functions

/// Format a URL as a clickable terminal hyperlink (OSC 8) when stdout
/// supports it, plain cyan text otherwise.
pub fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", url, url)
    } else {
        format!("\x1b[36m{}\x1b[0m", url)
    }
}
