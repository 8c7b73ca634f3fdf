//! Landing page

use axum::extract::State;
use axum::response::Html;

use crate::core::constants::APP_NAME;

/// Render the landing page linking to the scrape endpoint
pub fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>SmartThings Exporter</title></head>\n\
         <body>\n\
         <h1>SmartThings Exporter</h1>\n\
         <p>{} v{}</p>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        metrics_path
    )
}

pub async fn index(State(page): State<String>) -> Html<String> {
    Html(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_page_links_metrics_path() {
        let page = landing_page("/probe");
        assert!(page.contains("<title>SmartThings Exporter</title>"));
        assert!(page.contains("<a href=\"/probe\">Metrics</a>"));
    }
}
