// src/fetch/urls.rs
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Error, Result};

/// Visible text of the anchors that point at yearly archives.
const ZIP_LINK_TEXT: &str = "ZIP";

/// Fetch the index page and return every archive URL it links to.
#[instrument(level = "debug", skip(client, index), fields(index = %index))]
pub async fn fetch_zip_urls(client: &Client, index: &Url) -> Result<Vec<Url>> {
    let resp = client
        .get(index.clone())
        .send()
        .await
        .map_err(|e| Error::from_reqwest(index.as_str(), e))?;
    if !resp.status().is_success() {
        return Err(Error::HttpStatus {
            url: index.to_string(),
            status: resp.status(),
        });
    }
    let html = resp
        .text()
        .await
        .map_err(|e| Error::from_reqwest(index.as_str(), e))?;

    let links = parse_zip_links(&html, index);
    debug!(count = links.len(), "archive links on index");
    Ok(links)
}

/// Anchors whose text is exactly `ZIP`, with `href` resolved against `base`.
pub fn parse_zip_links(html: &str, base: &Url) -> Vec<Url> {
    let selector = Selector::parse("a[href]").expect("CSS selector for links should be valid");
    Html::parse_document(html)
        .select(&selector)
        .filter(|e| e.text().collect::<String>() == ZIP_LINK_TEXT)
        .filter_map(|e| e.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_zip_anchors_are_collected() {
        let html = r#"
            <html><body><table>
              <tr><td>2016</td><td><a href="data/datagis2016.zip">ZIP</a></td></tr>
              <tr><td>2020</td><td><a href="data/datagis-01-2020.zip">ZIP</a></td></tr>
              <tr><td>docs</td><td><a href="doc/readme.pdf">PDF</a></td></tr>
              <tr><td>odd</td><td><a href="data/other.zip">ZIP archive</a></td></tr>
            </table></body></html>"#;
        let base = Url::parse("https://example.org/izv/").unwrap();

        let links = parse_zip_links(html, &base);
        let links: Vec<String> = links.into_iter().map(|u| u.to_string()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.org/izv/data/datagis2016.zip",
                "https://example.org/izv/data/datagis-01-2020.zip",
            ]
        );
    }
}
