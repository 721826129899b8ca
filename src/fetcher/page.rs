use std::time::Duration;

use log::debug;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::ImportError;

/// Textual metadata scraped from the video page.
///
/// This is the degraded-mode payload: when the platform refuses to serve the
/// binary stream it usually still serves the page with its Open Graph tags.
#[derive(Debug, Clone, Default)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

impl PageMetadata {
    /// Whether there is enough text to feed the text-only extraction.
    pub fn has_text(&self) -> bool {
        !self.title.trim().is_empty() || !self.description.trim().is_empty()
    }

    /// Combined text handed to the model.
    pub fn text(&self) -> String {
        match (self.title.trim(), self.description.trim()) {
            (title, "") => title.to_string(),
            ("", description) => description.to_string(),
            (title, description) => format!("{title}\n{description}"),
        }
    }
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ImportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the page and scrape its Open Graph title/description/image.
    pub async fn fetch_metadata(&self, url: &str) -> Result<PageMetadata, ImportError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::Api { status, body });
        }

        let html = response.text().await?;
        let metadata = extract_metadata(&html);
        debug!("Page metadata for {}: {:?}", url, metadata);
        Ok(metadata)
    }
}

fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "meta[property=\"og:title\"]")
        .or_else(|| title_text(&document))
        .unwrap_or_default();
    let description = meta_content(&document, "meta[property=\"og:description\"]")
        .or_else(|| meta_content(&document, "meta[name=\"description\"]"))
        .unwrap_or_default();
    let thumbnail = meta_content(&document, "meta[property=\"og:image\"]");

    PageMetadata {
        title,
        description,
        thumbnail,
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

fn title_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| {
            html_escape::decode_html_entities(el.inner_html().trim())
                .trim()
                .to_string()
        })
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_open_graph_tags() {
        let html = r#"
            <html>
            <head>
                <title>Page Title</title>
                <meta property="og:title" content="Pâtes carbonara express" />
                <meta property="og:description" content="3 ingrédients, 10 minutes" />
                <meta property="og:image" content="https://cdn.example.com/thumb.jpg" />
            </head>
            <body></body>
            </html>
        "#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Pâtes carbonara express");
        assert_eq!(metadata.description, "3 ingrédients, 10 minutes");
        assert_eq!(
            metadata.thumbnail.as_deref(),
            Some("https://cdn.example.com/thumb.jpg")
        );
        assert!(metadata.has_text());
    }

    #[test]
    fn test_title_tag_fallback_decodes_entities() {
        let html = "<html><head><title>Fish &amp; Chips</title></head><body></body></html>";
        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Fish & Chips");
        assert_eq!(metadata.description, "");
        assert!(metadata.thumbnail.is_none());
    }

    #[test]
    fn test_empty_page_has_no_text() {
        let metadata = extract_metadata("<html><body></body></html>");
        assert!(!metadata.has_text());
        assert_eq!(metadata.text(), "");
    }

    #[test]
    fn test_text_combines_title_and_description() {
        let metadata = PageMetadata {
            title: "Tarte".to_string(),
            description: "aux pommes".to_string(),
            thumbnail: None,
        };
        assert_eq!(metadata.text(), "Tarte\naux pommes");
    }

    #[tokio::test]
    async fn test_fetch_metadata_http_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/gone").with_status(404).create();

        let fetcher = PageFetcher::new("test-agent", Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch_metadata(&format!("{}/gone", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Api { status: 404, .. }));
        mock.assert();
    }
}
