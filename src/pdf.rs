use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use reqwest::multipart::{Form, Part};

/// A4 in inches
const PAPER_WIDTH: &str = "8.27";
const PAPER_HEIGHT: &str = "11.7";

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>>;
}

/// Converts HTML through a Gotenberg-compatible Chromium service
#[derive(Debug, Clone)]
pub struct GotenbergRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl GotenbergRenderer {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn convert_url(&self) -> String {
        format!("{}/forms/chromium/convert/html", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl PdfRenderer for GotenbergRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let page = Part::bytes(html.as_bytes().to_vec())
            .file_name("index.html")
            .mime_str("text/html")?;
        let form = Form::new()
            .part("files", page)
            .text("paperWidth", PAPER_WIDTH)
            .text("paperHeight", PAPER_HEIGHT)
            .text("printBackground", "true");

        let url = self.convert_url();
        debug!("Rendering {} bytes of HTML via {url}", html.len());

        let resp = self.client.post(&url).multipart(form).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("PDF renderer returned {status}: {body}");
        }

        let bytes = resp.bytes().await?;
        if !bytes.starts_with(b"%PDF") {
            bail!("PDF renderer returned a body that is not a PDF");
        }
        Ok(bytes.to_vec())
    }
}
