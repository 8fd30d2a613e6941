//! HTTP client for a Revolt-style chat API and its file server

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::{ChatTransport, OutgoingMessage};
use crate::error::{Error, Result};

const BOT_TOKEN_HEADER: &str = "x-bot-token";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

pub struct HttpChatClient {
    client: Client,
    api_url: String,
    upload_url: String,
    token: String,
}

impl HttpChatClient {
    pub fn new(api_url: &str, upload_url: &str, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Ok(value) = HeaderValue::from_str(&self.token) {
            headers.insert(BOT_TOKEN_HEADER, value);
        }

        headers
    }

    fn message_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.api_url, channel_id)
    }

    fn attachment_url(&self) -> String {
        format!("{}/attachments", self.upload_url)
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn send_message(&self, channel_id: &str, message: OutgoingMessage) -> Result<()> {
        let response = self
            .client
            .post(self.message_url(channel_id))
            .headers(self.headers())
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Chat(format!(
                "send to {} failed: {} - {}",
                channel_id,
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        Ok(())
    }

    async fn upload_attachment(
        &self,
        contents: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String> {
        let part = Part::bytes(contents)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.attachment_url())
            .headers(self.headers())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Chat(format!(
                "upload of {} failed: {}",
                filename,
                response.status()
            )));
        }

        let uploaded: UploadResponse = response.json().await?;
        Ok(uploaded.id)
    }
}
