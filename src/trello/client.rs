use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;

use crate::config::TrelloConfig;
use crate::error::{Error, Result};
use crate::models::{BoardLists, TrelloCard, TrelloChecklist, TrelloList};
use crate::trello::api::BoardApi;

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com";

pub struct TrelloClient {
    client: Client,
    api_key: String,
    token: String,
    base_url: String,
}

impl TrelloClient {
    pub fn new(config: &TrelloConfig) -> Result<Self> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(config: &TrelloConfig, base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("trello-tracker/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            token: config.token.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, extra: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        // Only the path is logged, the query carries credentials.
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("token", self.token.as_str())])
            .query(extra)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TrelloApi(format!("{} - {}", status, body.trim())));
        }

        Ok(response.json().await?)
    }

    #[cfg(test)]
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BoardApi for TrelloClient {
    async fn board_lists(&self, board_id: &str) -> Result<Vec<TrelloList>> {
        let board: BoardLists = self
            .get(
                &format!("/1/boards/{}", board_id),
                &[("fields", "name"), ("lists", "all")],
            )
            .await?;
        Ok(board.lists)
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<TrelloCard>> {
        self.get(&format!("/1/lists/{}/cards", list_id), &[]).await
    }

    async fn card_checklists(&self, card_id: &str) -> Result<Vec<TrelloChecklist>> {
        self.get(&format!("/1/cards/{}/checklists", card_id), &[]).await
    }
}
