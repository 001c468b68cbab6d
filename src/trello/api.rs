use async_trait::async_trait;

use crate::error::Result;
use crate::models::{TrelloCard, TrelloChecklist, TrelloList};

/// Read-only view of a Trello board, one call per endpoint.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn board_lists(&self, board_id: &str) -> Result<Vec<TrelloList>>;
    async fn list_cards(&self, list_id: &str) -> Result<Vec<TrelloCard>>;
    async fn card_checklists(&self, card_id: &str) -> Result<Vec<TrelloChecklist>>;
}
