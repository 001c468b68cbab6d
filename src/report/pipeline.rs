use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result, Stage};
use crate::models::{
    CardSnapshot, ChecklistSnapshot, ListSnapshot, ReportContext, TrelloCard, TrelloList,
};
use crate::steps::StepLogger;
use crate::trello::BoardApi;

/// Pulls the configured lists, their cards and checklists off a board.
///
/// Every request is awaited before the next one starts, so requests (and
/// the step log) always come out in board order. The first failed request
/// aborts the whole collection.
pub struct ReportPipeline {
    api: Arc<dyn BoardApi>,
    board_id: String,
    lists: Vec<String>,
    ignore_labels: HashSet<String>,
    done_label: String,
    week: u32,
}

impl ReportPipeline {
    pub fn new(api: impl BoardApi + 'static, config: &Config) -> Self {
        Self::with_shared(Arc::new(api), config)
    }

    pub fn with_shared(api: Arc<dyn BoardApi>, config: &Config) -> Self {
        Self {
            api,
            board_id: config.trello.board_id.clone(),
            lists: config.filters.lists.clone(),
            ignore_labels: config.filters.ignore_labels.clone(),
            done_label: config.filters.done_list.clone(),
            week: config.week.week,
        }
    }

    pub async fn collect(&self, log: &StepLogger) -> Result<ReportContext> {
        log.step("Retrieving lists from Trello Board");
        let board_lists = self
            .api
            .board_lists(&self.board_id)
            .await
            .map_err(|e| Error::upstream(Stage::Lists, &self.board_id, e))?;

        let resolved = self.resolve_lists(board_lists)?;

        let mut lists = Vec::with_capacity(resolved.len());
        for list in resolved {
            lists.push(self.load_list(list, log).await?);
        }

        Ok(ReportContext {
            lists,
            week: self.week,
            done_label: self.done_label.clone(),
        })
    }

    /// Orders the board's lists by the configured names.
    ///
    /// A board with two lists of the same name resolves to the last one.
    /// Names are only checked once every returned list has been indexed.
    pub fn resolve_lists(&self, board_lists: Vec<TrelloList>) -> Result<Vec<TrelloList>> {
        let mut by_name: HashMap<String, TrelloList> = HashMap::new();
        for list in board_lists {
            if self.lists.contains(&list.name) {
                by_name.insert(list.name.clone(), list);
            }
        }

        self.lists
            .iter()
            .map(|name| {
                by_name
                    .remove(name)
                    .ok_or_else(|| Error::ListNotFound { name: name.clone() })
            })
            .collect()
    }

    async fn load_list(&self, list: TrelloList, log: &StepLogger) -> Result<ListSnapshot> {
        log.step(&format!("Loading cards for list: {}", list.name));
        let cards = self
            .api
            .list_cards(&list.id)
            .await
            .map_err(|e| Error::upstream(Stage::Cards, &list.name, e))?;

        let mut retained = Vec::new();
        for card in cards {
            if self.is_ignored(&card) {
                tracing::debug!("Ignoring card {} by label", card.name);
                continue;
            }
            retained.push(self.load_card(card, log).await?);
        }

        Ok(ListSnapshot {
            name: list.name,
            id: list.id,
            cards: retained,
        })
    }

    async fn load_card(&self, card: TrelloCard, log: &StepLogger) -> Result<CardSnapshot> {
        let mut checklists = Vec::new();

        if !card.id_checklists.is_empty() {
            log.substep(&format!("Loading cards checklist for card: {}", card.name));
            checklists = self
                .api
                .card_checklists(&card.id)
                .await
                .map_err(|e| Error::upstream(Stage::Checklists, &card.name, e))?
                .into_iter()
                .map(ChecklistSnapshot::from)
                .collect();
        }

        Ok(CardSnapshot {
            name: card.name,
            id: card.id,
            checklists,
        })
    }

    fn is_ignored(&self, card: &TrelloCard) -> bool {
        card.label_names().any(|name| self.ignore_labels.contains(name))
    }
}
