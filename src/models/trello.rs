use serde::{Deserialize, Serialize};

/// Board payload when requested with `lists=all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardLists {
    #[serde(default)]
    pub lists: Vec<TrelloList>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloList {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(rename = "idChecklists", default)]
    pub id_checklists: Vec<String>,
}

impl TrelloCard {
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().filter_map(|l| l.name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloChecklist {
    pub id: String,
    pub name: String,
    #[serde(rename = "checkItems", default)]
    pub check_items: Vec<CheckItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckItem {
    pub name: String,
    pub state: CheckItemState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckItemState {
    Complete,
    Incomplete,
    #[serde(other)]
    Other,
}
