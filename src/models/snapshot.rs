use serde::Serialize;

use super::trello::{CheckItemState, TrelloChecklist};

/// Everything the report template gets to see.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub lists: Vec<ListSnapshot>,
    pub week: u32,
    #[serde(rename = "donelabel")]
    pub done_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListSnapshot {
    pub name: String,
    pub id: String,
    pub cards: Vec<CardSnapshot>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardSnapshot {
    pub name: String,
    pub id: String,
    pub checklists: Vec<ChecklistSnapshot>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChecklistSnapshot {
    pub name: String,
    pub id: String,
    pub complete: Vec<String>,
    pub incomplete: Vec<String>,
}

impl From<TrelloChecklist> for ChecklistSnapshot {
    fn from(checklist: TrelloChecklist) -> Self {
        let mut complete = Vec::new();
        let mut incomplete = Vec::new();
        for item in checklist.check_items {
            match item.state {
                CheckItemState::Complete => complete.push(item.name),
                CheckItemState::Incomplete => incomplete.push(item.name),
                CheckItemState::Other => {}
            }
        }

        Self {
            name: checklist.name,
            id: checklist.id,
            complete,
            incomplete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_partitioned_by_state() {
        let checklist: TrelloChecklist = serde_json::from_str(
            r#"{"id":"k1","name":"Tasks","checkItems":[
                {"name":"a","state":"complete"},
                {"name":"b","state":"incomplete"},
                {"name":"c","state":"unknown"},
                {"name":"d","state":"complete"}
            ]}"#,
        )
        .unwrap();

        let snapshot = ChecklistSnapshot::from(checklist);
        assert_eq!(snapshot.complete, vec!["a", "d"]);
        assert_eq!(snapshot.incomplete, vec!["b"]);
    }

    #[test]
    fn test_context_serializes_template_keys() {
        let ctx = ReportContext {
            lists: Vec::new(),
            week: 7,
            done_label: "Done".to_string(),
        };
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["donelabel"], "Done");
        assert_eq!(value["week"], 7);
        assert!(value["lists"].as_array().unwrap().is_empty());
    }
}
