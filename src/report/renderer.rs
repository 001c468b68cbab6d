use std::path::Path;

use crate::error::{Error, Result};
use crate::models::ReportContext;

pub const DEFAULT_TEMPLATE: &str = "weekly.liquid";

/// Renders a [`ReportContext`] through a Liquid template.
///
/// Templates see three variables: `lists`, `week` and `donelabel`.
pub struct ReportRenderer {
    parser: liquid::Parser,
}

impl ReportRenderer {
    pub fn new() -> Result<Self> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(Self { parser })
    }

    pub fn render_file(&self, path: &Path, context: &ReportContext) -> Result<String> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Template(format!("unable to read template {}: {}", path.display(), e))
        })?;
        self.render_str(&source, context)
    }

    pub fn render_str(&self, source: &str, context: &ReportContext) -> Result<String> {
        let template = self
            .parser
            .parse(source)
            .map_err(|e| Error::Template(e.to_string()))?;

        let globals = liquid::to_object(context).map_err(|e| Error::Template(e.to_string()))?;

        template
            .render(&globals)
            .map_err(|e| Error::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardSnapshot, ChecklistSnapshot, ListSnapshot};

    fn context() -> ReportContext {
        ReportContext {
            lists: vec![
                ListSnapshot {
                    name: "Doing".to_string(),
                    id: "L2".to_string(),
                    cards: vec![CardSnapshot {
                        name: "Release".to_string(),
                        id: "c1".to_string(),
                        checklists: vec![ChecklistSnapshot {
                            name: "Steps".to_string(),
                            id: "k1".to_string(),
                            complete: vec!["tag".to_string()],
                            incomplete: vec!["publish".to_string(), "announce".to_string()],
                        }],
                    }],
                },
                ListSnapshot {
                    name: "Done".to_string(),
                    id: "L3".to_string(),
                    cards: Vec::new(),
                },
            ],
            week: 42,
            done_label: "Done".to_string(),
        }
    }

    #[test]
    fn test_render_exposes_lists_week_and_done_label() {
        let renderer = ReportRenderer::new().unwrap();
        let source = "W{{ week }}|{% for list in lists %}{{ list.name }}{% if list.name == donelabel %}*{% endif %}:{{ list.cards | size }};{% endfor %}";

        let out = renderer.render_str(source, &context()).unwrap();
        assert_eq!(out, "W42|Doing:1;Done*:0;");
    }

    #[test]
    fn test_render_nested_checklists() {
        let renderer = ReportRenderer::new().unwrap();
        let source = "{% for list in lists %}{% for card in list.cards %}{% for cl in card.checklists %}{{ cl.complete | join: \",\" }}/{{ cl.incomplete | join: \",\" }}{% endfor %}{% endfor %}{% endfor %}";

        let out = renderer.render_str(source, &context()).unwrap();
        assert_eq!(out, "tag/publish,announce");
    }

    #[test]
    fn test_bundled_template_renders() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_TEMPLATE);
        let renderer = ReportRenderer::new().unwrap();

        let out = renderer.render_file(&path, &context()).unwrap();
        assert!(out.contains("Release"));
        assert!(out.contains("publish"));
    }

    #[test]
    fn test_missing_template_is_template_error() {
        let renderer = ReportRenderer::new().unwrap();
        let result = renderer.render_file(Path::new("/nonexistent/weekly.liquid"), &context());
        assert!(matches!(result, Err(Error::Template(_))));
    }

    #[test]
    fn test_syntax_error_is_template_error() {
        let renderer = ReportRenderer::new().unwrap();
        let result = renderer.render_str("{% for x in %}", &context());
        assert!(matches!(result, Err(Error::Template(_))));
    }
}
