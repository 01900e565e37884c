//! Atlassian Document Format builders for issue descriptions.
//!
//! Jira Cloud v3 rejects plain strings in `description`; it wants a `doc`
//! node wrapping block content. Only the handful of node kinds the board
//! needs are modelled here.

use serde::Serialize;

const ACCEPTANCE_CRITERIA_HEADING: &str = "Acceptance Criteria";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "doc")]
pub struct Document {
    pub version: u32,
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph { content: Vec<Node> },
    Heading { attrs: HeadingAttrs, content: Vec<Node> },
    BulletList { content: Vec<Node> },
    ListItem { content: Vec<Node> },
    Text { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadingAttrs {
    pub level: u8,
}

impl Node {
    fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    fn paragraph(text: impl Into<String>) -> Self {
        Node::Paragraph {
            content: vec![Node::text(text)],
        }
    }
}

impl Document {
    /// A single paragraph of plain text. Used for epic descriptions.
    pub fn paragraph(text: &str) -> Self {
        Self {
            version: 1,
            content: vec![Node::paragraph(text)],
        }
    }

    /// An "Acceptance Criteria" level-3 heading followed by one bullet per line.
    pub fn acceptance_criteria<S: AsRef<str>>(lines: &[S]) -> Self {
        let items = lines
            .iter()
            .map(|line| Node::ListItem {
                content: vec![Node::paragraph(line.as_ref())],
            })
            .collect();

        Self {
            version: 1,
            content: vec![
                Node::Heading {
                    attrs: HeadingAttrs { level: 3 },
                    content: vec![Node::text(ACCEPTANCE_CRITERIA_HEADING)],
                },
                Node::BulletList { content: items },
            ],
        }
    }
}
