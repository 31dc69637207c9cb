//! User-facing message model.
//!
//! Messages are handed to the host as opaque renderable values. The host
//! decides how styles and click actions look; `to_plain_text` gives a
//! lossless-enough rendering for consoles and logs.

use serde::Serialize;

/// Visual emphasis of a text segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Plain,
    Bold,
    Error,
}

/// What happens when the user clicks a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClickAction {
    /// Runs the given command line as the user (leading `/` included).
    RunCommand(String),
    CopyToClipboard(String),
}

/// One piece of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { content: String, style: TextStyle },
    Link {
        label: String,
        tooltip: Option<String>,
        action: ClickAction,
    },
    LineBreak,
}

/// A renderable message built from segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Message {
    segments: Vec<Segment>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends plain text.
    pub fn text(self, content: impl Into<String>) -> Self {
        self.styled(content, TextStyle::Plain)
    }

    /// Appends text with the given style.
    pub fn styled(mut self, content: impl Into<String>, style: TextStyle) -> Self {
        self.segments.push(Segment::Text {
            content: content.into(),
            style,
        });
        self
    }

    /// Appends a clickable link, rendered as `[label]`.
    pub fn link(
        mut self,
        label: impl Into<String>,
        tooltip: Option<String>,
        action: ClickAction,
    ) -> Self {
        self.segments.push(Segment::Link {
            label: label.into(),
            tooltip,
            action,
        });
        self
    }

    pub fn line_break(mut self) -> Self {
        self.segments.push(Segment::LineBreak);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns every link action in order of appearance.
    pub fn actions(&self) -> impl Iterator<Item = &ClickAction> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Link { action, .. } => Some(action),
            _ => None,
        })
    }

    /// Renders the message without styling.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text { content, .. } => out.push_str(content),
                Segment::Link { label, .. } => {
                    out.push('[');
                    out.push_str(label);
                    out.push(']');
                }
                Segment::LineBreak => out.push('\n'),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_rendering_brackets_links() {
        let message = Message::new()
            .text("Pick one:")
            .line_break()
            .text(" - ")
            .link(
                "discord",
                Some("Click to choose".to_string()),
                ClickAction::RunCommand("/interactive-login discord".to_string()),
            );

        assert_eq!(message.to_plain_text(), "Pick one:\n - [discord]");
    }

    #[test]
    fn actions_lists_links_in_order() {
        let message = Message::new()
            .link("a", None, ClickAction::RunCommand("/x a".to_string()))
            .text("and")
            .link("b", None, ClickAction::CopyToClipboard("b".to_string()));

        let actions: Vec<_> = message.actions().cloned().collect();
        assert_eq!(
            actions,
            vec![
                ClickAction::RunCommand("/x a".to_string()),
                ClickAction::CopyToClipboard("b".to_string()),
            ]
        );
    }

    #[test]
    fn styled_text_keeps_style() {
        let message = Message::new().styled("nope", TextStyle::Error);
        assert_eq!(
            message.segments(),
            &[Segment::Text {
                content: "nope".to_string(),
                style: TextStyle::Error
            }]
        );
    }
}
