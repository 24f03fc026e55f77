use chrono::{DateTime, Utc};
use serde::Serialize;

/// An outbound channel message: plain text, a rich embed, or both.
///
/// Rendering is sink-agnostic; the sink decides how `mention_operator`
/// and the embed payload map onto its wire format.
#[derive(Debug, Clone)]
pub struct Message {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub mention_operator: bool,
}

impl Message {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Message {
            content: Some(content.into()),
            embed: None,
            mention_operator: false,
        }
    }

    #[must_use]
    pub fn from_embed(embed: Embed) -> Self {
        Message {
            content: None,
            embed: Some(embed),
            mention_operator: false,
        }
    }

    #[must_use]
    pub fn with_operator_mention(mut self) -> Self {
        self.mention_operator = true;
        self
    }
}

/// Rich embed payload, shaped after the Discord embed object.
#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub timestamp: DateTime<Utc>,
}

impl Embed {
    #[must_use]
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Embed {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_has_no_embed_or_mention() {
        let message = Message::text("hello");
        assert_eq!(message.content.as_deref(), Some("hello"));
        assert!(message.embed.is_none());
        assert!(!message.mention_operator);
    }

    #[test]
    fn with_operator_mention_sets_the_flag() {
        let message = Message::text("hello").with_operator_mention();
        assert!(message.mention_operator);
    }

    #[test]
    fn embed_builder_accumulates_fields_in_order() {
        let embed = Embed::new("Title", 0x00_ff00)
            .field("A", "1", true)
            .field("B", "2", false);
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].name, "A");
        assert!(embed.fields[0].inline);
        assert_eq!(embed.fields[1].name, "B");
        assert!(!embed.fields[1].inline);
    }

    #[test]
    fn embed_without_description_omits_the_key() {
        let embed = Embed::new("Title", 0xff_0000);
        let value = serde_json::to_value(&embed).unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(value["title"], "Title");
        assert_eq!(value["color"], 0xff_0000);
    }

    #[test]
    fn embed_description_serializes_when_set() {
        let embed = Embed::new("Title", 0xff_0000).description("body");
        let value = serde_json::to_value(&embed).unwrap();
        assert_eq!(value["description"], "body");
    }
}
