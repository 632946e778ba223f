//! Schema compilation and continuation identifiers.

use interflow_core::{
    ActionRow, Button, ButtonStyle, ComponentType, Embed, EmbedFooter, EmbedMedia,
    MessagePayload, ModalPayload, SelectMenuOption, StringSelect, TextInput,
};

use super::schema::{Component, ModalReply, Panel, ReplySchema};
use crate::error::{FlowError, FlowResult};
use crate::route::TOKEN_SEPARATOR;
use crate::session::SessionToken;

/// A compiled reply, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledReply {
    Message(MessagePayload),
    Modal(ModalPayload),
}

/// An inbound identifier split into its route id and session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundIdentifier {
    pub id: String,
    pub token: Option<SessionToken>,
}

/// Splits a component or modal custom id of the form `"<id>;<token>"`.
///
/// Anything after a second `;` is ignored. An absent or empty token yields
/// `None`.
pub fn parse_identifier(raw: &str) -> InboundIdentifier {
    let mut parts = raw.split(TOKEN_SEPARATOR);
    let id = parts.next().unwrap_or_default().to_string();
    let token = parts
        .next()
        .filter(|token| !token.is_empty())
        .map(SessionToken::new);
    InboundIdentifier { id, token }
}

/// Returns `true` if sending `schema` requires a session to be saved.
pub fn requires_continuation(schema: &ReplySchema) -> bool {
    match schema {
        ReplySchema::Modal(_) => true,
        other => other
            .component_rows()
            .iter()
            .flatten()
            .any(|component| component.next().is_some()),
    }
}

/// Builds the identifier `"<next>;<token>"` of a continuation.
///
/// Without a token the identifier is `next` itself.
pub fn continuation_id(next: &str, token: Option<&SessionToken>) -> FlowResult<String> {
    check_next(next)?;
    Ok(match token {
        Some(token) => format!("{next}{TOKEN_SEPARATOR}{token}"),
        None => next.to_string(),
    })
}

fn check_next(next: &str) -> FlowResult<()> {
    if next.contains(TOKEN_SEPARATOR) {
        return Err(FlowError::ReservedSeparator {
            path: next.to_string(),
        });
    }
    Ok(())
}

/// Checks every continuation path of `schema` without compiling it.
pub fn validate(schema: &ReplySchema) -> FlowResult<()> {
    match schema {
        ReplySchema::Modal(modal) => check_next(&modal.next),
        other => other
            .component_rows()
            .iter()
            .flatten()
            .filter_map(Component::next)
            .try_for_each(check_next),
    }
}

/// Compiles `schema`, writing `token` into every continuation identifier.
pub fn compile(schema: &ReplySchema, token: Option<&SessionToken>) -> FlowResult<CompiledReply> {
    match schema {
        ReplySchema::Modal(modal) => compile_modal(modal, token).map(CompiledReply::Modal),
        other => compile_message(other, token).map(CompiledReply::Message),
    }
}

/// Compiles a message schema.
///
/// The payload always carries a `components` list, possibly empty, so that
/// updating a message clears the components it had before. A modal schema
/// compiles to an empty message.
pub fn compile_message(
    schema: &ReplySchema,
    token: Option<&SessionToken>,
) -> FlowResult<MessagePayload> {
    let (content, panels): (Option<&String>, Vec<&Panel>) = match schema {
        ReplySchema::Embed(embed) => (embed.content.as_ref(), vec![&embed.panel]),
        ReplySchema::MultiEmbed(multi) => (multi.content.as_ref(), multi.panels.iter().collect()),
        ReplySchema::Modal(_) => (None, Vec::new()),
    };

    let components = schema
        .component_rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|component| compile_component(component, token))
                .collect::<FlowResult<Vec<_>>>()
                .map(ActionRow::new)
        })
        .collect::<FlowResult<Vec<_>>>()?;

    Ok(MessagePayload {
        content: content.cloned(),
        embeds: Some(panels.into_iter().map(compile_panel).collect()),
        components: Some(components),
        flags: None,
    })
}

/// Compiles a modal schema.
pub fn compile_modal(modal: &ModalReply, token: Option<&SessionToken>) -> FlowResult<ModalPayload> {
    let components = modal
        .fields
        .iter()
        .map(|field| {
            ActionRow::new(vec![interflow_core::Component::TextInput(TextInput {
                kind: ComponentType::TextInput,
                custom_id: field.name.clone(),
                style: field.style,
                label: field.label.clone(),
                min_length: field.min_length,
                max_length: field.max_length,
                required: field.required,
                value: field.value.clone(),
                placeholder: field.placeholder.clone(),
            })])
        })
        .collect();

    Ok(ModalPayload {
        title: modal.title.clone(),
        custom_id: continuation_id(&modal.next, token)?,
        components,
    })
}

fn compile_panel(panel: &Panel) -> Embed {
    Embed {
        title: Some(panel.title.clone()),
        description: Some(panel.description.clone()),
        color: panel.color,
        thumbnail: panel.thumbnail.clone().map(|url| EmbedMedia { url }),
        image: panel.image.clone().map(|url| EmbedMedia { url }),
        footer: panel.footer.as_ref().map(|footer| EmbedFooter {
            text: footer.text.clone(),
            icon_url: footer.icon_url.clone(),
        }),
    }
}

fn compile_component(
    component: &Component,
    token: Option<&SessionToken>,
) -> FlowResult<interflow_core::Component> {
    let compiled = match component {
        Component::Button(button) => interflow_core::Component::Button(Button {
            kind: ComponentType::Button,
            style: button.style.into(),
            label: Some(button.label.clone()),
            emoji: button.emoji.clone(),
            custom_id: Some(continuation_id(&button.next, token)?),
            url: None,
            disabled: button.disabled.then_some(true),
        }),
        Component::Link(link) => interflow_core::Component::Button(Button {
            kind: ComponentType::Button,
            style: ButtonStyle::Link,
            label: Some(link.label.clone()),
            emoji: link.emoji.clone(),
            custom_id: None,
            url: Some(link.url.clone()),
            disabled: link.disabled.then_some(true),
        }),
        Component::Select(select) => interflow_core::Component::StringSelect(StringSelect {
            kind: ComponentType::StringSelect,
            custom_id: continuation_id(&select.next, token)?,
            placeholder: Some(select.placeholder.clone()),
            options: select
                .options
                .iter()
                .map(|option| SelectMenuOption {
                    label: option.label.clone(),
                    value: option.value.clone(),
                    description: option.description.clone(),
                    emoji: option.emoji.clone(),
                    default: option.default.then_some(true),
                })
                .collect(),
            min_values: select.min_values,
            max_values: select.max_values,
            disabled: None,
        }),
    };
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::schema::*;
    use serde_json::json;

    fn token() -> SessionToken {
        SessionToken::new("7-abc")
    }

    #[test]
    fn test_parse_identifier() {
        let parsed = parse_identifier("step2;7-abc");
        assert_eq!(parsed.id, "step2");
        assert_eq!(parsed.token, Some(token()));

        assert_eq!(parse_identifier("step2").token, None);
        assert_eq!(parse_identifier("step2;").token, None);

        let parsed = parse_identifier("step2;7-abc;extra");
        assert_eq!(parsed.id, "step2");
        assert_eq!(parsed.token.unwrap().as_str(), "7-abc");
    }

    #[test]
    fn test_requires_continuation() {
        let panel = Panel::new("t", "d");
        assert!(!requires_continuation(&EmbedReply::new(panel.clone()).into()));
        assert!(!requires_continuation(
            &EmbedReply::new(panel.clone())
                .row(vec![LinkButtonSpec::new("Docs", "https://example.com").into()])
                .into()
        ));
        assert!(requires_continuation(
            &EmbedReply::new(panel.clone())
                .row(vec![ButtonSpec::new("Go", "next").into()])
                .into()
        ));
        assert!(requires_continuation(
            &MultiEmbedReply::new(vec![panel])
                .row(vec![SelectSpec::new("Pick", "pick").into()])
                .into()
        ));
        assert!(requires_continuation(&ModalReply::new("form", "Form").into()));
    }

    #[test]
    fn test_continuation_id() {
        assert_eq!(continuation_id("step2", Some(&token())).unwrap(), "step2;7-abc");
        assert_eq!(continuation_id("step2", None).unwrap(), "step2");
        assert_eq!(parse_identifier(&continuation_id("step2", None).unwrap()).id, "step2");
        assert!(matches!(
            continuation_id("a;b", None),
            Err(FlowError::ReservedSeparator { .. })
        ));
    }

    #[test]
    fn test_compile_embed_with_components() {
        let schema: ReplySchema = EmbedReply::new(
            Panel::new("Order", "Pick a size")
                .color(0x2C2F33)
                .footer(Footer::new("step 1/2")),
        )
        .content("hello")
        .row(vec![
            ButtonSpec::new("Large", "size")
                .style(ActionStyle::Success)
                .into(),
            LinkButtonSpec::new("Menu", "https://example.com/menu").into(),
        ])
        .into();

        let CompiledReply::Message(payload) = compile(&schema, Some(&token())).unwrap() else {
            panic!("expected a message");
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "content": "hello",
                "embeds": [{
                    "title": "Order",
                    "description": "Pick a size",
                    "color": 0x2C2F33,
                    "footer": { "text": "step 1/2" },
                }],
                "components": [{
                    "type": 1,
                    "components": [
                        { "type": 2, "style": 3, "label": "Large", "custom_id": "size;7-abc" },
                        { "type": 2, "style": 5, "label": "Menu", "url": "https://example.com/menu" },
                    ],
                }],
            })
        );
    }

    #[test]
    fn test_compile_select() {
        let schema: ReplySchema = EmbedReply::new(Panel::new("t", "d"))
            .row(vec![
                SelectSpec::new("Choose", "menu")
                    .option(SelectOption::new("A", "a").default_selected(true))
                    .option(SelectOption::new("B", "b").description("second"))
                    .values(1, 2)
                    .into(),
            ])
            .into();

        let payload = compile_message(&schema, Some(&token())).unwrap();
        let row = &payload.components.unwrap()[0];
        let interflow_core::Component::StringSelect(select) = &row.components[0] else {
            panic!("expected a select");
        };
        assert_eq!(select.custom_id, "menu;7-abc");
        assert_eq!(select.options[0].default, Some(true));
        assert_eq!(select.options[1].default, None);
        assert_eq!(select.max_values, Some(2));
    }

    #[test]
    fn test_compile_without_components_clears_them() {
        let schema: ReplySchema = EmbedReply::new(Panel::new("t", "d")).into();
        let payload = compile_message(&schema, None).unwrap();
        assert_eq!(payload.components, Some(Vec::new()));
        assert_eq!(payload.embeds.map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_compile_modal() {
        let schema: ReplySchema = ModalReply::new("feedback", "Feedback")
            .field(ModalField::new("comment", "Comment").length(1, 200))
            .into();

        let CompiledReply::Modal(modal) = compile(&schema, Some(&token())).unwrap() else {
            panic!("expected a modal");
        };
        assert_eq!(modal.custom_id, "feedback;7-abc");
        assert_eq!(modal.components.len(), 1);
        assert_eq!(modal.components[0].components[0].custom_id(), Some("comment"));
    }

    #[test]
    fn test_validate_rejects_reserved_separator() {
        let schema: ReplySchema = EmbedReply::new(Panel::new("t", "d"))
            .row(vec![ButtonSpec::new("Bad", "a;b").into()])
            .into();
        assert!(validate(&schema).is_err());
        assert!(validate(&ModalReply::new("ok", "t").into()).is_ok());
    }
}
