//! Declarative reply schemas.
//!
//! ```rust,ignore
//! use interflow_framework::reply::*;
//!
//! let reply = EmbedReply::new(Panel::new("Order", "Pick a size"))
//!     .row(vec![
//!         ButtonSpec::new("Small", "order:size").style(ActionStyle::Secondary).into(),
//!         ButtonSpec::new("Large", "order:size").into(),
//!         LinkButtonSpec::new("Menu", "https://example.com/menu").into(),
//!     ]);
//! ctx.reply(reply).await?;
//! ```

use interflow_core::{PartialEmoji, TextInputStyle};

/// A declarative reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplySchema {
    /// Content with a single panel.
    Embed(EmbedReply),
    /// Content with several panels.
    MultiEmbed(MultiEmbedReply),
    /// A modal form.
    Modal(ModalReply),
}

impl ReplySchema {
    /// Returns `true` for modal schemas.
    pub fn is_modal(&self) -> bool {
        matches!(self, Self::Modal(_))
    }

    /// Returns the component rows of a message schema.
    pub fn component_rows(&self) -> &[Vec<Component>] {
        match self {
            Self::Embed(embed) => &embed.components,
            Self::MultiEmbed(multi) => &multi.components,
            Self::Modal(_) => &[],
        }
    }
}

impl From<EmbedReply> for ReplySchema {
    fn from(reply: EmbedReply) -> Self {
        Self::Embed(reply)
    }
}

impl From<MultiEmbedReply> for ReplySchema {
    fn from(reply: MultiEmbedReply) -> Self {
        Self::MultiEmbed(reply)
    }
}

impl From<ModalReply> for ReplySchema {
    fn from(reply: ModalReply) -> Self {
        Self::Modal(reply)
    }
}

// ============================================================================
// Panels
// ============================================================================

/// A visual panel (an embed on the wire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub description: String,
    pub color: Option<u32>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    pub footer: Option<Footer>,
}

impl Panel {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color: None,
            thumbnail: None,
            image: None,
            footer: None,
        }
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn footer(mut self, footer: Footer) -> Self {
        self.footer = Some(footer);
        self
    }
}

/// The footer of a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub text: String,
    pub icon_url: Option<String>,
}

impl Footer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon_url: None,
        }
    }

    pub fn icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }
}

/// A reply with one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedReply {
    pub content: Option<String>,
    pub panel: Panel,
    pub components: Vec<Vec<Component>>,
}

impl EmbedReply {
    pub fn new(panel: Panel) -> Self {
        Self {
            content: None,
            panel,
            components: Vec::new(),
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Appends a row of components.
    pub fn row(mut self, components: Vec<Component>) -> Self {
        self.components.push(components);
        self
    }
}

/// A reply with several panels.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiEmbedReply {
    pub content: Option<String>,
    pub panels: Vec<Panel>,
    pub components: Vec<Vec<Component>>,
}

impl MultiEmbedReply {
    pub fn new(panels: Vec<Panel>) -> Self {
        Self {
            content: None,
            panels,
            components: Vec::new(),
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Appends a row of components.
    pub fn row(mut self, components: Vec<Component>) -> Self {
        self.components.push(components);
        self
    }
}

// ============================================================================
// Components
// ============================================================================

/// An interactive component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// A button that continues the flow at `next`.
    Button(ButtonSpec),
    /// A button that opens an external URL.
    Link(LinkButtonSpec),
    /// A string select menu that continues the flow at `next`.
    Select(SelectSpec),
}

impl Component {
    /// Returns the route this component continues at, if it is a continuation.
    pub fn next(&self) -> Option<&str> {
        match self {
            Self::Button(button) => Some(&button.next),
            Self::Select(select) => Some(&select.next),
            Self::Link(_) => None,
        }
    }
}

impl From<ButtonSpec> for Component {
    fn from(spec: ButtonSpec) -> Self {
        Self::Button(spec)
    }
}

impl From<LinkButtonSpec> for Component {
    fn from(spec: LinkButtonSpec) -> Self {
        Self::Link(spec)
    }
}

impl From<SelectSpec> for Component {
    fn from(spec: SelectSpec) -> Self {
        Self::Select(spec)
    }
}

/// Styles available to continuation buttons. The link style is reserved for
/// [`LinkButtonSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionStyle {
    #[default]
    Primary,
    Secondary,
    Success,
    Danger,
}

impl From<ActionStyle> for interflow_core::ButtonStyle {
    fn from(style: ActionStyle) -> Self {
        match style {
            ActionStyle::Primary => Self::Primary,
            ActionStyle::Secondary => Self::Secondary,
            ActionStyle::Success => Self::Success,
            ActionStyle::Danger => Self::Danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    pub label: String,
    pub next: String,
    pub style: ActionStyle,
    pub emoji: Option<PartialEmoji>,
    pub disabled: bool,
}

impl ButtonSpec {
    pub fn new(label: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            next: next.into(),
            style: ActionStyle::default(),
            emoji: None,
            disabled: false,
        }
    }

    pub fn style(mut self, style: ActionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn emoji(mut self, emoji: PartialEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkButtonSpec {
    pub label: String,
    pub url: String,
    pub emoji: Option<PartialEmoji>,
    pub disabled: bool,
}

impl LinkButtonSpec {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            emoji: None,
            disabled: false,
        }
    }

    pub fn emoji(mut self, emoji: PartialEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectSpec {
    pub placeholder: String,
    pub next: String,
    pub options: Vec<SelectOption>,
    pub min_values: Option<u8>,
    pub max_values: Option<u8>,
}

impl SelectSpec {
    pub fn new(placeholder: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            next: next.into(),
            options: Vec::new(),
            min_values: None,
            max_values: None,
        }
    }

    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    /// Allows choosing between `min` and `max` values.
    pub fn values(mut self, min: u8, max: u8) -> Self {
        self.min_values = Some(min);
        self.max_values = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
    pub emoji: Option<PartialEmoji>,
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            default: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn emoji(mut self, emoji: PartialEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn default_selected(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

// ============================================================================
// Modal
// ============================================================================

/// A modal form. Its submission continues the flow at `next`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalReply {
    pub next: String,
    pub title: String,
    pub fields: Vec<ModalField>,
}

impl ModalReply {
    pub fn new(next: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            next: next.into(),
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: ModalField) -> Self {
        self.fields.push(field);
        self
    }
}

/// One text input of a modal. `name` becomes the input's custom id.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalField {
    pub name: String,
    pub label: String,
    pub style: TextInputStyle,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    /// Prefilled value.
    pub value: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
}

impl ModalField {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            style: TextInputStyle::Short,
            min_length: None,
            max_length: None,
            value: None,
            placeholder: None,
            required: None,
        }
    }

    pub fn style(mut self, style: TextInputStyle) -> Self {
        self.style = style;
        self
    }

    pub fn length(mut self, min: u16, max: u16) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}
