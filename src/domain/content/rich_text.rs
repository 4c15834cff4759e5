//! Inline text runs with independent style annotations.

use serde::{Deserialize, Serialize};

/// Ordered spans forming one rich text value.
pub type RichText = Vec<RichTextSpan>;

/// Style flags applied to a span. Each flag is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
}

impl Annotations {
    /// Returns true when no annotation is set.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// What a span contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanContent {
    /// Literal text.
    Text(String),
    /// Inline math expression, without delimiters.
    Equation(String),
    /// Reference to another object; carries the display text supplied by the
    /// content service.
    Mention { plain_text: String },
}

/// One inline text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextSpan {
    pub content: SpanContent,
    pub annotations: Annotations,
    pub link: Option<String>,
}

impl RichTextSpan {
    /// Creates an unstyled text span.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: SpanContent::Text(content.into()),
            annotations: Annotations::default(),
            link: None,
        }
    }

    /// Creates an inline equation span.
    pub fn equation(expression: impl Into<String>) -> Self {
        Self {
            content: SpanContent::Equation(expression.into()),
            annotations: Annotations::default(),
            link: None,
        }
    }

    /// Creates a mention span showing the given display text.
    pub fn mention(plain_text: impl Into<String>) -> Self {
        Self {
            content: SpanContent::Mention {
                plain_text: plain_text.into(),
            },
            annotations: Annotations::default(),
            link: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.annotations.strikethrough = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.annotations.underline = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.annotations.code = true;
        self
    }

    /// Attaches a link target.
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }

    /// Returns the unstyled text of this span.
    pub fn plain_text(&self) -> String {
        match &self.content {
            SpanContent::Text(text) => text.clone(),
            SpanContent::Equation(expression) => expression.clone(),
            SpanContent::Mention { plain_text } => plain_text.clone(),
        }
    }
}

/// Concatenates the unstyled text of every span.
pub fn plain_text_of(spans: &[RichTextSpan]) -> String {
    spans.iter().map(RichTextSpan::plain_text).collect()
}
