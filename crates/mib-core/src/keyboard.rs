//! Messenger-neutral inline keyboards.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Grid of buttons, row by row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    pub fn row(mut self, row: Vec<InlineButton>) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// Text plus optional keyboard, ready to send as HTML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub html: String,
    pub keyboard: Option<InlineKeyboard>,
}

impl Reply {
    pub fn text(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(html: impl Into<String>, keyboard: InlineKeyboard) -> Self {
        Self {
            html: html.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Label with a leading check mark when `on`.
pub fn checked(label: &str, on: bool) -> String {
    if on {
        format!("✅ {label}")
    } else {
        label.to_string()
    }
}

/// Label with an on/off marker.
pub fn toggled(label: &str, on: bool) -> String {
    format!("{} {label}", if on { "🟢" } else { "⚪" })
}
