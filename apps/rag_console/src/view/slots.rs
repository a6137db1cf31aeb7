//! Named page regions and the HTML fragments installed into them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    SystemInfo,
    WorldBankInfo,
    DocumentList,
    UploadStatus,
    UpdateStatus,
    CountryOptions,
    IndicatorOptions,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::SystemInfo,
        Slot::WorldBankInfo,
        Slot::DocumentList,
        Slot::UploadStatus,
        Slot::UpdateStatus,
        Slot::CountryOptions,
        Slot::IndicatorOptions,
    ];

    /// Element id of the slot in the assembled page.
    pub fn id(self) -> &'static str {
        match self {
            Slot::SystemInfo => "system-info",
            Slot::WorldBankInfo => "worldbank-info",
            Slot::DocumentList => "document-list",
            Slot::UploadStatus => "upload-status",
            Slot::UpdateStatus => "update-status",
            Slot::CountryOptions => "country-options",
            Slot::IndicatorOptions => "indicator-options",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Rendered markup. Only renderers build it, so interpolated text is
/// escaped exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    pub(crate) fn from_markup(markup: String) -> Self {
        Self(markup)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
