use std::fmt::Write as _;

use chrono::SecondsFormat;

use super::{
    render,
    slots::{Html, Slot},
    state::ViewState,
};

const CHAT_SLOT_ID: &str = "chat-history";

/// Assembles the whole page from the current view state.
pub fn render_document(view: &ViewState, title: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n",
        super::slots::escape(title)
    );

    for slot in Slot::ALL {
        if !view.is_mounted(slot) {
            continue;
        }
        let body = view.slot(slot).map(Html::as_str).unwrap_or_default();
        let tag = if slot == Slot::DocumentList { "ul" } else { "div" };
        let _ = writeln!(out, "<{tag} id=\"{}\">{body}</{tag}>", slot.id());
    }

    let _ = write!(out, "<div id=\"{CHAT_SLOT_ID}\">");
    for entry in view.chat() {
        let _ = write!(
            out,
            "<div class=\"chat-entry\" data-at=\"{}\">{}</div>",
            entry.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            render::chat_message(&entry.message)
        );
    }
    out.push_str("</div>\n</body>\n</html>\n");
    out
}

pub fn chat_slot_id() -> &'static str {
    CHAT_SLOT_ID
}
