//! In-memory page: slot contents and the chat log.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;
use shared::domain::ChatMessage;
use tracing::{debug, warn};

use crate::controller::events::UiEvent;

use super::{
    render,
    slots::{Html, Slot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub id: EntryId,
    pub message: ChatMessage,
    pub at: DateTime<Utc>,
}

/// One observable change. Streamed to the front end when a sink is attached,
/// otherwise journaled until `take_changes`.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Slot {
        slot: Slot,
        html: Html,
    },
    ChatAppended {
        id: EntryId,
        at: DateTime<Utc>,
        html: Html,
    },
    ChatRemoved { id: EntryId },
    Alert(String),
}

pub struct ViewState {
    mounted: BTreeSet<Slot>,
    slots: BTreeMap<Slot, Html>,
    phases: HashMap<Slot, SlotPhase>,
    chat: Vec<ChatEntry>,
    next_entry: u64,
    changes: Vec<ViewChange>,
    sink: Option<Sender<UiEvent>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_slots(Slot::ALL)
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page that only mounts `slots`; writes to any other slot are dropped.
    pub fn with_slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            mounted: slots.into_iter().collect(),
            slots: BTreeMap::new(),
            phases: HashMap::new(),
            chat: Vec::new(),
            next_entry: 0,
            changes: Vec::new(),
            sink: None,
        }
    }

    /// Forwards every later change to the front end as it happens.
    pub fn attach(&mut self, ui_tx: Sender<UiEvent>) {
        self.sink = Some(ui_tx);
    }

    fn record(&mut self, change: ViewChange) {
        match &self.sink {
            Some(ui_tx) => {
                if ui_tx.send(UiEvent::View(change)).is_err() {
                    debug!("front end disconnected; dropping view change");
                }
            }
            None => self.changes.push(change),
        }
    }

    pub fn is_mounted(&self, slot: Slot) -> bool {
        self.mounted.contains(&slot)
    }

    /// Replaces the slot content wholesale.
    pub fn install(&mut self, slot: Slot, html: Html) {
        if !self.is_mounted(slot) {
            warn!(slot = slot.id(), "slot is not mounted; dropping render");
            return;
        }
        self.slots.insert(slot, html.clone());
        self.record(ViewChange::Slot { slot, html });
    }

    /// Moves the slot into `Loading` and shows the loading indicator.
    pub fn begin_loading(&mut self, slot: Slot, label: &str) {
        if self.phase(slot) == SlotPhase::Loading {
            debug!(
                slot = slot.id(),
                "slot already loading; the later response will overwrite the earlier one"
            );
        }
        self.phases.insert(slot, SlotPhase::Loading);
        self.install(slot, render::loading(label));
    }

    pub fn finish(&mut self, slot: Slot, html: Html, succeeded: bool) {
        let phase = if succeeded {
            SlotPhase::Ready
        } else {
            SlotPhase::Failed
        };
        self.phases.insert(slot, phase);
        self.install(slot, html);
    }

    pub fn phase(&self, slot: Slot) -> SlotPhase {
        self.phases.get(&slot).copied().unwrap_or_default()
    }

    pub fn slot(&self, slot: Slot) -> Option<&Html> {
        self.slots.get(&slot)
    }

    pub fn push_chat(&mut self, message: ChatMessage) -> EntryId {
        let id = EntryId(self.next_entry);
        self.next_entry += 1;
        let html = render::chat_message(&message);
        let at = Utc::now();
        self.chat.push(ChatEntry { id, message, at });
        self.record(ViewChange::ChatAppended { id, at, html });
        id
    }

    pub fn remove_chat(&mut self, id: EntryId) -> bool {
        let before = self.chat.len();
        self.chat.retain(|entry| entry.id != id);
        let removed = self.chat.len() != before;
        if removed {
            self.record(ViewChange::ChatRemoved { id });
        }
        removed
    }

    pub fn chat(&self) -> &[ChatEntry] {
        &self.chat
    }

    pub fn alert(&mut self, text: impl Into<String>) {
        self.record(ViewChange::Alert(text.into()));
    }

    pub fn take_changes(&mut self) -> Vec<ViewChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.phases.clear();
        self.chat.clear();
        self.changes.clear();
    }
}
