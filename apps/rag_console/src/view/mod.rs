//! View layer: slots, pure renderers, the in-memory page and its assembly.

pub mod page;
pub mod render;
pub mod slots;
pub mod state;

pub use slots::{Html, Slot};
pub use state::{ViewChange, ViewState};
