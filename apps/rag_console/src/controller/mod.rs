//! Controller layer: form events, orchestrators, form wiring and the command
//! queue feeding the backend worker.

pub mod dispatch;
pub mod events;
pub mod orchestration;
pub mod wiring;
