//! Bridge between the front end and the backend worker thread.

pub mod commands;
pub mod runtime;
