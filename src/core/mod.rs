//! Day-event selection: which solar event comes next and whether to show it.

pub mod event;
pub mod selector;

pub use event::NextEvent;
pub use selector::{SelectorOptions, compute_display_state};
