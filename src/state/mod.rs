//! Per-update output: the selector's `DisplayState` and the `ExtensionData`
//! contract published to the host.

pub mod display;

pub use crate::core::event::NextEvent;
pub use display::{DisplayState, ExtensionData};
