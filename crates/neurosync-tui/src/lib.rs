//! neurosync-tui: Terminal UI components
//!
//! Widgets for the NEURAL_SYNC_X terminal client, built on ratatui and
//! crossterm. The event loop lives in the binary; this crate only draws.

pub mod input;
pub mod theme;
pub mod widgets;

pub use input::{Action, event_to_action, key_to_action};
pub use theme::Theme;
pub use widgets::{Bubble, InputBox, MessageList, Spinner};
