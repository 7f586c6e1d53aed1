pub mod action;
pub mod composite;
pub mod history;
pub mod link;

pub use crate::action::Action;
pub use crate::composite::CompositeAction;
pub use crate::history::{History, HistoryView};
pub use crate::link::{HistoryLink, LinkId, LinkTag};
