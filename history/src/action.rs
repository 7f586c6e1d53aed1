use crate::composite::CompositeAction;
use crate::history::HistoryView;
use crate::link::LinkTag;

/// A reversible unit of change.
///
/// `redo` applies the effect; it is called once when the action is committed
/// and again on every replay. `undo` reverts the effect of the most recent
/// `redo`. The [`History`](crate::History) guarantees the two are only ever
/// called in that alternating order, so implementations do not need to guard
/// against an undo of something that was never done.
///
/// Both callbacks receive a [`HistoryView`]: the cursor has already moved
/// when they run, so querying the view gives the post-transition position.
/// Most actions ignore it.
pub trait Action {
    /// Called whenever the action is undone.
    fn undo(&mut self, history: &HistoryView<'_>);

    /// Called whenever the action is redone,
    /// as well as the first time it is 'done'.
    fn redo(&mut self, history: &HistoryView<'_>);

    /// Returns whether this action can be undone.
    /// Some actions are permanent, and so thus can't be undone whatsoever.
    fn can_undo(&self) -> bool {
        true
    }

    /// The composite this action unrolls into during traversal, if it is one.
    fn as_composite(&self) -> Option<&CompositeAction> {
        None
    }

    /// The (owner, index) tag of a proxy action pushed by a
    /// [`HistoryLink`](crate::HistoryLink). `None` for everything else.
    fn link_tag(&self) -> Option<LinkTag> {
        None
    }
}
