use crate::action::Action;
use crate::history::HistoryView;

/// A group of actions undone and redone as one history entry.
///
/// Lets a caller collapse several primitive actions (say "move" plus
/// "resize") into a single undo step.
pub struct CompositeAction {
    /// One should be careful of modifying this directly.
    pub actions: Vec<Box<dyn Action>>,
}

impl CompositeAction {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Appends a child action, taking ownership of it.
    pub fn add(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Action> {
        self.actions.iter().map(|action| action.as_ref())
    }
}

impl Action for CompositeAction {
    /// Children are undone newest-first, so effects layered on top of
    /// earlier ones come off before what they depend on.
    fn undo(&mut self, history: &HistoryView<'_>) {
        for action in self.actions.iter_mut().rev() {
            action.undo(history);
        }
    }

    fn redo(&mut self, history: &HistoryView<'_>) {
        for action in self.actions.iter_mut() {
            action.redo(history);
        }
    }

    /// An empty composite is undoable.
    fn can_undo(&self) -> bool {
        self.actions.iter().all(|action| action.can_undo())
    }

    fn as_composite(&self) -> Option<&CompositeAction> {
        Some(self)
    }
}

impl Default for CompositeAction {
    fn default() -> Self {
        Self::new()
    }
}
