use events::{Subscribers, Subscription};

use crate::action::Action;

/// The linear undo/redo stack.
///
/// Owns every committed action. The `position` cursor splits the sequence:
/// any action at an index `< position` is 'past' (currently applied), any
/// action at an index `>= position` is 'future' (undone, kept around until a
/// new commit overwrites it). `position == actions.len()` when there is no
/// future, `position == 0` when there is no past.
pub struct History {
    actions: Vec<Box<dyn Action>>,
    position: usize,
    /// Called after the future has been cleared.
    future_cleared: Subscribers<dyn FnMut(&HistoryView)>,
    /// Called with the incoming action just before a commit takes ownership
    /// of it. Observation only.
    committing: Subscribers<dyn FnMut(&dyn Action)>,
}

impl History {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            position: 0,
            future_cleared: Subscribers::new(),
            committing: Subscribers::new(),
        }
    }

    /// The cursor. Everything below it is applied, everything at or above it
    /// is undone.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Notifies the commit subscribers, throws away everything after the
    /// current position, then appends the action and applies it via
    /// [`Action::redo`]. The only way an action enters the history.
    pub fn commit(&mut self, action: Box<dyn Action>) {
        let incoming = action.as_ref();
        for listener in self.committing.iter_mut() {
            listener(incoming);
        }

        self.clear_future();
        self.actions.push(action);
        log::debug!(
            "commit: action {} of {}",
            self.position + 1,
            self.actions.len()
        );
        self.redo();
    }

    /// Throws away everything after the current position, then notifies the
    /// future-cleared subscribers. Subscribers are notified even when there
    /// was no future to remove.
    pub fn clear_future(&mut self) {
        let removed = self.actions.len() - self.position;
        self.actions.truncate(self.position);
        if removed > 0 {
            log::debug!("clear_future: dropped {} undone actions", removed);
        }

        let Self {
            actions,
            position,
            future_cleared,
            ..
        } = self;
        let view = HistoryView::new(actions, *position);
        for listener in future_cleared.iter_mut() {
            listener(&view);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0 && self.actions[self.position - 1].can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.actions.len()
    }

    /// Undoes the action right before the cursor. Returns `None` without
    /// doing anything when there is nothing to undo.
    ///
    /// The action is undone *after* the cursor has moved, so the view it
    /// receives already reflects the new position.
    pub fn undo(&mut self) -> Option<()> {
        if !self.can_undo() {
            return None;
        }

        self.position -= 1;
        log::trace!("undo: position -> {}", self.position);
        let (past, rest) = self.actions.split_at_mut(self.position);
        let view = HistoryView::new(past, self.position);
        rest[0].undo(&view);
        Some(())
    }

    /// Redoes the action right after the cursor. Returns `None` without
    /// doing anything when there is nothing to redo.
    ///
    /// The action is redone *after* the cursor has moved.
    pub fn redo(&mut self) -> Option<()> {
        if !self.can_redo() {
            return None;
        }

        self.position += 1;
        log::trace!("redo: position -> {}", self.position);
        let (preceding, rest) = self.actions.split_at_mut(self.position - 1);
        let view = HistoryView::new(preceding, self.position);
        rest[0].redo(&view);
        Some(())
    }

    /// All actions in commit order, with composites unrolled into their
    /// children. The unrolling goes one level deep: a composite nested
    /// inside another composite is yielded as-is.
    pub fn iter(&self) -> UnrolledActions<'_> {
        UnrolledActions::new(&self.actions)
    }

    /// The applied part of [`History::iter`].
    pub fn iter_past(&self) -> UnrolledActions<'_> {
        UnrolledActions::new(&self.actions[..self.position])
    }

    /// The undone part of [`History::iter`].
    pub fn iter_future(&self) -> UnrolledActions<'_> {
        UnrolledActions::new(&self.actions[self.position..])
    }

    /// Subscribes to the channel fired after every future-clear, with the
    /// post-truncation state of the history.
    pub fn on_future_cleared(
        &mut self,
        listener: impl FnMut(&HistoryView<'_>) + 'static,
    ) -> Subscription {
        self.future_cleared.subscribe(Box::new(listener))
    }

    pub fn unsubscribe_future_cleared(&mut self, subscription: Subscription) {
        self.future_cleared.unsubscribe(subscription);
    }

    /// Subscribes to the channel fired with every action about to be
    /// committed, before the history owns it. Subscribers observe; they can
    /// neither veto the commit nor swap out the action.
    pub fn on_commit(&mut self, listener: impl FnMut(&dyn Action) + 'static) -> Subscription {
        self.committing.subscribe(Box::new(listener))
    }

    pub fn unsubscribe_commit(&mut self, subscription: Subscription) {
        self.committing.unsubscribe(subscription);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only snapshot of the history handed to action callbacks and
/// future-cleared subscribers.
///
/// `position` is the cursor value after the transition that triggered the
/// call. `actions` holds the actions preceding the one currently running:
/// during an undo and after a future-clear that is exactly the past region.
pub struct HistoryView<'a> {
    actions: &'a [Box<dyn Action>],
    position: usize,
}

impl<'a> HistoryView<'a> {
    pub(crate) fn new(actions: &'a [Box<dyn Action>], position: usize) -> Self {
        Self { actions, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The visible actions in commit order, without unrolling composites.
    pub fn actions(&self) -> impl DoubleEndedIterator<Item = &dyn Action> {
        self.actions.iter().map(|action| action.as_ref())
    }
}

/// Lazy traversal over a run of actions, expanding each composite into its
/// children. Restartable by asking the [`History`] for a fresh one.
pub struct UnrolledActions<'a> {
    outer: std::slice::Iter<'a, Box<dyn Action>>,
    children: Option<std::slice::Iter<'a, Box<dyn Action>>>,
}

impl<'a> UnrolledActions<'a> {
    fn new(actions: &'a [Box<dyn Action>]) -> Self {
        Self {
            outer: actions.iter(),
            children: None,
        }
    }
}

impl<'a> Iterator for UnrolledActions<'a> {
    type Item = &'a dyn Action;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(children) = &mut self.children {
                match children.next() {
                    Some(child) => return Some(child.as_ref()),
                    None => self.children = None,
                }
            }

            let action = self.outer.next()?;
            match action.as_composite() {
                Some(composite) => self.children = Some(composite.actions.iter()),
                None => return Some(action.as_ref()),
            }
        }
    }
}
