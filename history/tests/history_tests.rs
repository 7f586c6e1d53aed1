use std::cell::Cell;
use std::rc::Rc;

use history::{Action, History, HistoryView};

/// Writes its payload into a shared cell whenever it is applied or
/// reverted, so tests can observe which action ran last.
struct Probe {
    x: i32,
    latest_redo: Rc<Cell<i32>>,
    latest_undo: Rc<Cell<i32>>,
}

impl Action for Probe {
    fn undo(&mut self, _history: &HistoryView<'_>) {
        self.latest_undo.set(self.x);
    }

    fn redo(&mut self, _history: &HistoryView<'_>) {
        self.latest_redo.set(self.x);
    }
}

struct Permanent;

impl Action for Permanent {
    fn undo(&mut self, _history: &HistoryView<'_>) {}
    fn redo(&mut self, _history: &HistoryView<'_>) {}
    fn can_undo(&self) -> bool {
        false
    }
}

struct Observer {
    latest_redo: Rc<Cell<i32>>,
    latest_undo: Rc<Cell<i32>>,
}

impl Observer {
    fn new() -> Self {
        Self {
            latest_redo: Rc::new(Cell::new(0)),
            latest_undo: Rc::new(Cell::new(0)),
        }
    }

    fn probe(&self, x: i32) -> Box<dyn Action> {
        Box::new(Probe {
            x,
            latest_redo: Rc::clone(&self.latest_redo),
            latest_undo: Rc::clone(&self.latest_undo),
        })
    }
}

#[test]
fn empty_history_has_nothing_to_do() {
    let mut history = History::new();
    assert_eq!(history.position(), 0);
    assert_eq!(history.len(), 0);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo(), None);
    assert_eq!(history.redo(), None);
    assert_eq!(history.position(), 0);
}

/// The full session: three commits, undo all the way down, redo all the way
/// up, one mixed round, then a commit that overwrites undone actions.
#[test]
fn commit_undo_redo_walkthrough() {
    let observer = Observer::new();
    let mut history = History::new();

    for x in 1..=3 {
        history.commit(observer.probe(x));
        assert_eq!(history.position(), x as usize);
        assert_eq!(history.len(), x as usize);
        assert_eq!(observer.latest_redo.get(), x);
        assert_eq!(observer.latest_undo.get(), 0);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    // undo 3, 2, 1
    for x in (1..=3).rev() {
        assert_eq!(history.undo(), Some(()));
        assert_eq!(history.position(), (x - 1) as usize);
        assert_eq!(history.len(), 3);
        assert_eq!(observer.latest_undo.get(), x);
        assert!(history.can_redo());
    }
    assert!(!history.can_undo());
    assert_eq!(observer.latest_redo.get(), 3);

    // redo 1, 2, 3
    for x in 1..=3 {
        assert_eq!(history.redo(), Some(()));
        assert_eq!(history.position(), x as usize);
        assert_eq!(history.len(), 3);
        assert_eq!(observer.latest_redo.get(), x);
        assert!(history.can_undo());
    }
    assert!(!history.can_redo());
    assert_eq!(observer.latest_undo.get(), 1);

    // one step back, one step forward
    history.undo();
    assert_eq!(history.position(), 2);
    assert_eq!(observer.latest_undo.get(), 3);
    history.redo();
    assert_eq!(history.position(), 3);
    assert_eq!(observer.latest_redo.get(), 3);
    assert!(!history.can_redo());

    // a commit mid-history drops the undone tail
    history.undo();
    history.undo();
    history.commit(observer.probe(4));
    assert_eq!(history.position(), 2);
    assert_eq!(history.len(), 2);
    assert_eq!(observer.latest_redo.get(), 4);
    assert_eq!(observer.latest_undo.get(), 2);
    assert!(history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn commit_after_undo_discards_future() {
    let observer = Observer::new();
    let mut history = History::new();
    for x in 1..=3 {
        history.commit(observer.probe(x));
    }

    history.undo();
    history.undo();
    let position_before = history.position();
    history.commit(observer.probe(9));

    assert_eq!(history.len(), position_before + 1);
    assert_eq!(history.len(), 2);
    assert_eq!(observer.latest_redo.get(), 9);
    assert!(!history.can_redo());
}

#[test]
fn explicit_clear_future_drops_undone_actions() {
    let observer = Observer::new();
    let mut history = History::new();
    for x in 1..=3 {
        history.commit(observer.probe(x));
    }
    history.undo();
    history.undo();
    assert_eq!(history.len(), 3);

    history.clear_future();
    assert_eq!(history.len(), 1);
    assert_eq!(history.position(), 1);
    assert!(!history.can_redo());
    assert!(history.can_undo());
}

#[test]
fn permanent_action_blocks_undo() {
    let observer = Observer::new();
    let mut history = History::new();
    history.commit(observer.probe(1));
    history.commit(Box::new(Permanent));

    assert_eq!(history.position(), 2);
    assert!(!history.can_undo());
    assert_eq!(history.undo(), None);
    assert_eq!(history.position(), 2);
}

#[test]
fn queries_do_not_mutate() {
    let observer = Observer::new();
    let mut history = History::new();
    history.commit(observer.probe(1));
    history.undo();

    for _ in 0..3 {
        assert!(!history.can_undo());
        assert!(history.can_redo());
        assert_eq!(history.position(), 0);
        assert_eq!(history.len(), 1);
    }
}

/// The cursor moves before the callback runs, so actions observe the
/// post-transition position.
#[test]
fn callbacks_see_post_transition_position() {
    struct PositionProbe {
        seen_on_undo: Rc<Cell<usize>>,
        seen_on_redo: Rc<Cell<usize>>,
    }

    impl Action for PositionProbe {
        fn undo(&mut self, history: &HistoryView<'_>) {
            self.seen_on_undo.set(history.position());
        }

        fn redo(&mut self, history: &HistoryView<'_>) {
            self.seen_on_redo.set(history.position());
        }
    }

    let seen_on_undo = Rc::new(Cell::new(usize::MAX));
    let seen_on_redo = Rc::new(Cell::new(usize::MAX));
    let observer = Observer::new();

    let mut history = History::new();
    history.commit(observer.probe(1));
    history.commit(Box::new(PositionProbe {
        seen_on_undo: Rc::clone(&seen_on_undo),
        seen_on_redo: Rc::clone(&seen_on_redo),
    }));
    assert_eq!(seen_on_redo.get(), 2);

    history.undo();
    assert_eq!(seen_on_undo.get(), 1);

    history.redo();
    assert_eq!(seen_on_redo.get(), 2);
}

#[test]
fn commit_subscribers_observe_every_commit() {
    let commits = Rc::new(Cell::new(0));
    let undoable = Rc::new(Cell::new(true));

    let mut history = History::new();
    let seen = Rc::clone(&commits);
    let seen_undoable = Rc::clone(&undoable);
    history.on_commit(move |action| {
        seen.set(seen.get() + 1);
        seen_undoable.set(action.can_undo());
    });

    let observer = Observer::new();
    history.commit(observer.probe(1));
    assert_eq!(commits.get(), 1);
    assert!(undoable.get());

    history.commit(Box::new(Permanent));
    assert_eq!(commits.get(), 2);
    assert!(!undoable.get());
}

#[test]
fn future_cleared_fires_on_every_commit_and_clear() {
    let fired = Rc::new(Cell::new(0));

    let mut history = History::new();
    let seen = Rc::clone(&fired);
    let subscription = history.on_future_cleared(move |_| seen.set(seen.get() + 1));

    let observer = Observer::new();
    history.commit(observer.probe(1));
    // fires even with no future to remove
    assert_eq!(fired.get(), 1);

    history.clear_future();
    assert_eq!(fired.get(), 2);

    history.unsubscribe_future_cleared(subscription);
    history.commit(observer.probe(2));
    assert_eq!(fired.get(), 2);
}

#[test]
fn future_cleared_subscribers_see_truncated_state() {
    let seen_len = Rc::new(Cell::new(usize::MAX));
    let seen_position = Rc::new(Cell::new(usize::MAX));

    let mut history = History::new();
    let observer = Observer::new();
    for x in 1..=3 {
        history.commit(observer.probe(x));
    }
    history.undo();
    history.undo();

    let len = Rc::clone(&seen_len);
    let position = Rc::clone(&seen_position);
    history.on_future_cleared(move |view| {
        len.set(view.len());
        position.set(view.position());
    });

    history.clear_future();
    assert_eq!(seen_len.get(), 1);
    assert_eq!(seen_position.get(), 1);
}

#[test]
fn traversal_partitions_at_the_cursor() {
    let observer = Observer::new();
    let mut history = History::new();
    for x in 1..=4 {
        history.commit(observer.probe(x));
    }
    history.undo();

    assert_eq!(history.iter().count(), 4);
    assert_eq!(history.iter_past().count(), 3);
    assert_eq!(history.iter_future().count(), 1);

    // restartable
    assert_eq!(history.iter_past().count(), 3);
}
