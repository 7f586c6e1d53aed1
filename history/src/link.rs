use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::history::{History, HistoryView};
use events::Subscription;

/// Identity of a [`HistoryLink`], unique for the lifetime of the process.
/// Proxy actions carry it so a link can tell its own proxies apart from
/// those of other links sharing the same history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId(u64);

impl LinkId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        LinkId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The tag a proxy action is created with: which link owns it, and which
/// value index it stands for. Immutable once the proxy is committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTag {
    pub link: LinkId,
    pub index: usize,
}

/// A list of caller-owned values whose cursor follows the history's cursor.
///
/// Every value pushed through the link gets a lightweight proxy action
/// committed into the shared [`History`]. Undoing or redoing past a proxy
/// moves this link's own cursor, and truncating the history truncates the
/// matching values, so the 'present' slice of the value list always agrees
/// with the 'present' state of the history. Unrelated actions committed
/// between the proxies are ignored, as are proxies of other links.
pub struct HistoryLink<T> {
    id: LinkId,
    core: Rc<RefCell<LinkCore<T>>>,
    subscription: Subscription,
}

impl<T: 'static> HistoryLink<T> {
    /// Binds a new, empty link to the history.
    pub fn new(history: &mut History) -> Self {
        let id = LinkId::next();
        let core = Rc::new(RefCell::new(LinkCore {
            values: Vec::new(),
            position: 0,
        }));

        let weak = Rc::downgrade(&core);
        let subscription = history.on_future_cleared(move |view| {
            // The link may be gone while its subscription is still
            // registered. Nothing to track then.
            if let Some(core) = weak.upgrade() {
                let mut core = core.borrow_mut();
                core.resync(id, view);
                core.clear_future();
            }
        });

        Self {
            id,
            core,
            subscription,
        }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Records a value as the next undoable step: truncates this link's own
    /// future, commits a proxy action tagged with the value's index into the
    /// history, then appends the value and moves the cursor to the end.
    pub fn push(&mut self, history: &mut History, value: T) {
        let index = {
            let mut core = self.core.borrow_mut();
            core.clear_future();
            core.values.len()
        };

        let proxy = LinkAction {
            core: Rc::downgrade(&self.core),
            tag: LinkTag {
                link: self.id,
                index,
            },
        };
        // The commit fires the future-cleared notification, which makes
        // this link resync once more than strictly needed.
        history.commit(Box::new(proxy));

        let mut core = self.core.borrow_mut();
        core.values.push(value);
        core.position = core.values.len();
        log::debug!("link {:?}: pushed value {}", self.id, index);
    }

    /// Throws away the values after the current position. Leaves the
    /// history alone.
    pub fn clear_future(&mut self) {
        self.core.borrow_mut().clear_future();
    }

    /// The cursor into the value list. Mirrors the history's cursor,
    /// restricted to this link's entries.
    pub fn position(&self) -> usize {
        self.core.borrow().position
    }

    pub fn len(&self) -> usize {
        self.core.borrow().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.borrow().values.is_empty()
    }

    /// All values in push order. The guard borrows the link's shared state,
    /// so drop it before handing control back to the history.
    pub fn values(&self) -> Ref<'_, [T]> {
        Ref::map(self.core.borrow(), |core| core.values.as_slice())
    }

    /// The values at indices below the cursor.
    pub fn past(&self) -> Ref<'_, [T]> {
        Ref::map(self.core.borrow(), |core| &core.values[..core.position])
    }

    /// The values at indices at or above the cursor.
    pub fn future(&self) -> Ref<'_, [T]> {
        Ref::map(self.core.borrow(), |core| &core.values[core.position..])
    }

    /// Detaches the link from the history. Proxy actions already committed
    /// stay in the history; their callbacks become no-ops.
    pub fn unlink(self, history: &mut History) {
        history.unsubscribe_future_cleared(self.subscription);
    }
}

struct LinkCore<T> {
    values: Vec<T>,
    /// Mirrors [`History::position`], counting only this link's entries.
    position: usize,
}

impl<T> LinkCore<T> {
    fn clear_future(&mut self) {
        self.values.truncate(self.position);
    }

    /// Recovers the cursor from the history alone: walk the past region
    /// backward and stop at the first proxy belonging to this link. Its tag
    /// tells how many of this link's values are currently applied. No proxy
    /// in the past means none are.
    fn resync(&mut self, id: LinkId, history: &HistoryView<'_>) {
        for action in history.actions().rev() {
            if let Some(tag) = action.link_tag() {
                if tag.link == id {
                    self.position = tag.index + 1;
                    log::trace!("link {:?}: resynced to {}", id, self.position);
                    return;
                }
            }
        }
        self.position = 0;
        log::trace!("link {:?}: resynced to 0", id);
    }
}

/// The proxy committed into the history for each pushed value. Holds its
/// slot in the action sequence and moves the owning link's cursor as the
/// history's cursor crosses it.
struct LinkAction<T> {
    core: Weak<RefCell<LinkCore<T>>>,
    tag: LinkTag,
}

impl<T: 'static> Action for LinkAction<T> {
    /// Crossing backward over the proxy: where the link's cursor lands
    /// depends on which of its proxies remain applied, so do a full resync.
    fn undo(&mut self, history: &HistoryView<'_>) {
        if let Some(core) = self.core.upgrade() {
            core.borrow_mut().resync(self.tag.link, history);
        }
    }

    /// Crossing forward over the proxy: the value it stands for is applied
    /// again, so the cursor sits right after it.
    fn redo(&mut self, _history: &HistoryView<'_>) {
        if let Some(core) = self.core.upgrade() {
            core.borrow_mut().position = self.tag.index + 1;
        }
    }

    fn link_tag(&self) -> Option<LinkTag> {
        Some(self.tag)
    }
}
