use std::collections::BTreeMap;

/// Handle identifying one subscribed listener.
/// Returned by [`Subscribers::subscribe`], consumed by [`Subscribers::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u64);

/// An ordered registry of callback listeners.
///
/// `F` is the unsized callback object type, e.g. `dyn FnMut(&Event)`.
/// Listeners run synchronously in subscription order: ids are handed out from
/// a counter and stored in a `BTreeMap`, so iteration order is id order.
pub struct Subscribers<F: ?Sized> {
    listeners: BTreeMap<u64, Box<F>>,
    /// next id to hand out
    next_id: u64,
}

impl<F: ?Sized> Subscribers<F> {
    pub fn new() -> Self {
        Self {
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Registers a listener and returns the handle to remove it again.
    /// Handles are never reused, not even after an unsubscribe.
    pub fn subscribe(&mut self, listener: Box<F>) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, listener);
        Subscription(id)
    }

    /// Removes a listener. Unsubscribing a handle twice is a no-op.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.remove(&subscription.0);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// The listeners in subscription order. Callers with a callback type this
    /// crate has no typed fan-out for (e.g. one borrowing a view with its own
    /// lifetime) invoke them through this.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<F>> {
        self.listeners.values_mut()
    }
}

impl<A: ?Sized> Subscribers<dyn FnMut(&A)> {
    /// Runs every listener with the provided argument, in subscription order.
    pub fn emit(&mut self, args: &A) {
        for listener in self.listeners.values_mut() {
            listener(args);
        }
    }
}

impl<A: ?Sized> Subscribers<dyn FnMut(&A) -> bool> {
    /// Runs listeners in subscription order, early-returning at the first
    /// `false`. Listeners after that one are not called.
    pub fn check(&mut self, args: &A) -> bool {
        self.listeners.values_mut().all(|listener| listener(args))
    }
}

impl<F: ?Sized> Default for Subscribers<F> {
    fn default() -> Self {
        Self::new()
    }
}
