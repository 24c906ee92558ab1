use crate::error::RasterError;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A user callback with its metadata already bound.
pub type BoxedCallback = Box<dyn FnOnce(&[u8], RasterError)>;

/// Correlation token identifying one pending [`CallbackHandle`].
///
/// Tokens increase monotonically and are never reused by a registry, so a
/// stale token can't resolve to another request's handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

impl Token {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Counters {
    created: Cell<u64>,
    invoked: Cell<u64>,
    destroyed: Cell<u64>,
}

impl Counters {
    fn bump(cell: &Cell<u64>) {
        cell.set(cell.get() + 1);
    }
}

/// Snapshot of handle lifecycle counts.
///
/// Once every issued request has finished, `created == invoked == destroyed`
/// and `pending == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    pub created: u64,
    pub invoked: u64,
    pub destroyed: u64,
    pub pending: usize,
}

/// Owns one user callback for the lifetime of one request.
///
/// Consumed by [`CallbackHandle::invoke`], so it can fire at most once; it is
/// destroyed when invoked or when its registry is dropped.
pub struct CallbackHandle {
    callback: Option<BoxedCallback>,
    counters: Rc<Counters>,
}

impl CallbackHandle {
    pub fn invoke(mut self, bytes: &[u8], error: RasterError) {
        if let Some(callback) = self.callback.take() {
            Counters::bump(&self.counters.invoked);
            callback(bytes, error);
        }
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        Counters::bump(&self.counters.destroyed);
    }
}

impl fmt::Debug for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandle")
            .field("armed", &self.callback.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Slots {
    next: u64,
    pending: HashMap<Token, CallbackHandle>,
}

/// Indexed registry of pending callback handles.
///
/// The host side only ever sees [`Token`]s; the handle itself stays here
/// until the one terminal transition of its request takes it out.
#[derive(Default)]
pub struct CallbackRegistry {
    slots: RefCell<Slots>,
    counters: Rc<Counters>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, callback: BoxedCallback) -> Token {
        let handle = CallbackHandle {
            callback: Some(callback),
            counters: Rc::clone(&self.counters),
        };
        Counters::bump(&self.counters.created);

        let mut slots = self.slots.borrow_mut();
        let token = Token(slots.next);
        slots.next += 1;
        slots.pending.insert(token, handle);

        tracing::trace!(%token, pending = slots.pending.len(), "Registered callback");
        token
    }

    /// Removes the handle for `token`, handing ownership to the caller.
    ///
    /// The registry borrow is released before returning, so the handle can be
    /// invoked while its callback issues new requests.
    pub fn take(&self, token: Token) -> Option<CallbackHandle> {
        self.slots.borrow_mut().pending.remove(&token)
    }

    pub fn pending(&self) -> usize {
        self.slots.borrow().pending.len()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            created: self.counters.created.get(),
            invoked: self.counters.invoked.get(),
            destroyed: self.counters.destroyed.get(),
            pending: self.pending(),
        }
    }
}

impl Drop for CallbackRegistry {
    fn drop(&mut self) {
        let pending = self.slots.get_mut().pending.len();
        if pending > 0 {
            tracing::warn!(pending, "Dropping registry with unfinished requests");
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}
