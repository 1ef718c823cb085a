//! Monitor records and attach/detach callbacks.
//!
//! Every component keeps a [`MonitorTable`]: one record per [`AncestorKey`]
//! it has looked up. A record caches the lookup result and, when the key is
//! actively monitored, the callbacks to notify when that ancestor appears
//! or disappears.
//!
//! Records without callbacks are a passive cache and may be evicted by any
//! refresh pass. Records with callbacks survive until
//! [`ComponentTree::unmonitor`](crate::ComponentTree::unmonitor).

use std::fmt;
use std::rc::Rc;

use crate::kind::AncestorKey;
use crate::tree::{ComponentId, ComponentTree};

type CallbackFn = dyn Fn(&mut ComponentTree, ComponentId, ComponentId);

/// A callback notified when a monitored ancestor is attached or detached.
///
/// The callback receives the tree, the monitoring component and the ancestor.
/// Identity is shared between clones of the same `MonitorCallback`:
/// registering a clone of an already registered callback is a no-op, and a
/// notification is delivered at most once per refresh pass for each
/// (component, callback, ancestor) combination.
///
/// # Example
///
/// ```
/// use component_model_core::MonitorCallback;
///
/// let on_attached = MonitorCallback::new(|_tree, this, ancestor| {
///     println!("{this:?} attached to {ancestor:?}");
/// });
/// let same = on_attached.clone();
/// assert!(on_attached.ptr_eq(&same));
/// ```
#[derive(Clone)]
pub struct MonitorCallback {
    inner: Rc<CallbackFn>,
}

impl MonitorCallback {
    /// Wrap a closure as a monitor callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut ComponentTree, ComponentId, ComponentId) + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Whether both values are the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn call(&self, tree: &mut ComponentTree, component: ComponentId, ancestor: ComponentId) {
        (self.inner)(tree, component, ancestor);
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }
}

impl fmt::Debug for MonitorCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MonitorCallback").field(&self.addr()).finish()
    }
}

/// A cached lookup hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub(crate) ancestor: ComponentId,
    /// Edges from the component to the ancestor at lookup time.
    pub(crate) depth: usize,
    pub(crate) path: String,
}

/// Callbacks registered for one monitored key.
#[derive(Clone, Debug, Default)]
pub(crate) struct MonitorCallbacks {
    pub(crate) attached: Vec<MonitorCallback>,
    pub(crate) detached: Vec<MonitorCallback>,
}

impl MonitorCallbacks {
    /// Register `callback` in `list` unless it is already there.
    /// Returns whether it was added.
    fn register(list: &mut Vec<MonitorCallback>, callback: MonitorCallback) -> bool {
        if list.iter().any(|existing| existing.ptr_eq(&callback)) {
            false
        } else {
            list.push(callback);
            true
        }
    }

    pub(crate) fn register_attached(&mut self, callback: MonitorCallback) -> bool {
        Self::register(&mut self.attached, callback)
    }

    pub(crate) fn register_detached(&mut self, callback: MonitorCallback) -> bool {
        Self::register(&mut self.detached, callback)
    }
}

/// One entry of a component's monitor table.
#[derive(Clone, Debug, Default)]
pub(crate) struct MonitorRecord {
    /// `None` means "not found" (or invalidated).
    pub(crate) resolved: Option<Resolved>,
    /// Present only while the key is actively monitored.
    pub(crate) callbacks: Option<MonitorCallbacks>,
}

impl MonitorRecord {
    pub(crate) fn passive(resolved: Option<Resolved>) -> Self {
        Self {
            resolved,
            callbacks: None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.callbacks.is_some()
    }

    /// The record a cloned component starts with: callbacks kept, cache dropped.
    /// Passive records are not carried over.
    pub(crate) fn for_clone(&self) -> Option<Self> {
        self.callbacks.as_ref().map(|callbacks| Self {
            resolved: None,
            callbacks: Some(callbacks.clone()),
        })
    }
}

/// Insertion-ordered table of monitor records keyed by [`AncestorKey`].
///
/// Order matters: notifications are queued in table order, so callbacks for
/// keys monitored earlier fire earlier.
#[derive(Clone, Debug, Default)]
pub(crate) struct MonitorTable {
    entries: Vec<(AncestorKey, MonitorRecord)>,
}

impl MonitorTable {
    pub(crate) fn get(&self, key: &AncestorKey) -> Option<&MonitorRecord> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub(crate) fn get_mut(&mut self, key: &AncestorKey) -> Option<&mut MonitorRecord> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub(crate) fn contains(&self, key: &AncestorKey) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace the record for `key`, keeping its position if present.
    pub(crate) fn insert(&mut self, key: AncestorKey, record: MonitorRecord) {
        match self.get_mut(&key) {
            Some(existing) => *existing = record,
            None => self.entries.push((key, record)),
        }
    }

    pub(crate) fn remove(&mut self, key: &AncestorKey) -> Option<MonitorRecord> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub(crate) fn keys(&self) -> Vec<AncestorKey> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&AncestorKey, &MonitorRecord)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }

    pub(crate) fn retain_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&AncestorKey, &mut MonitorRecord) -> bool,
    {
        self.entries.retain_mut(|(k, r)| f(k, r));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// The table a cloned component starts with.
    pub(crate) fn for_clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter_map(|(k, r)| r.for_clone().map(|r| (*k, r)))
                .collect(),
        }
    }
}

/// A queued attach or detach notification.
#[derive(Clone, Debug)]
pub(crate) struct Notification {
    pub(crate) component: ComponentId,
    pub(crate) callback: MonitorCallback,
    pub(crate) ancestor: ComponentId,
}

impl Notification {
    fn same_as(&self, other: &Self) -> bool {
        self.component == other.component
            && self.ancestor == other.ancestor
            && self.callback.ptr_eq(&other.callback)
    }
}

/// Notifications collected during one refresh pass.
#[derive(Debug, Default)]
pub(crate) struct NotificationQueue {
    items: Vec<Notification>,
}

impl NotificationQueue {
    pub(crate) fn push_all(
        &mut self,
        component: ComponentId,
        callbacks: &[MonitorCallback],
        ancestor: ComponentId,
    ) {
        self.items.extend(callbacks.iter().map(|callback| Notification {
            component,
            callback: callback.clone(),
            ancestor,
        }));
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the queue, dropping later duplicates of earlier notifications.
    pub(crate) fn into_unique(self) -> Vec<Notification> {
        let mut unique: Vec<Notification> = Vec::with_capacity(self.items.len());
        for item in self.items {
            if !unique.iter().any(|seen| seen.same_as(&item)) {
                unique.push(item);
            }
        }
        unique
    }
}
