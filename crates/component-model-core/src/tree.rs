//! The component tree.
//!
//! Provides the arena that owns every component and implements:
//! - Named parent/child composition with ordered children
//! - Cached ancestor lookup by [`AncestorKey`] with path computation
//! - Attach/detach monitoring with deduplicated, deferred notification
//! - Lazy child creation through the container's factory hook
//! - Cycle-safe deep cloning of subtrees
//!
//! # Key Types
//!
//! - [`ComponentTree`] - The arena holding all components
//! - [`ComponentId`] - Stable handle of a component in the arena
//! - [`Component`] - Per-type behaviour of a component payload
//! - [`MonitorCallback`] - Attach/detach notification callback
//!
//! # Ownership
//!
//! The tree owns every component. A container owns its children through its
//! ordered child list; the `parent` of a component is a plain, non-owning
//! [`ComponentId`]. Dropping the tree drops every component.
//!
//! # Threading
//!
//! The tree is single-threaded (`!Send`, `!Sync`). Monitor callbacks run
//! synchronously, before the mutating call that triggered them returns.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::component::{component_cast, Component};
use crate::error::{TreeError, TreeResult};
use crate::kind::{AncestorKey, Kind};
use crate::logging::{targets, PerfSpan};
use crate::monitor::{MonitorCallback, MonitorCallbacks, MonitorRecord, MonitorTable, NotificationQueue, Resolved};
use crate::name::{is_valid_name, split_path, suggestion, validate_name, NAME_SEPARATOR};

new_key_type! {
    /// A unique identifier for a component in a [`ComponentTree`].
    ///
    /// `ComponentId`s are stable handles that remain valid while the tree is
    /// rearranged. They become invalid when the component is destroyed.
    pub struct ComponentId;
}

impl ComponentId {
    /// Convert the ComponentId to a raw u64 value.
    ///
    /// The raw value can be converted back using [`ComponentId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a ComponentId from a raw u64 value.
    ///
    /// This does not check that the component exists in any tree.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

static_assertions::assert_not_impl_any!(ComponentTree: Send, Sync);

/// Internal data stored in the arena for each component.
pub(crate) struct ComponentData {
    /// Name, unique among siblings.
    pub(crate) name: Option<String>,
    /// Concrete payload type.
    pub(crate) kind: Kind,
    /// Extra capabilities declared by the payload.
    pub(crate) capabilities: Vec<Kind>,
    /// Parent container (non-owning).
    pub(crate) parent: Option<ComponentId>,
    /// Ordered children; `None` for leaves.
    pub(crate) children: Option<Vec<ComponentId>>,
    /// Cached lookups and monitor callbacks.
    pub(crate) monitors: MonitorTable,
    /// Set while this container's children are being cloned: the copy that
    /// cloned children attach to.
    pub(crate) cloning: Option<ComponentId>,
    pub(crate) payload: Rc<dyn Component>,
}

impl ComponentData {
    fn new(payload: Rc<dyn Component>, kind: Kind) -> Self {
        Self {
            name: None,
            kind,
            capabilities: payload.kinds(),
            parent: None,
            children: payload.is_container().then(Vec::new),
            monitors: MonitorTable::default(),
            cloning: None,
            payload,
        }
    }

    fn satisfies(&self, kind: Kind) -> bool {
        self.kind == kind || self.capabilities.contains(&kind)
    }

    /// Name used in messages: the component name, or its type name.
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.short_name())
    }

    fn path_segment(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Copy for cloning. The parent pointer is carried over as-is and settled
    /// once the copy's own children are done.
    fn duplicate(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            capabilities: self.capabilities.clone(),
            parent: self.parent,
            children: self.children.as_ref().map(|_| Vec::new()),
            monitors: self.monitors.for_clone(),
            cloning: None,
            payload: self.payload.clone_component(),
        }
    }
}

/// Mode of a refresh pass.
enum Refresh {
    /// A subtree is being cut off: invalidate lookups that crossed the cut.
    Detaching,
    /// A subtree was attached: resolve pending monitors.
    ///
    /// `missing` collects keys proven absent during the pass so sibling
    /// subtrees skip the walk. It is `None` when rebuilding a clone, whose
    /// cleared caches would make the shortcut unsound.
    Attaching { missing: Option<HashSet<AncestorKey>> },
}

impl Refresh {
    fn attaching() -> Self {
        Self::Attaching {
            missing: Some(HashSet::new()),
        }
    }

    fn rebuilding() -> Self {
        Self::Attaching { missing: None }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Detaching => "detaching",
            Self::Attaching { missing: Some(_) } => "attaching",
            Self::Attaching { missing: None } => "rebuilding",
        }
    }
}

/// The arena that owns all components and their relationships.
///
/// Uses arena-based storage via SlotMap for stable component IDs. All tree
/// operations take the [`ComponentId`] of the component they act on.
///
/// # Example
///
/// ```
/// use component_model_core::{AncestorKey, Component, ComponentTree};
///
/// #[derive(Clone)]
/// struct Page;
/// impl Component for Page {
///     fn is_container(&self) -> bool {
///         true
///     }
/// }
///
/// #[derive(Clone)]
/// struct Button;
/// impl Component for Button {}
///
/// let mut tree = ComponentTree::new();
/// let page = tree.insert(Page);
/// let panel = tree.insert(Page);
/// let button = tree.insert(Button);
///
/// tree.add_component(page, panel, Some("panel"), None).unwrap();
/// tree.add_component(panel, button, Some("ok"), None).unwrap();
///
/// assert_eq!(tree.get_component(page, "panel-ok").unwrap(), button);
/// assert_eq!(tree.lookup(button, AncestorKey::Root).unwrap(), page);
/// assert_eq!(tree.lookup_path(button, AncestorKey::Root).unwrap(), "panel-ok");
/// ```
pub struct ComponentTree {
    components: SlotMap<ComponentId, ComponentData>,
    /// Set while queued notifications are being delivered.
    firing: bool,
}

impl ComponentTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            components: SlotMap::with_key(),
            firing: false,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new detached, unnamed component and return its ID.
    pub fn insert<T: Component>(&mut self, payload: T) -> ComponentId {
        let kind = Kind::of::<T>();
        let id = self
            .components
            .insert(ComponentData::new(Rc::new(payload), kind));
        tracing::trace!(target: targets::TREE, ?id, type_name = kind.name(), "registered component");
        id
    }

    /// Register a new detached component with a name.
    ///
    /// The name is validated when the component is added to a container.
    pub fn insert_named<T: Component>(&mut self, payload: T, name: impl Into<String>) -> ComponentId {
        let id = self.insert(payload);
        if let Some(data) = self.components.get_mut(id) {
            data.name = Some(name.into());
        }
        id
    }

    /// Detach a component and remove it, with all its descendants, from the
    /// arena.
    ///
    /// Detach notifications fire before anything is removed.
    #[tracing::instrument(skip(self), target = "component_model_core::tree", level = "trace")]
    pub fn destroy(&mut self, id: ComponentId) -> TreeResult<()> {
        if self.data(id)?.parent.is_some() {
            self.set_parent(id, None, None)?;
        }
        // A detach callback may already have destroyed it.
        if !self.components.contains_key(id) {
            return Ok(());
        }

        let descendants: Vec<ComponentId> = self.iter_components(id, true, None)?.collect();
        tracing::trace!(target: targets::TREE, ?id, descendant_count = descendants.len(), "destroying component tree");
        for descendant in descendants {
            self.components.remove(descendant);
        }
        self.components.remove(id);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub(crate) fn data(&self, id: ComponentId) -> TreeResult<&ComponentData> {
        self.components.get(id).ok_or(TreeError::InvalidComponentId)
    }

    fn data_mut(&mut self, id: ComponentId) -> TreeResult<&mut ComponentData> {
        self.components.get_mut(id).ok_or(TreeError::InvalidComponentId)
    }

    /// Check if a component exists in the tree.
    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// Get the number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Iterate over all components that have no parent.
    pub fn root_components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components
            .iter()
            .filter(|(_, data)| data.parent.is_none())
            .map(|(id, _)| id)
    }

    /// Get the component's name.
    pub fn name(&self, id: ComponentId) -> TreeResult<Option<&str>> {
        Ok(self.data(id)?.name.as_deref())
    }

    /// Get the parent container, if any.
    pub fn parent(&self, id: ComponentId) -> TreeResult<Option<ComponentId>> {
        Ok(self.data(id)?.parent)
    }

    /// Get the kind of the component's concrete payload type.
    pub fn kind(&self, id: ComponentId) -> TreeResult<Kind> {
        Ok(self.data(id)?.kind)
    }

    /// Get the payload's type name.
    pub fn type_name(&self, id: ComponentId) -> TreeResult<&'static str> {
        Ok(self.data(id)?.kind.name())
    }

    /// Whether the component satisfies `kind`, by type or declared capability.
    pub fn satisfies(&self, id: ComponentId, kind: Kind) -> TreeResult<bool> {
        Ok(self.data(id)?.satisfies(kind))
    }

    /// Whether the component can own children.
    pub fn is_container(&self, id: ComponentId) -> TreeResult<bool> {
        Ok(self.data(id)?.children.is_some())
    }

    /// Get the ordered children of a component (empty for leaves).
    pub fn children(&self, id: ComponentId) -> TreeResult<&[ComponentId]> {
        Ok(self.data(id)?.children.as_deref().unwrap_or_default())
    }

    /// Get the component's payload.
    pub fn payload(&self, id: ComponentId) -> TreeResult<&dyn Component> {
        Ok(self.data(id)?.payload.as_ref())
    }

    /// Get the payload downcast to `T`.
    pub fn get<T: Component>(&self, id: ComponentId) -> Option<&T> {
        component_cast::<T>(self.components.get(id)?.payload.as_ref())
    }

    /// Get the payload mutably, downcast to `T`.
    ///
    /// Returns `None` while one of the payload's own hooks is running.
    pub fn get_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        let payload = Rc::get_mut(&mut self.components.get_mut(id)?.payload)?;
        (payload as &mut dyn Any).downcast_mut::<T>()
    }

    fn child_by_name(&self, container: ComponentId, name: &str) -> Option<ComponentId> {
        self.components
            .get(container)?
            .children
            .as_ref()?
            .iter()
            .copied()
            .find(|&child| {
                self.components
                    .get(child)
                    .is_some_and(|data| data.name.as_deref() == Some(name))
            })
    }

    fn require_container(&self, id: ComponentId) -> TreeResult<&ComponentData> {
        let data = self.data(id)?;
        if data.children.is_none() {
            return Err(TreeError::invalid_argument(format!(
                "Component '{}' is not a container.",
                data.label()
            )));
        }
        Ok(data)
    }

    // =========================================================================
    // Ancestor Lookup
    // =========================================================================

    /// Walk up from `id` looking for the nearest ancestor matching `key`.
    fn resolve(&self, id: ComponentId, key: AncestorKey) -> Option<Resolved> {
        let data = self.components.get(id)?;
        let mut path = data.path_segment().to_string();
        let mut depth = 1;
        let mut current = data.parent;
        // An acyclic walk never visits more components than the arena holds.
        let mut budget = self.components.len();

        while let Some(obj) = current {
            let obj_data = self.components.get(obj)?;
            let parent = obj_data.parent;
            let found = match key {
                AncestorKey::Root => parent.is_none(),
                AncestorKey::Kind(kind) => obj_data.satisfies(kind),
            };
            if found {
                return Some(Resolved {
                    ancestor: obj,
                    depth,
                    path,
                });
            }

            path = format!("{}{}{}", obj_data.path_segment(), NAME_SEPARATOR, path);
            depth += 1;
            budget = budget.checked_sub(1)?;
            current = parent.filter(|&p| p != id);
        }
        None
    }

    /// Return the cached lookup for `key`, computing and caching it first if
    /// needed.
    fn cached_lookup(&mut self, id: ComponentId, key: AncestorKey) -> TreeResult<Option<Resolved>> {
        if let Some(record) = self.data(id)?.monitors.get(&key) {
            return Ok(record.resolved.clone());
        }

        let resolved = self.resolve(id, key);
        tracing::trace!(
            target: targets::MONITOR,
            ?id,
            key = key.describe(),
            found = ?resolved.as_ref().map(|r| r.ancestor),
            "cached lookup"
        );
        self.data_mut(id)?
            .monitors
            .insert(key, MonitorRecord::passive(resolved.clone()));
        Ok(resolved)
    }

    fn not_attached(&self, id: ComponentId, key: AncestorKey) -> TreeError {
        let label = self
            .components
            .get(id)
            .map(|data| data.label().to_string())
            .unwrap_or_default();
        TreeError::not_attached(label, key.describe())
    }

    /// Find the nearest ancestor matching `key`.
    ///
    /// For [`AncestorKey::Root`] this is the root of the tree the component
    /// is in. The result is cached until a structural change invalidates it.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotAttached`] when no ancestor matches.
    pub fn lookup(&mut self, id: ComponentId, key: impl Into<AncestorKey>) -> TreeResult<ComponentId> {
        let key = key.into();
        self.try_lookup(id, key)?
            .ok_or_else(|| self.not_attached(id, key))
    }

    /// Find the nearest ancestor matching `key`, or `None`.
    pub fn try_lookup(
        &mut self,
        id: ComponentId,
        key: impl Into<AncestorKey>,
    ) -> TreeResult<Option<ComponentId>> {
        Ok(self.cached_lookup(id, key.into())?.map(|r| r.ancestor))
    }

    /// Path from the ancestor matching `key` (exclusive) down to this
    /// component (inclusive), names joined with [`NAME_SEPARATOR`].
    ///
    /// # Errors
    ///
    /// [`TreeError::NotAttached`] when no ancestor matches.
    pub fn lookup_path(&mut self, id: ComponentId, key: impl Into<AncestorKey>) -> TreeResult<String> {
        let key = key.into();
        self.try_lookup_path(id, key)?
            .ok_or_else(|| self.not_attached(id, key))
    }

    /// Like [`lookup_path`](Self::lookup_path), returning `None` when no
    /// ancestor matches.
    pub fn try_lookup_path(
        &mut self,
        id: ComponentId,
        key: impl Into<AncestorKey>,
    ) -> TreeResult<Option<String>> {
        Ok(self.cached_lookup(id, key.into())?.map(|r| r.path))
    }

    // =========================================================================
    // Monitoring
    // =========================================================================

    /// Start monitoring the nearest ancestor matching `key`.
    ///
    /// `on_attached` runs immediately if such an ancestor exists now, and
    /// again each time the component becomes attached to one. `on_detached`
    /// runs just before the component is cut off from it. Registering a
    /// callback that is already registered for `key` has no effect.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidArgument`] when neither callback is given.
    pub fn monitor(
        &mut self,
        id: ComponentId,
        key: impl Into<AncestorKey>,
        on_attached: Option<MonitorCallback>,
        on_detached: Option<MonitorCallback>,
    ) -> TreeResult<()> {
        let key = key.into();
        if on_attached.is_none() && on_detached.is_none() {
            return Err(TreeError::invalid_argument(
                "At least one of the attached or detached callbacks must be given.",
            ));
        }

        let ancestor = self.try_lookup(id, key)?;
        let data = self.data_mut(id)?;
        if !data.monitors.contains(&key) {
            data.monitors.insert(key, MonitorRecord::default());
        }
        let Some(record) = data.monitors.get_mut(&key) else {
            return Ok(());
        };
        let callbacks = record.callbacks.get_or_insert_with(MonitorCallbacks::default);

        let mut immediate = None;
        if let Some(callback) = on_attached {
            if callbacks.register_attached(callback.clone()) {
                immediate = ancestor.map(|ancestor| (callback, ancestor));
            }
        }
        if let Some(callback) = on_detached {
            callbacks.register_detached(callback);
        }
        tracing::trace!(target: targets::MONITOR, ?id, key = key.describe(), ?ancestor, "monitor registered");

        if let Some((callback, ancestor)) = immediate {
            callback.call(self, id, ancestor);
        }
        Ok(())
    }

    /// Stop monitoring `key`, discarding its callbacks and cached lookup.
    pub fn unmonitor(&mut self, id: ComponentId, key: impl Into<AncestorKey>) -> TreeResult<()> {
        let key = key.into();
        self.data_mut(id)?.monitors.remove(&key);
        Ok(())
    }

    /// Whether `key` is actively monitored by the component.
    pub fn is_monitoring(&self, id: ComponentId, key: impl Into<AncestorKey>) -> TreeResult<bool> {
        Ok(self
            .data(id)?
            .monitors
            .get(&key.into())
            .is_some_and(MonitorRecord::is_active))
    }

    // =========================================================================
    // Monitor Refresh
    // =========================================================================

    fn run_refresh(&mut self, id: ComponentId, mut mode: Refresh) {
        let mut queue = NotificationQueue::default();
        self.refresh_monitors(id, 0, &mut mode, &mut queue);
        tracing::trace!(target: targets::MONITOR, ?id, mode = mode.label(), queued = queue.len(), "refreshed monitors");
        self.fire(queue);
    }

    /// Visit the subtree below `id` (deepest first), then `id` itself.
    fn refresh_monitors(
        &mut self,
        id: ComponentId,
        depth: usize,
        mode: &mut Refresh,
        queue: &mut NotificationQueue,
    ) {
        let children = match self.components.get(id) {
            Some(data) => data.children.clone().unwrap_or_default(),
            None => return,
        };
        for child in children {
            self.refresh_monitors(child, depth + 1, mode, queue);
        }

        match mode {
            Refresh::Detaching => self.invalidate_monitors(id, depth, queue),
            Refresh::Attaching { missing } => self.resolve_monitors(id, missing.as_mut(), queue),
        }
    }

    /// Drop every lookup whose ancestor was reached through the edge being
    /// cut, i.e. found further away than `depth`.
    fn invalidate_monitors(&mut self, id: ComponentId, depth: usize, queue: &mut NotificationQueue) {
        let Some(data) = self.components.get_mut(id) else {
            return;
        };
        data.monitors.retain_mut(|_, record| {
            let stale = match &record.resolved {
                Some(resolved) if resolved.depth > depth => resolved.ancestor,
                _ => return true,
            };
            match &record.callbacks {
                Some(callbacks) => {
                    queue.push_all(id, &callbacks.detached, stale);
                    record.resolved = None;
                    true
                }
                None => false,
            }
        });
    }

    /// Resolve every pending monitor of `id`.
    fn resolve_monitors(
        &mut self,
        id: ComponentId,
        mut missing: Option<&mut HashSet<AncestorKey>>,
        queue: &mut NotificationQueue,
    ) {
        let keys = match self.components.get(id) {
            Some(data) => data.monitors.keys(),
            None => return,
        };

        for key in keys {
            let Some(data) = self.components.get_mut(id) else {
                return;
            };
            let Some(record) = data.monitors.get(&key) else {
                continue;
            };
            // An attach above a component can never bring a nearer kind
            // match, but it always moves the root.
            let stale_root = key == AncestorKey::Root && record.resolved.is_some();
            if record.resolved.is_some() && !stale_root {
                continue;
            }
            if !record.is_active() {
                data.monitors.remove(&key);
                continue;
            }
            if !stale_root && missing.as_ref().is_some_and(|m| m.contains(&key)) {
                continue;
            }

            let resolved = self.resolve(id, key);
            let Some(record) = self
                .components
                .get_mut(id)
                .and_then(|data| data.monitors.get_mut(&key))
            else {
                continue;
            };
            let previous = record.resolved.take().map(|r| r.ancestor);
            match resolved {
                Some(found) => {
                    if let Some(callbacks) = &record.callbacks {
                        if previous != Some(found.ancestor) {
                            queue.push_all(id, &callbacks.attached, found.ancestor);
                        }
                    }
                    record.resolved = Some(found);
                }
                None => {
                    if let Some(missing) = missing.as_deref_mut() {
                        missing.insert(key);
                    }
                }
            }
        }
    }

    /// Deliver queued notifications, once per distinct
    /// (component, callback, ancestor).
    fn fire(&mut self, queue: NotificationQueue) {
        if queue.is_empty() {
            return;
        }
        if self.firing {
            tracing::debug!(
                target: targets::MONITOR,
                suppressed = queue.len(),
                "refresh inside a monitor callback; notifications suppressed"
            );
            return;
        }

        self.firing = true;
        for notification in queue.into_unique() {
            notification
                .callback
                .call(self, notification.component, notification.ancestor);
        }
        self.firing = false;
    }

    // =========================================================================
    // Parent Assignment
    // =========================================================================

    /// Set or clear the parent link of `id`, running the monitor refresh.
    ///
    /// Does not touch the container's child list.
    fn reparent(
        &mut self,
        id: ComponentId,
        new_parent: Option<ComponentId>,
        new_name: Option<&str>,
    ) -> TreeResult<()> {
        let data = self.data(id)?;
        let current = data.parent;

        if new_parent.is_none() && current.is_none() {
            if let Some(name) = new_name {
                self.data_mut(id)?.name = Some(name.to_string());
            }
            return Ok(());
        }
        if new_parent == current && new_name.is_none() {
            return Ok(());
        }
        if current.is_some() && new_parent.is_some() {
            return Err(TreeError::invalid_state(format!(
                "Component '{}' already has a parent.",
                data.label()
            )));
        }

        match new_parent {
            None => {
                tracing::trace!(target: targets::TREE, ?id, parent = ?current, "detaching component");
                self.run_refresh(id, Refresh::Detaching);
                self.data_mut(id)?.parent = None;
            }
            Some(parent) => {
                let payload = Rc::clone(&data.payload);
                payload.validate_parent(self, id, parent)?;

                let data = self.data_mut(id)?;
                data.parent = Some(parent);
                if let Some(name) = new_name {
                    data.name = Some(name.to_string());
                }
                tracing::trace!(target: targets::TREE, ?id, ?parent, "attached component");
                self.run_refresh(id, Refresh::attaching());
            }
        }
        Ok(())
    }

    /// Set or remove the parent of a component.
    ///
    /// - `Some(parent)` adds the component to `parent` (see
    ///   [`add_component`](Self::add_component)); setting the current parent
    ///   again without a name does nothing.
    /// - `None` removes the component from its container; on a detached
    ///   component, a given `name` renames it.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidState`] when the component already has another
    /// parent, plus everything [`add_component`](Self::add_component) reports.
    pub fn set_parent(
        &mut self,
        id: ComponentId,
        parent: Option<ComponentId>,
        name: Option<&str>,
    ) -> TreeResult<()> {
        let current = self.data(id)?.parent;
        match parent {
            Some(parent) if current == Some(parent) && name.is_none() => Ok(()),
            Some(parent) => self.add_component(parent, id, name, None),
            None => {
                if let Some(container) = current {
                    self.unlink(container, id);
                }
                self.reparent(id, None, name)
            }
        }
    }

    fn unlink(&mut self, container: ComponentId, child: ComponentId) {
        if let Some(children) = self
            .components
            .get_mut(container)
            .and_then(|data| data.children.as_mut())
        {
            children.retain(|&c| c != child);
        }
    }

    // =========================================================================
    // Container Operations
    // =========================================================================

    /// Add `component` to `container` under `name` (defaults to the
    /// component's own name).
    ///
    /// With `insert_before` naming an existing child, the component is placed
    /// right before it; otherwise it is appended.
    ///
    /// # Errors
    ///
    /// - [`TreeError::InvalidArgument`] for a malformed name or a leaf
    ///   `container`.
    /// - [`TreeError::InvalidState`] for a missing or duplicate name, a cycle,
    ///   a vetoed insert, or a component that already has a parent. The child
    ///   list is left unchanged.
    pub fn add_component(
        &mut self,
        container: ComponentId,
        component: ComponentId,
        name: Option<&str>,
        insert_before: Option<&str>,
    ) -> TreeResult<()> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.data(component)?.name.clone().ok_or_else(|| {
                TreeError::invalid_state("Component name is required when adding a component.")
            })?,
        };
        validate_name(&name)?;
        self.require_container(container)?;
        self.data(component)?;

        if self.child_by_name(container, &name).is_some() {
            return Err(TreeError::invalid_state(format!(
                "Component with name '{name}' already exists."
            )));
        }

        let mut current = Some(container);
        while let Some(obj) = current {
            if obj == component {
                return Err(TreeError::invalid_state(format!(
                    "Circular reference detected while adding component '{name}'."
                )));
            }
            current = self.data(obj)?.parent;
        }

        let payload = Rc::clone(&self.data(container)?.payload);
        payload.validate_child(self, container, component)?;

        let position = insert_before.and_then(|before| {
            let sibling = self.child_by_name(container, before)?;
            self.children(container).ok()?.iter().position(|&c| c == sibling)
        });
        let children = self
            .data_mut(container)?
            .children
            .get_or_insert_with(Vec::new);
        let index = position.unwrap_or(children.len());
        children.insert(index, component);

        if let Err(err) = self.reparent(component, Some(container), Some(&name)) {
            if let Some(children) = self
                .components
                .get_mut(container)
                .and_then(|data| data.children.as_mut())
            {
                if children.get(index) == Some(&component) {
                    children.remove(index);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Remove `component` from `container` and detach it.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidArgument`] unless `component` is the child
    /// registered under its name in `container`.
    pub fn remove_component(&mut self, container: ComponentId, component: ComponentId) -> TreeResult<()> {
        let name = self.data(component)?.name.clone();
        let registered = name
            .as_deref()
            .and_then(|name| self.child_by_name(container, name));
        if registered != Some(component) {
            return Err(TreeError::invalid_argument(format!(
                "Component named '{}' is not located in this container.",
                name.unwrap_or_default()
            )));
        }

        self.unlink(container, component);
        self.reparent(component, None, None)
    }

    /// Get a descendant by name or by `-`-separated path, creating missing
    /// children through the container's factory.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidArgument`] when the component does not exist (with
    /// a "did you mean" hint when one is close), when a path segment is
    /// malformed, or when the path leads through a leaf.
    pub fn get_component(&mut self, container: ComponentId, path: &str) -> TreeResult<ComponentId> {
        self.find_component(container, path, true)?
            .ok_or_else(|| TreeError::invalid_argument(format!("Component with path '{path}' does not exist.")))
    }

    /// Like [`get_component`](Self::get_component), returning `None` instead
    /// of failing when the component is absent.
    ///
    /// Factory errors are still reported.
    pub fn try_get_component(
        &mut self,
        container: ComponentId,
        path: &str,
    ) -> TreeResult<Option<ComponentId>> {
        self.find_component(container, path, false)
    }

    fn find_component(
        &mut self,
        container: ComponentId,
        path: &str,
        throw: bool,
    ) -> TreeResult<Option<ComponentId>> {
        self.require_container(container)?;
        let (head, rest) = split_path(path);

        if self.child_by_name(container, head).is_none() {
            if !is_valid_name(head) {
                if throw {
                    validate_name(head)?;
                }
                return Ok(None);
            }
            self.create_on_demand(container, head)?;
        }

        let Some(child) = self.child_by_name(container, head) else {
            return if throw {
                Err(self.missing_component(container, head))
            } else {
                Ok(None)
            };
        };

        let Some(rest) = rest else {
            return Ok(Some(child));
        };
        if self.data(child)?.children.is_some() {
            self.find_component(child, rest, throw)
        } else if throw {
            Err(TreeError::invalid_argument(format!(
                "Component with name '{head}' is not container and cannot have '{rest}' component."
            )))
        } else {
            Ok(None)
        }
    }

    fn create_on_demand(&mut self, container: ComponentId, name: &str) -> TreeResult<()> {
        let payload = Rc::clone(&self.data(container)?.payload);
        let created = payload.create_component(self, container, name)?;

        if self.child_by_name(container, name).is_some() {
            return Ok(());
        }
        match created {
            Some(component) => {
                tracing::debug!(target: targets::TREE, ?container, ?component, name, "created component on demand");
                self.add_component(container, component, Some(name), None)
            }
            None if payload.factory_names().iter().any(|n| n == name) => {
                Err(TreeError::invalid_state(format!(
                    "Factory of '{}' did not return or create the desired component '{name}'.",
                    self.data(container)?.kind.short_name()
                )))
            }
            None => Ok(()),
        }
    }

    fn missing_component(&self, container: ComponentId, name: &str) -> TreeError {
        let mut candidates: Vec<String> = self
            .children(container)
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.components.get(child)?.name.clone())
            .collect();
        if let Ok(data) = self.data(container) {
            candidates.extend(data.payload.factory_names());
        }

        match suggestion(candidates.iter().map(String::as_str), name) {
            Some(hint) => TreeError::invalid_argument(format!(
                "Component with name '{name}' does not exist, did you mean '{hint}'?"
            )),
            None => TreeError::invalid_argument(format!("Component with name '{name}' does not exist.")),
        }
    }

    /// Immediate children as ordered `(name, id)` pairs.
    pub fn components(&self, container: ComponentId) -> TreeResult<Vec<(&str, ComponentId)>> {
        let data = self.require_container(container)?;
        Ok(data
            .children
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| Some((self.components.get(child)?.path_segment(), child)))
            .collect())
    }

    /// All descendants, depth-first, parents before their children.
    pub fn component_tree(&self, container: ComponentId) -> TreeResult<Vec<ComponentId>> {
        self.require_container(container)?;
        Ok(self.iter_components(container, true, None)?.collect())
    }

    // =========================================================================
    // Cloning
    // =========================================================================

    /// Deep-copy a component and, for containers, all descendants.
    ///
    /// The copy is detached. Payloads are cloned, names and monitor callbacks
    /// are carried over, cached lookups are not: monitors inside the copy are
    /// resolved against the copy's own ancestors, firing `attached` where an
    /// ancestor is found.
    #[tracing::instrument(skip(self), target = "component_model_core::tree", level = "trace")]
    pub fn clone_component(&mut self, source: ComponentId) -> TreeResult<ComponentId> {
        let _span = PerfSpan::new("clone_component");
        let copy = self.clone_subtree(source)?;
        self.run_refresh(copy, Refresh::rebuilding());
        Ok(copy)
    }

    fn clone_subtree(&mut self, source: ComponentId) -> TreeResult<ComponentId> {
        let data = self.data(source)?;
        let children = data.children.clone().unwrap_or_default();
        let duplicate = data.duplicate();
        let copy = self.components.insert(duplicate);

        if !children.is_empty() {
            self.data_mut(source)?.cloning = Some(copy);
            let result = children
                .iter()
                .try_for_each(|&child| self.clone_subtree(child).map(drop));
            if let Some(data) = self.components.get_mut(source) {
                data.cloning = None;
            }
            result?;
        }

        self.settle_cloned_parent(copy)?;
        Ok(copy)
    }

    /// Attach a fresh copy to the clone of its parent, or detach it when its
    /// parent is not being cloned.
    fn settle_cloned_parent(&mut self, copy: ComponentId) -> TreeResult<()> {
        let Some(old_parent) = self.data(copy)?.parent else {
            return Ok(());
        };

        match self.components.get(old_parent).and_then(|data| data.cloning) {
            Some(adopter) => {
                self.data_mut(copy)?.parent = Some(adopter);
                if let Some(children) = self.data_mut(adopter)?.children.as_mut() {
                    children.push(copy);
                }
            }
            None => {
                self.run_refresh(copy, Refresh::Detaching);
                self.data_mut(copy)?.parent = None;
            }
        }
        Ok(())
    }
}

impl Default for ComponentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTree")
            .field("components", &self.components.len())
            .field("firing", &self.firing)
            .finish()
    }
}
