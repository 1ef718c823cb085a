//! Integration tests for ancestor monitoring.

use std::cell::RefCell;
use std::rc::Rc;

use component_model_core::{
    AncestorKey, Component, ComponentId, ComponentTree, Kind, MonitorCallback, TreeError,
    TreeResult,
};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("component_model_core=trace")
        .try_init();
}

#[derive(Clone)]
struct Presenter;
impl Component for Presenter {
    fn is_container(&self) -> bool {
        true
    }
}

#[derive(Clone)]
struct Panel;
impl Component for Panel {
    fn is_container(&self) -> bool {
        true
    }
}

#[derive(Clone)]
struct Control;
impl Component for Control {}

/// Refuses to live anywhere but directly under a `Presenter`.
#[derive(Clone)]
struct PresenterOnly;
impl Component for PresenterOnly {
    fn validate_parent(
        &self,
        tree: &ComponentTree,
        _this: ComponentId,
        parent: ComponentId,
    ) -> TreeResult<()> {
        if tree.satisfies(parent, Kind::of::<Presenter>())? {
            Ok(())
        } else {
            Err(TreeError::invalid_state("PresenterOnly must be placed in a Presenter."))
        }
    }
}

type Log = Rc<RefCell<Vec<(&'static str, ComponentId, ComponentId)>>>;

/// A pair of callbacks that append `("attached" | "detached", this, ancestor)`.
fn recorders(log: &Log) -> (MonitorCallback, MonitorCallback) {
    let on_attached = {
        let log = Rc::clone(log);
        MonitorCallback::new(move |_, this, ancestor| log.borrow_mut().push(("attached", this, ancestor)))
    };
    let on_detached = {
        let log = Rc::clone(log);
        MonitorCallback::new(move |_, this, ancestor| log.borrow_mut().push(("detached", this, ancestor)))
    };
    (on_attached, on_detached)
}

fn chain(tree: &mut ComponentTree) -> (ComponentId, ComponentId, ComponentId) {
    let root = tree.insert(Presenter);
    let mid = tree.insert(Panel);
    let leaf = tree.insert(Control);
    tree.add_component(root, mid, Some("mid"), None).unwrap();
    tree.add_component(mid, leaf, Some("leaf"), None).unwrap();
    (root, mid, leaf)
}

#[test]
fn test_root_monitor_scenario() {
    setup();
    let mut tree = ComponentTree::new();
    let (root, mid, leaf) = chain(&mut tree);
    let log: Log = Rc::default();
    let (on_attached, on_detached) = recorders(&log);

    tree.monitor(leaf, AncestorKey::Root, Some(on_attached), Some(on_detached))
        .unwrap();
    assert_eq!(*log.borrow(), vec![("attached", leaf, root)]);

    tree.remove_component(root, mid).unwrap();
    assert_eq!(log.borrow().last(), Some(&("detached", leaf, root)));
    assert_eq!(tree.try_lookup(leaf, AncestorKey::Root).unwrap(), None);

    let root2 = tree.insert(Presenter);
    tree.add_component(root2, mid, Some("mid"), None).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            ("attached", leaf, root),
            ("detached", leaf, root),
            ("attached", leaf, root2),
        ]
    );
    assert_eq!(tree.lookup(leaf, AncestorKey::Root).unwrap(), root2);
    assert_eq!(tree.lookup_path(leaf, AncestorKey::Root).unwrap(), "mid-leaf");
}

#[test]
fn test_root_cached_while_detached_moves_on_attach() {
    setup();
    let mut tree = ComponentTree::new();
    let page = tree.insert(Presenter);
    let section = tree.insert(Panel);
    let field = tree.insert(Control);
    tree.add_component(section, field, Some("field"), None).unwrap();

    // Passive cache taken while `section` is the root.
    assert_eq!(tree.try_lookup(field, AncestorKey::Root).unwrap(), Some(section));
    assert_eq!(tree.try_lookup_path(field, AncestorKey::Root).unwrap().as_deref(), Some("field"));

    tree.add_component(page, section, Some("section"), None).unwrap();
    assert_eq!(tree.try_lookup(field, AncestorKey::Root).unwrap(), Some(page));
    assert_eq!(
        tree.try_lookup_path(field, AncestorKey::Root).unwrap().as_deref(),
        Some("section-field")
    );

    let log: Log = Rc::default();
    let (on_attached, _) = recorders(&log);
    tree.monitor(field, AncestorKey::Root, Some(on_attached), None).unwrap();
    assert_eq!(*log.borrow(), vec![("attached", field, page)]);
}

#[test]
fn test_active_root_monitor_follows_attach_of_detached_subtree() {
    setup();
    let mut tree = ComponentTree::new();
    let page = tree.insert(Presenter);
    let section = tree.insert(Panel);
    let field = tree.insert(Control);
    tree.add_component(section, field, Some("field"), None).unwrap();

    let log: Log = Rc::default();
    let (on_attached, on_detached) = recorders(&log);
    tree.monitor(field, AncestorKey::Root, Some(on_attached), Some(on_detached))
        .unwrap();
    assert_eq!(*log.borrow(), vec![("attached", field, section)]);

    tree.add_component(page, section, Some("section"), None).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![("attached", field, section), ("attached", field, page)]
    );
    assert_eq!(tree.lookup(field, AncestorKey::Root).unwrap(), page);
    assert_eq!(tree.lookup_path(field, AncestorKey::Root).unwrap(), "section-field");
}

#[test]
fn test_kind_monitor_detach_and_reattach() {
    setup();
    let mut tree = ComponentTree::new();
    let (root, mid, leaf) = chain(&mut tree);
    let log: Log = Rc::default();
    let (on_attached, on_detached) = recorders(&log);
    tree.monitor(leaf, AncestorKey::of::<Presenter>(), Some(on_attached), Some(on_detached))
        .unwrap();

    tree.remove_component(mid, leaf).unwrap();
    assert_eq!(log.borrow().len(), 2);
    assert!(tree.lookup(leaf, AncestorKey::of::<Presenter>()).is_err());

    // Reattached somewhere without a presenter: nothing fires.
    let loose = tree.insert(Panel);
    tree.add_component(loose, leaf, Some("leaf"), None).unwrap();
    assert_eq!(log.borrow().len(), 2);

    // The panel goes under the presenter: the leaf finds it again.
    tree.add_component(root, loose, Some("loose"), None).unwrap();
    assert_eq!(log.borrow().last(), Some(&("attached", leaf, root)));
    assert_eq!(log.borrow().len(), 3);
    assert_eq!(
        tree.lookup_path(leaf, AncestorKey::of::<Presenter>()).unwrap(),
        "loose-leaf"
    );
}

#[test]
fn test_detach_below_ancestor_is_silent() {
    setup();
    let mut tree = ComponentTree::new();
    let (root, mid, leaf) = chain(&mut tree);
    let log: Log = Rc::default();
    let (on_attached, on_detached) = recorders(&log);
    tree.monitor(leaf, AncestorKey::of::<Panel>(), Some(on_attached), Some(on_detached))
        .unwrap();
    assert_eq!(*log.borrow(), vec![("attached", leaf, mid)]);

    // The leaf keeps its panel when the panel leaves the presenter.
    tree.remove_component(root, mid).unwrap();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(tree.lookup(leaf, AncestorKey::of::<Panel>()).unwrap(), mid);
}

#[test]
fn test_removing_any_intermediate_node_detaches_once() {
    setup();
    let mut tree = ComponentTree::new();
    let root = tree.insert(Presenter);
    let a = tree.insert(Panel);
    let b = tree.insert(Panel);
    let leaf = tree.insert(Control);
    tree.add_component(root, a, Some("a"), None).unwrap();
    tree.add_component(a, b, Some("b"), None).unwrap();
    tree.add_component(b, leaf, Some("leaf"), None).unwrap();

    let log: Log = Rc::default();
    let (on_attached, on_detached) = recorders(&log);
    tree.monitor(leaf, AncestorKey::Root, Some(on_attached), Some(on_detached))
        .unwrap();

    tree.remove_component(a, b).unwrap();
    let detached: Vec<_> = log.borrow().iter().filter(|e| e.0 == "detached").cloned().collect();
    assert_eq!(detached, vec![("detached", leaf, root)]);

    tree.add_component(a, b, Some("b"), None).unwrap();
    assert_eq!(tree.lookup(leaf, AncestorKey::Root).unwrap(), root);
    assert_eq!(log.borrow().last(), Some(&("attached", leaf, root)));
}

#[test]
fn test_deep_reattach_notifies_every_monitor_once() {
    setup();
    let mut tree = ComponentTree::new();
    let root = tree.insert(Presenter);
    let outer = tree.insert(Panel);
    let inner = tree.insert(Panel);
    let first = tree.insert(Control);
    let second = tree.insert(Control);
    tree.add_component(outer, inner, Some("inner"), None).unwrap();
    tree.add_component(outer, first, Some("first"), None).unwrap();
    tree.add_component(inner, second, Some("second"), None).unwrap();

    let log: Log = Rc::default();
    let (on_attached, _) = recorders(&log);
    for id in [inner, first, second] {
        tree.monitor(id, AncestorKey::of::<Presenter>(), Some(on_attached.clone()), None)
            .unwrap();
    }
    assert!(log.borrow().is_empty());

    tree.add_component(root, outer, Some("outer"), None).unwrap();
    let mut seen: Vec<ComponentId> = log.borrow().iter().map(|e| e.1).collect();
    seen.sort();
    let mut expected = vec![inner, first, second];
    expected.sort();
    assert_eq!(seen, expected);
    assert!(log.borrow().iter().all(|e| e.0 == "attached" && e.2 == root));
}

#[test]
fn test_same_callback_registered_twice() {
    setup();
    let mut tree = ComponentTree::new();
    let (root, mid, leaf) = chain(&mut tree);
    let log: Log = Rc::default();
    let (on_attached, _) = recorders(&log);

    tree.monitor(leaf, AncestorKey::of::<Presenter>(), Some(on_attached.clone()), None)
        .unwrap();
    tree.monitor(leaf, AncestorKey::of::<Presenter>(), Some(on_attached), None)
        .unwrap();
    assert_eq!(log.borrow().len(), 1);

    tree.remove_component(root, mid).unwrap();
    tree.add_component(root, mid, Some("mid"), None).unwrap();
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn test_same_callback_same_ancestor_fires_once_per_pass() {
    setup();
    let mut tree = ComponentTree::new();
    let (root, mid, leaf) = chain(&mut tree);
    let log: Log = Rc::default();
    let (on_attached, _) = recorders(&log);

    // Both keys resolve to the same presenter.
    tree.monitor(leaf, AncestorKey::Root, Some(on_attached.clone()), None)
        .unwrap();
    tree.monitor(leaf, AncestorKey::of::<Presenter>(), Some(on_attached), None)
        .unwrap();
    log.borrow_mut().clear();

    tree.remove_component(root, mid).unwrap();
    tree.add_component(root, mid, Some("mid"), None).unwrap();
    assert_eq!(*log.borrow(), vec![("attached", leaf, root)]);
}

#[test]
fn test_nested_refresh_does_not_fire() {
    setup();
    let mut tree = ComponentTree::new();
    let root = tree.insert(Presenter);
    let leaf = tree.insert(Control);
    let extra = tree.insert(Control);

    let log: Log = Rc::default();
    let (extra_attached, _) = recorders(&log);
    tree.monitor(extra, AncestorKey::Root, Some(extra_attached), None)
        .unwrap();

    let adds_extra = MonitorCallback::new(move |tree, _, ancestor| {
        tree.add_component(ancestor, extra, Some("extra"), None).unwrap();
    });
    tree.monitor(leaf, AncestorKey::Root, Some(adds_extra), None)
        .unwrap();

    tree.add_component(root, leaf, Some("leaf"), None).unwrap();
    assert_eq!(tree.parent(extra).unwrap(), Some(root));
    // The cache is current even though the notification was suppressed.
    assert!(log.borrow().is_empty());
    assert_eq!(tree.try_lookup(extra, AncestorKey::Root).unwrap(), Some(root));
}

#[test]
fn test_vetoed_attach_leaves_tree_unchanged() {
    setup();
    let mut tree = ComponentTree::new();
    let panel = tree.insert(Panel);
    let presenter = tree.insert(Presenter);
    let picky = tree.insert(PresenterOnly);

    let log: Log = Rc::default();
    let (on_attached, _) = recorders(&log);
    tree.monitor(picky, AncestorKey::Root, Some(on_attached), None)
        .unwrap();

    let err = tree.add_component(panel, picky, Some("picky"), None).unwrap_err();
    assert!(matches!(err, TreeError::InvalidState(_)));
    assert!(tree.children(panel).unwrap().is_empty());
    assert_eq!(tree.parent(picky).unwrap(), None);
    assert!(log.borrow().is_empty());

    tree.add_component(presenter, picky, Some("picky"), None).unwrap();
    assert_eq!(*log.borrow(), vec![("attached", picky, presenter)]);
}

#[test]
fn test_destroy_fires_detached() {
    setup();
    let mut tree = ComponentTree::new();
    let (root, mid, leaf) = chain(&mut tree);
    let log: Log = Rc::default();
    let (_, on_detached) = recorders(&log);
    tree.monitor(leaf, AncestorKey::Root, None, Some(on_detached))
        .unwrap();

    tree.destroy(mid).unwrap();
    assert_eq!(*log.borrow(), vec![("detached", leaf, root)]);
    assert!(!tree.contains(leaf));
    assert_eq!(tree.component_count(), 1);
}

#[test]
fn test_detached_callback_sees_tree_before_cut() {
    setup();
    let mut tree = ComponentTree::new();
    let (root, mid, leaf) = chain(&mut tree);
    let parents = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&parents);
    let on_detached = MonitorCallback::new(move |tree, _, _| {
        sink.borrow_mut().push(tree.parent(mid).unwrap());
    });
    tree.monitor(leaf, AncestorKey::Root, None, Some(on_detached))
        .unwrap();

    tree.set_parent(mid, None, None).unwrap();
    assert_eq!(*parents.borrow(), vec![Some(root)]);
    assert_eq!(tree.parent(mid).unwrap(), None);
}
