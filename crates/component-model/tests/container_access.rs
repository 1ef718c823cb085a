//! Integration tests for the umbrella crate: derive, prelude and index access.

use std::cell::Cell;
use std::rc::Rc;

use component_model::prelude::*;

#[derive(Clone, Component)]
#[component(container, factory = "make_row", factory_names("header"))]
struct Grid;

impl Grid {
    fn make_row(
        &self,
        tree: &mut ComponentTree,
        this: ComponentId,
        name: &str,
    ) -> TreeResult<Option<ComponentId>> {
        if name == "header" || name.parse::<u32>().is_ok() {
            // Registers the row itself instead of returning it.
            let row = tree.insert(Row);
            tree.add_component(this, row, Some(name), None)?;
        }
        Ok(None)
    }
}

#[derive(Clone, Component)]
#[component(container)]
struct Row;

#[derive(Clone, Component)]
struct GridCell;

#[test]
fn test_numeric_keys_create_rows() {
    let mut tree = ComponentTree::new();
    let grid = tree.insert(Grid);
    let mut access = ContainerAccess::new(&mut tree, grid);

    let row = access.get(2).unwrap();
    assert_eq!(access.get("2").unwrap(), row);
    assert!(access.exists("header").unwrap());
    assert!(!access.exists("footer").unwrap());

    let cell = access.tree().insert(GridCell);
    let mut row_access = ContainerAccess::new(access.tree(), row);
    row_access.set(0, cell).unwrap();

    assert_eq!(tree.get_component(grid, "2-0").unwrap(), cell);
    assert_eq!(tree.lookup_path(cell, AncestorKey::Root).unwrap(), "2-0");
}

#[test]
fn test_unset_path_detaches_descendant() {
    let mut tree = ComponentTree::new();
    let grid = tree.insert(Grid);
    let row = tree.get_component(grid, "1").unwrap();
    let cell = tree.insert(GridCell);
    tree.add_component(row, cell, Some("a"), None).unwrap();

    let detached = Rc::new(Cell::new(0));
    let counter = Rc::clone(&detached);
    tree.monitor(
        cell,
        AncestorKey::of::<Grid>(),
        None,
        Some(MonitorCallback::new(move |_, _, _| counter.set(counter.get() + 1))),
    )
    .unwrap();

    let mut access = ContainerAccess::new(&mut tree, grid);
    access.unset("1-a").unwrap();
    assert!(!access.exists("1-a").unwrap());
    assert_eq!(detached.get(), 1);
    assert_eq!(tree.parent(cell).unwrap(), None);
    assert_eq!(tree.parent(row).unwrap(), Some(grid));
}

#[test]
fn test_set_duplicate_key_fails() {
    let mut tree = ComponentTree::new();
    let grid = tree.insert(Grid);
    let a = tree.insert(Row);
    let b = tree.insert(Row);

    let mut access = ContainerAccess::new(&mut tree, grid);
    access.set("x", a).unwrap();
    assert!(matches!(access.set("x", b), Err(TreeError::InvalidState(_))));
    assert!(matches!(access.set("bad name", b), Err(TreeError::InvalidArgument(_))));
}
