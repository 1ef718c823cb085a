//! Iteration over the children of a container.

use crate::error::TreeResult;
use crate::kind::Kind;
use crate::tree::{ComponentId, ComponentTree};

/// Iterator over the children (or all descendants) of a container.
///
/// Descendants are yielded depth-first, each parent before its children. The
/// kind filter only decides what is yielded: the subtrees of non-matching
/// components are still visited.
///
/// Created by [`ComponentTree::iter_components`].
#[derive(Debug, Clone)]
pub struct Components<'a> {
    tree: &'a ComponentTree,
    stack: Vec<ComponentId>,
    deep: bool,
    filter: Option<Kind>,
}

impl Components<'_> {
    fn push_children(&mut self, id: ComponentId) {
        if let Ok(children) = self.tree.children(id) {
            self.stack.extend(children.iter().rev().copied());
        }
    }
}

impl Iterator for Components<'_> {
    type Item = ComponentId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if self.deep {
                self.push_children(id);
            }
            let matches = match self.filter {
                Some(kind) => self.tree.satisfies(id, kind).unwrap_or(false),
                None => true,
            };
            if matches {
                return Some(id);
            }
        }
        None
    }
}

impl ComponentTree {
    /// Iterate over the children of `container`.
    ///
    /// With `deep`, all descendants are visited. With a `filter`, only
    /// components satisfying that kind are yielded.
    pub fn iter_components(
        &self,
        container: ComponentId,
        deep: bool,
        filter: Option<Kind>,
    ) -> TreeResult<Components<'_>> {
        let mut iter = Components {
            tree: self,
            stack: Vec::new(),
            deep,
            filter,
        };
        self.children(container)?;
        iter.push_children(container);
        Ok(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;

    #[derive(Clone)]
    struct Group;
    impl Component for Group {
        fn is_container(&self) -> bool {
            true
        }
    }

    #[derive(Clone)]
    struct Input;
    impl Component for Input {}

    fn build() -> (ComponentTree, ComponentId, Vec<ComponentId>) {
        // form
        // ├── a (Input)
        // ├── g (Group)
        // │   ├── b (Input)
        // │   └── h (Group)
        // │       └── c (Input)
        // └── d (Input)
        let mut tree = ComponentTree::new();
        let form = tree.insert(Group);
        let a = tree.insert(Input);
        let g = tree.insert(Group);
        let b = tree.insert(Input);
        let h = tree.insert(Group);
        let c = tree.insert(Input);
        let d = tree.insert(Input);
        tree.add_component(form, a, Some("a"), None).unwrap();
        tree.add_component(form, g, Some("g"), None).unwrap();
        tree.add_component(g, b, Some("b"), None).unwrap();
        tree.add_component(g, h, Some("h"), None).unwrap();
        tree.add_component(h, c, Some("c"), None).unwrap();
        tree.add_component(form, d, Some("d"), None).unwrap();
        (tree, form, vec![a, g, b, h, c, d])
    }

    #[test]
    fn test_shallow() {
        let (tree, form, ids) = build();
        let found: Vec<_> = tree.iter_components(form, false, None).unwrap().collect();
        assert_eq!(found, vec![ids[0], ids[1], ids[5]]);
    }

    #[test]
    fn test_deep_preorder() {
        let (tree, form, ids) = build();
        let found: Vec<_> = tree.iter_components(form, true, None).unwrap().collect();
        assert_eq!(found, ids);
        assert_eq!(tree.component_tree(form).unwrap(), ids);
    }

    #[test]
    fn test_filter_still_descends() {
        let (tree, form, ids) = build();
        let inputs: Vec<_> = tree
            .iter_components(form, true, Some(Kind::of::<Input>()))
            .unwrap()
            .collect();
        assert_eq!(inputs, vec![ids[0], ids[2], ids[4], ids[5]]);
        assert_eq!(
            tree.iter_components(form, false, Some(Kind::of::<Group>()))
                .unwrap()
                .count(),
            1
        );
    }

    #[test]
    fn test_leaf_has_nothing() {
        let (tree, _, ids) = build();
        assert_eq!(tree.iter_components(ids[0], true, None).unwrap().count(), 0);
    }
}
