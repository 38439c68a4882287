//! Category tree: self-referential nodes with sibling-scoped slugs.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity};

use crate::form::{self, Cleaned};

pub const NAME_MAX_LEN: usize = 50;
pub const SLUG_MAX_LEN: usize = 60;
pub const ICON_CLASS_MAX_LEN: usize = 50;

/// Separator used between ancestor names in a display path.
pub const PATH_SEPARATOR: &str = " > ";

/// A node of the category forest. `parent_id == None` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub parent_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    /// Icon class name rendered by the storefront (e.g. `fa-solid fa-laptop`).
    pub icon_class: Option<String>,
}

impl Category {
    pub fn new(id: CategoryId, form: Cleaned<CategoryForm>) -> Self {
        let form = form.into_inner();
        Self {
            id,
            parent_id: form.parent_id,
            name: form.name,
            slug: form.slug,
            icon_class: form.icon_class,
        }
    }

    /// Overwrite editable fields from a cleaned form, keeping the identity.
    pub fn apply(&mut self, form: Cleaned<CategoryForm>) {
        *self = Self::new(self.id, form);
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Entity for Category {
    type Id = CategoryId;
    const MODEL: &'static str = "category";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Admin input for creating or editing a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    pub name: String,
    /// Left blank to derive from `name`.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub icon_class: Option<String>,
}

impl CategoryForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_icon_class(mut self, icon_class: impl Into<String>) -> Self {
        self.icon_class = Some(icon_class.into());
        self
    }

    pub fn clean(self) -> DomainResult<Cleaned<Self>> {
        let name = form::required("name", &self.name, NAME_MAX_LEN)?;
        let slug = form::slug_or_derived("slug", &self.slug, &name, SLUG_MAX_LEN)?;
        let icon_class = form::optional("icon_class", self.icon_class, ICON_CLASS_MAX_LEN)?;
        Ok(Cleaned::new(Self {
            parent_id: self.parent_id,
            name,
            slug,
            icon_class,
        }))
    }
}

/// Read-only view over a set of categories for tree queries.
///
/// Walks are bounded: a cycle in the stored parent links is reported as an
/// invariant violation instead of looping.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree<'a> {
    nodes: HashMap<CategoryId, &'a Category>,
}

impl<'a> CategoryTree<'a> {
    pub fn new(categories: impl IntoIterator<Item = &'a Category>) -> Self {
        Self {
            nodes: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn get(&self, id: CategoryId) -> Option<&'a Category> {
        self.nodes.get(&id).copied()
    }

    /// The node itself followed by its ancestors, ending at the root.
    pub fn ancestors(&self, id: CategoryId) -> DomainResult<Vec<&'a Category>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);

        while let Some(current) = cursor {
            if !seen.insert(current) {
                return Err(DomainError::invariant(format!(
                    "category {id} has a cycle in its parent chain at {current}"
                )));
            }
            let node = self.get(current).ok_or_else(|| {
                if current == id {
                    DomainError::not_found()
                } else {
                    DomainError::invariant(format!("category {current} is missing from the tree"))
                }
            })?;
            chain.push(node);
            cursor = node.parent_id;
        }

        Ok(chain)
    }

    /// Ancestor names joined root→leaf, e.g. `"Electronics > Computers"`.
    pub fn display_path(&self, id: CategoryId) -> DomainResult<String> {
        let names: Vec<&str> = self
            .ancestors(id)?
            .into_iter()
            .rev()
            .map(|c| c.name.as_str())
            .collect();
        Ok(names.join(PATH_SEPARATOR))
    }

    /// Direct children ordered by id.
    pub fn children(&self, id: CategoryId) -> Vec<&'a Category> {
        let mut children: Vec<&Category> = self
            .nodes
            .values()
            .copied()
            .filter(|c| c.parent_id == Some(id))
            .collect();
        children.sort_by_key(|c| c.id);
        children
    }

    /// Every node below `id` (not including `id`), breadth-first.
    pub fn descendants(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for child in self.children(current) {
                if seen.insert(child.id) {
                    out.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }

        out
    }

    /// Would setting `id`'s parent to `new_parent` close a loop?
    pub fn would_create_cycle(&self, id: CategoryId, new_parent: Option<CategoryId>) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = new_parent;
        while let Some(current) = cursor {
            if current == id || !seen.insert(current) {
                return true;
            }
            cursor = self.get(current).and_then(|c| c.parent_id);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, parent: Option<i64>, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            parent_id: parent.map(CategoryId::new),
            name: name.to_string(),
            slug: storefront_core::slugify(name),
            icon_class: None,
        }
    }

    fn chain() -> Vec<Category> {
        vec![
            node(1, None, "root"),
            node(2, Some(1), "A"),
            node(3, Some(2), "B"),
            node(4, Some(3), "C"),
            node(5, Some(1), "Z"),
        ]
    }

    #[test]
    fn display_path_joins_root_to_leaf() {
        let cats = chain();
        let tree = CategoryTree::new(&cats);
        assert_eq!(tree.display_path(CategoryId::new(4)).unwrap(), "root > A > B > C");
        assert_eq!(tree.display_path(CategoryId::new(1)).unwrap(), "root");
    }

    #[test]
    fn display_path_of_unknown_node_is_not_found() {
        let cats = chain();
        let tree = CategoryTree::new(&cats);
        assert_eq!(tree.display_path(CategoryId::new(99)), Err(DomainError::NotFound));
    }

    #[test]
    fn cyclic_parent_links_are_reported_not_looped() {
        let cats = vec![node(1, Some(2), "x"), node(2, Some(1), "y")];
        let tree = CategoryTree::new(&cats);
        assert!(matches!(
            tree.display_path(CategoryId::new(1)),
            Err(DomainError::InvariantViolation(_))
        ));
        assert_eq!(tree.descendants(CategoryId::new(1)), vec![CategoryId::new(2)]);
    }

    #[test]
    fn children_and_descendants() {
        let cats = chain();
        let tree = CategoryTree::new(&cats);
        let kids: Vec<i64> = tree.children(CategoryId::new(1)).iter().map(|c| c.id.get()).collect();
        assert_eq!(kids, vec![2, 5]);
        let all: Vec<i64> = tree.descendants(CategoryId::new(1)).iter().map(|c| c.get()).collect();
        assert_eq!(all, vec![2, 5, 3, 4]);
    }

    #[test]
    fn reparenting_under_a_descendant_is_a_cycle() {
        let cats = chain();
        let tree = CategoryTree::new(&cats);
        assert!(tree.would_create_cycle(CategoryId::new(2), Some(CategoryId::new(4))));
        assert!(tree.would_create_cycle(CategoryId::new(2), Some(CategoryId::new(2))));
        assert!(!tree.would_create_cycle(CategoryId::new(4), Some(CategoryId::new(5))));
        assert!(!tree.would_create_cycle(CategoryId::new(4), None));
    }

    #[test]
    fn clean_derives_slug_only_when_blank() {
        let cleaned = CategoryForm::new("Bilgisayar Parçaları").clean().unwrap();
        assert_eq!(cleaned.slug, "bilgisayar-parcalar");

        let cleaned = CategoryForm::new("Laptops").with_slug("notebooks").clean().unwrap();
        assert_eq!(cleaned.slug, "notebooks");
    }

    #[test]
    fn clean_enforces_lengths() {
        let long = "x".repeat(NAME_MAX_LEN + 1);
        assert!(matches!(CategoryForm::new(long).clean(), Err(DomainError::Validation(_))));
        let icon = "i".repeat(ICON_CLASS_MAX_LEN + 1);
        assert!(CategoryForm::new("ok").with_icon_class(icon).clean().is_err());
    }

    #[test]
    fn apply_keeps_identity() {
        let mut cat = node(7, None, "Old");
        cat.apply(CategoryForm::new("New").with_slug("kept").clean().unwrap());
        assert_eq!(cat.id, CategoryId::new(7));
        assert_eq!(cat.name, "New");
        assert_eq!(cat.slug, "kept");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a linear chain of n nodes renders n names and n-1 separators.
            #[test]
            fn path_has_one_segment_per_level(depth in 1usize..20) {
                let cats: Vec<Category> = (1..=depth as i64)
                    .map(|i| node(i, if i == 1 { None } else { Some(i - 1) }, &format!("n{i}")))
                    .collect();
                let tree = CategoryTree::new(&cats);
                let path = tree.display_path(CategoryId::new(depth as i64)).unwrap();
                prop_assert_eq!(path.split(PATH_SEPARATOR).count(), depth);
                prop_assert!(path.starts_with("n1"));
            }
        }
    }
}
