//! Two-level category tree for menus, breadcrumbs and listing scopes.

use serde::Serialize;

use crate::models::Category;
use crate::store::Constraint;
use crate::types::CategoryId;

/// A top-level category with its children, both in menu order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry<'a> {
    pub category: &'a Category,
    pub children: Vec<&'a Category>,
}

/// Categories indexed by parent.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: Vec<Category>,
}

fn menu_order(a: &&Category, b: &&Category) -> std::cmp::Ordering {
    a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name))
}

impl CategoryTree {
    #[must_use]
    pub const fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    #[must_use]
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Top-level categories, in menu order.
    #[must_use]
    pub fn roots(&self) -> Vec<&Category> {
        let mut roots: Vec<&Category> = self.categories.iter().filter(|c| c.is_top_level()).collect();
        roots.sort_by(menu_order);
        roots
    }

    /// Direct children of `parent`, in menu order.
    #[must_use]
    pub fn children_of(&self, parent: &CategoryId) -> Vec<&Category> {
        let mut children: Vec<&Category> = self
            .categories
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent))
            .collect();
        children.sort_by(menu_order);
        children
    }

    /// Active categories flagged for the navigation menu.
    #[must_use]
    pub fn menu(&self) -> Vec<MenuEntry<'_>> {
        self.roots()
            .into_iter()
            .filter(|c| c.is_active() && c.show_in_menu)
            .map(|category| MenuEntry {
                category,
                children: self
                    .children_of(&category.id)
                    .into_iter()
                    .filter(|c| c.is_active() && c.show_in_menu)
                    .collect(),
            })
            .collect()
    }

    /// Path from the root to `category`, inclusive.
    #[must_use]
    pub fn breadcrumbs<'a>(&'a self, category: &'a Category) -> Vec<&'a Category> {
        match category.parent_id.as_ref().and_then(|p| self.get(p)) {
            Some(parent) => vec![parent, category],
            None => vec![category],
        }
    }

    /// Store constraint selecting products in `category`: top-level
    /// categories match `categoryId`, children match `subCategoryId`.
    #[must_use]
    pub fn scope_constraint(category: &Category) -> Constraint {
        let field = if category.is_top_level() {
            "categoryId"
        } else {
            "subCategoryId"
        };
        Constraint::equals(field, category.id.as_str())
    }

    /// Children whose parent id does not exist.
    #[must_use]
    pub fn orphans(&self) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|c| c.parent_id.as_ref().is_some_and(|p| self.get(p).is_none()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Operator;
    use crate::types::CategoryStatus;

    fn category(id: &str, parent: Option<&str>, order: i64) -> Category {
        Category {
            id: CategoryId::new(id),
            name: id.to_uppercase(),
            slug: id.to_string(),
            parent_id: parent.map(CategoryId::new),
            order,
            show_in_menu: true,
            ..Category::default()
        }
    }

    fn tree() -> CategoryTree {
        let mut hidden = category("sale", None, 9);
        hidden.show_in_menu = false;
        let mut inactive = category("mini", Some("dresses"), 3);
        inactive.status = CategoryStatus::Inactive;
        CategoryTree::new(vec![
            category("tops", None, 2),
            category("dresses", None, 1),
            category("maxi", Some("dresses"), 2),
            category("midi", Some("dresses"), 1),
            inactive,
            hidden,
            category("lost", Some("ghost"), 0),
        ])
    }

    #[test]
    fn test_menu_order_and_visibility() {
        let tree = tree();
        let menu = tree.menu();
        let roots: Vec<&str> = menu.iter().map(|e| e.category.slug.as_str()).collect();
        assert_eq!(roots, vec!["dresses", "tops"]);
        let children: Vec<&str> = menu[0].children.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(children, vec!["midi", "maxi"]);
    }

    #[test]
    fn test_breadcrumbs_and_scope() {
        let tree = tree();
        let maxi = tree.find_by_slug("maxi").unwrap_or_else(|| panic!("maxi"));
        let crumbs: Vec<&str> = tree.breadcrumbs(maxi).iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(crumbs, vec!["dresses", "maxi"]);

        let scope = CategoryTree::scope_constraint(maxi);
        assert_eq!(scope.field, "subCategoryId");
        assert_eq!(scope.op, Operator::Eq);

        let dresses = tree.find_by_slug("dresses").unwrap_or_else(|| panic!("dresses"));
        assert_eq!(CategoryTree::scope_constraint(dresses).field, "categoryId");
    }

    #[test]
    fn test_orphans() {
        let tree = tree();
        let orphans: Vec<&str> = tree.orphans().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(orphans, vec!["lost"]);
    }
}
