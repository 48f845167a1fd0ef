//! Category tree model.
//!
//! The backend hands us a flat list where structure lives only in
//! `parent_id`. Everything here works on an explicit adjacency index built
//! once per call, and every traversal carries a visited set, so malformed
//! input (dangling parents, cycles, duplicate ids) degrades into a usable
//! listing instead of a hang or a panic.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use utoipa::ToSchema;

use crate::features::categories::models::Category;
use crate::shared::constants::INDENT_PREFIX;

/// A category annotated with its position in the pre-order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FlatCategory {
    pub category: Category,
    /// Number of ancestor edges to the root this entry was reached from.
    pub depth: usize,
    /// Slugs from the root down to this category joined with `/`.
    pub path: String,
}

impl FlatCategory {
    /// Name prefixed with one indent marker per depth level.
    pub fn label(&self) -> String {
        indented_label(&self.category.name, self.depth)
    }
}

pub fn indented_label(name: &str, depth: usize) -> String {
    format!("{}{}", INDENT_PREFIX.repeat(depth), name)
}

/// Nested representation used by storefront navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeNode {
    pub category: Category,
    pub depth: usize,
    pub children: Vec<CategoryTreeNode>,
}

/// Adjacency index over a borrowed category slice.
///
/// Child lists keep input order, which is the backend's creation order.
pub struct CategoryIndex<'a> {
    categories: &'a [Category],
    by_id: HashMap<&'a str, usize>,
    children: HashMap<&'a str, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        let mut by_id = HashMap::with_capacity(categories.len());
        for (idx, category) in categories.iter().enumerate() {
            // First occurrence wins for lookups; duplicates are still listed.
            by_id.entry(category.id.as_str()).or_insert(idx);
        }

        let mut children: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (idx, category) in categories.iter().enumerate() {
            match category.parent_id.as_deref() {
                Some(parent) if by_id.contains_key(parent) => {
                    children.entry(parent).or_default().push(idx);
                }
                // Missing or dangling parent: treat as root.
                _ => roots.push(idx),
            }
        }

        Self {
            categories,
            by_id,
            children,
            roots,
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Category> {
        self.by_id.get(id).map(|&idx| &self.categories[idx])
    }

    fn children_of(&self, id: &str) -> &[usize] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct children of `id` in input order.
    pub fn children(&self, id: &str) -> impl Iterator<Item = &'a Category> + '_ {
        let categories = self.categories;
        self.children_of(id).iter().map(move |&idx| &categories[idx])
    }

    /// Pre-order listing of every input entry exactly once.
    ///
    /// Roots are walked first in input order. Entries unreachable from any
    /// root hang off a parent cycle; each such group is entered at a cycle
    /// member and the edge closing the cycle is dropped, leaving the last
    /// member as an unexpanded leaf.
    pub fn flatten(&self) -> Vec<FlatCategory> {
        let mut visited = vec![false; self.categories.len()];
        let mut out = Vec::with_capacity(self.categories.len());

        for &root in &self.roots {
            self.walk(root, &mut visited, &mut out);
        }

        if out.len() < self.categories.len() {
            let stranded = self.categories.len() - out.len();
            tracing::warn!(
                "Category listing contains {} entries on a parent cycle",
                stranded
            );
            for idx in 0..self.categories.len() {
                if !visited[idx] {
                    let entry = self.cycle_entry(idx);
                    self.walk(entry, &mut visited, &mut out);
                }
            }
        }

        out
    }

    /// Climb parent pointers from a stranded entry until the chain repeats;
    /// the first repeated entry lies on the cycle.
    fn cycle_entry(&self, start: usize) -> usize {
        let mut seen = HashSet::new();
        let mut current = start;
        while seen.insert(current) {
            match self.parent_index(current) {
                Some(parent) => current = parent,
                None => return current,
            }
        }
        current
    }

    fn parent_index(&self, idx: usize) -> Option<usize> {
        self.categories[idx]
            .parent_id
            .as_deref()
            .and_then(|parent| self.by_id.get(parent).copied())
    }

    fn walk(&self, start: usize, visited: &mut [bool], out: &mut Vec<FlatCategory>) {
        // (index, depth, parent path)
        let mut stack: Vec<(usize, usize, String)> = vec![(start, 0, String::new())];

        while let Some((idx, depth, parent_path)) = stack.pop() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let category = &self.categories[idx];
            let path = if parent_path.is_empty() {
                category.slug.clone()
            } else {
                format!("{}/{}", parent_path, category.slug)
            };

            // Reverse push keeps siblings in input order when popped.
            for &child in self.children_of(&category.id).iter().rev() {
                if !visited[child] {
                    stack.push((child, depth + 1, path.clone()));
                }
            }

            out.push(FlatCategory {
                category: category.clone(),
                depth,
                path,
            });
        }
    }

    /// Every category reachable below `id` through child edges, excluding
    /// `id` itself unless it sits on a cycle through its own subtree.
    pub fn descendant_ids(&self, id: &str) -> HashSet<&'a str> {
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut queue: VecDeque<usize> = self.children_of(id).iter().copied().collect();

        while let Some(idx) = queue.pop_front() {
            let child_id = self.categories[idx].id.as_str();
            if seen.insert(child_id) {
                queue.extend(self.children_of(child_id).iter().copied());
            }
        }

        seen
    }

    /// Chain from the outermost ancestor down to `id` (inclusive).
    ///
    /// Stops climbing at a dangling parent or when the chain loops back.
    pub fn ancestors(&self, id: &str) -> Vec<&'a Category> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(id);

        while let Some(category) = current {
            if !seen.insert(category.id.as_str()) {
                break;
            }
            chain.push(category);
            current = category.parent_id.as_deref().and_then(|p| self.get(p));
        }

        chain.reverse();
        chain
    }
}

/// Flatten an unordered category collection into indented pre-order.
pub fn flatten_with_depth(categories: &[Category]) -> Vec<FlatCategory> {
    CategoryIndex::new(categories).flatten()
}

/// Categories that may become the parent of `editing_id` without creating a
/// cycle: everything except the category itself and its descendants.
///
/// In create mode (`None`) every existing category qualifies. "No parent" is
/// always legal and is not part of the returned list.
pub fn legal_reparent_targets<'a>(
    categories: &'a [Category],
    editing_id: Option<&str>,
) -> Vec<&'a Category> {
    let Some(editing_id) = editing_id else {
        return categories.iter().collect();
    };

    let index = CategoryIndex::new(categories);
    let excluded = index.descendant_ids(editing_id);

    categories
        .iter()
        .filter(|c| c.id != editing_id && !excluded.contains(c.id.as_str()))
        .collect()
}

/// Nested tree built from the pre-order listing.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryTreeNode> {
    let flat = flatten_with_depth(categories);

    let mut roots: Vec<CategoryTreeNode> = Vec::new();
    // Open chain of nodes whose subtrees are still being filled.
    let mut open: Vec<CategoryTreeNode> = Vec::new();

    for entry in flat {
        while open.len() > entry.depth {
            close_last(&mut open, &mut roots);
        }
        open.push(CategoryTreeNode {
            category: entry.category,
            depth: entry.depth,
            children: Vec::new(),
        });
    }
    while !open.is_empty() {
        close_last(&mut open, &mut roots);
    }

    roots
}

fn close_last(open: &mut Vec<CategoryTreeNode>, roots: &mut Vec<CategoryTreeNode>) {
    if let Some(node) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}
