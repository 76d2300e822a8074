//! # Folder Tree
//!
//! Folders are stored flat with a `parent_id`. The display tree is derived
//! from that list on every reload, in one iterative pass:
//!
//! ```text
//! [Work(p=None), Rust(p=Work), Home(p=None)]
//!         │
//!         ▼  explicit stack, visited set
//! Work        depth 0
//! └─ Rust     depth 1
//! Home        depth 0
//! ```
//!
//! Nothing holds a live reference to its parent or children, so a damaged
//! parent graph cannot recurse forever. Folders that are unreachable from a
//! root (a parent cycle) are surfaced as extra roots.

use std::collections::{HashMap, HashSet};

use crate::core::model::{Folder, FolderId};

/// One row of the flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    pub folder: Folder,
    pub depth: usize,
    pub children: Vec<FolderId>,
    /// Notes directly inside this folder.
    pub note_count: u64,
    pub expanded: bool,
    /// Every ancestor is expanded.
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderTree {
    /// Pre-order: parents before children, siblings in display order.
    pub nodes: Vec<FolderNode>,
}

impl FolderTree {
    pub fn build(
        folders: &[Folder],
        note_counts: &HashMap<FolderId, u64>,
        expanded: &HashSet<FolderId>,
    ) -> Self {
        let known: HashSet<FolderId> = folders.iter().map(|f| f.id).collect();

        let mut ordered: Vec<&Folder> = folders.iter().collect();
        ordered.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut children: HashMap<FolderId, Vec<&Folder>> = HashMap::new();
        let mut roots: Vec<&Folder> = Vec::new();
        for folder in ordered.iter().copied() {
            match folder.parent_id {
                Some(parent) if parent != folder.id && known.contains(&parent) => {
                    children.entry(parent).or_default().push(folder)
                }
                _ => roots.push(folder),
            }
        }

        let mut nodes = Vec::with_capacity(folders.len());
        let mut visited: HashSet<FolderId> = HashSet::new();

        // Cycle members never appear under a root; once the real roots are
        // drained, the lowest remaining id starts a new walk.
        let mut leftovers: Vec<&Folder> = ordered.clone();
        leftovers.sort_by_key(|f| f.id);
        let mut extra_roots = leftovers.into_iter();

        let mut pending_roots = roots.into_iter();
        loop {
            let root = match pending_roots.next() {
                Some(root) => root,
                None => match extra_roots.find(|f| !visited.contains(&f.id)) {
                    Some(root) => root,
                    None => break,
                },
            };
            if visited.contains(&root.id) {
                continue;
            }

            // (folder, depth, ancestors all expanded)
            let mut stack = vec![(root, 0usize, true)];
            while let Some((folder, depth, visible)) = stack.pop() {
                if !visited.insert(folder.id) {
                    continue;
                }
                let kids: Vec<&Folder> = children
                    .get(&folder.id)
                    .map(|v| v.iter().copied().filter(|c| !visited.contains(&c.id)).collect())
                    .unwrap_or_default();
                let is_expanded = expanded.contains(&folder.id);

                for kid in kids.iter().rev() {
                    stack.push((*kid, depth + 1, visible && is_expanded));
                }

                nodes.push(FolderNode {
                    folder: folder.clone(),
                    depth,
                    children: kids.iter().map(|k| k.id).collect(),
                    note_count: note_counts.get(&folder.id).copied().unwrap_or(0),
                    expanded: is_expanded,
                    visible,
                });
            }
        }

        Self { nodes }
    }

    /// Rows to draw, honouring collapsed folders.
    pub fn visible(&self) -> impl Iterator<Item = &FolderNode> {
        self.nodes.iter().filter(|n| n.visible)
    }

    pub fn get(&self, id: FolderId) -> Option<&FolderNode> {
        self.nodes.iter().find(|n| n.folder.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// True if making `new_parent` the parent of `folder` would close a loop.
pub fn would_cycle(
    links: &[(FolderId, Option<FolderId>)],
    folder: FolderId,
    new_parent: Option<FolderId>,
) -> bool {
    let parents: HashMap<FolderId, Option<FolderId>> = links.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut cursor = new_parent;
    while let Some(id) = cursor {
        if id == folder {
            return true;
        }
        if !seen.insert(id) {
            // Pre-existing loop that does not include `folder`.
            return false;
        }
        cursor = parents.get(&id).copied().flatten();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_folder;

    fn names(tree: &FolderTree) -> Vec<(String, usize)> {
        tree.visible()
            .map(|n| (n.folder.name.clone(), n.depth))
            .collect()
    }

    #[test]
    fn test_preorder_with_depths() {
        let folders = vec![
            sample_folder(1, "Work", None),
            sample_folder(2, "Rust", Some(1)),
            sample_folder(3, "Home", None),
            sample_folder(4, "Async", Some(2)),
        ];
        let expanded: HashSet<_> = [1, 2].into_iter().collect();
        let tree = FolderTree::build(&folders, &HashMap::new(), &expanded);
        assert_eq!(
            names(&tree),
            vec![
                ("Home".to_string(), 0),
                ("Work".to_string(), 0),
                ("Rust".to_string(), 1),
                ("Async".to_string(), 2),
            ]
        );
        assert_eq!(tree.get(1).unwrap().children, vec![2]);
    }

    #[test]
    fn test_collapsed_hides_descendants() {
        let folders = vec![
            sample_folder(1, "Work", None),
            sample_folder(2, "Rust", Some(1)),
            sample_folder(3, "Async", Some(2)),
        ];
        let expanded: HashSet<_> = [2].into_iter().collect();
        let tree = FolderTree::build(&folders, &HashMap::new(), &expanded);
        assert_eq!(names(&tree), vec![("Work".to_string(), 0)]);
        assert_eq!(tree.nodes.len(), 3);
    }

    #[test]
    fn test_cycle_is_broken_not_followed() {
        let folders = vec![
            sample_folder(1, "A", Some(2)),
            sample_folder(2, "B", Some(1)),
            sample_folder(3, "Self", Some(3)),
        ];
        let expanded: HashSet<_> = [1, 2, 3].into_iter().collect();
        let tree = FolderTree::build(&folders, &HashMap::new(), &expanded);
        assert_eq!(tree.nodes.len(), 3);
        let self_node = tree.get(3).unwrap();
        assert_eq!(self_node.depth, 0);
        assert!(tree.nodes.iter().all(|n| n.depth <= 1));
    }

    #[test]
    fn test_orphan_becomes_root_and_counts_attach() {
        let folders = vec![sample_folder(5, "Lost", Some(99))];
        let counts: HashMap<_, _> = [(5, 4)].into_iter().collect();
        let tree = FolderTree::build(&folders, &counts, &HashSet::new());
        let node = tree.get(5).unwrap();
        assert_eq!(node.depth, 0);
        assert_eq!(node.note_count, 4);
        assert!(node.visible);
    }

    #[test]
    fn test_would_cycle() {
        let links = vec![(1, None), (2, Some(1)), (3, Some(2))];
        assert!(would_cycle(&links, 1, Some(3)));
        assert!(would_cycle(&links, 2, Some(2)));
        assert!(!would_cycle(&links, 3, Some(1)));
        assert!(!would_cycle(&links, 2, None));
    }
}
