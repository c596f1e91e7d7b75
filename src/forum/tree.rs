//! Reply forest of a discussion.
//!
//! Posts are stored in an arena indexed by position, with an id index and a
//! children index built once per discussion. Relevance (`has_data`) is
//! computed per node and then closed over ancestors, so a traversal that
//! skips irrelevant subtrees never loses a relevant descendant.

use std::collections::HashMap;

use super::types::PostRecord;

/// A node that can be placed in a [`PostForest`].
pub trait ForestNode {
    /// Node ID.
    fn id(&self) -> i64;
    /// Parent node ID, `None` for roots.
    fn parent(&self) -> Option<i64>;
    /// Ordering key among siblings.
    fn sort_key(&self) -> (i64, i64) {
        (0, self.id())
    }
}

impl ForestNode for PostRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent(&self) -> Option<i64> {
        self.parent
    }

    fn sort_key(&self) -> (i64, i64) {
        (self.created, self.id)
    }
}

/// A node reached by [`PostForest::relevant`], with its ancestor chain.
#[derive(Debug)]
pub struct Visit<'a, T> {
    /// The visited node.
    pub node: &'a T,
    /// Ancestors from the root down to the direct parent.
    pub ancestors: Vec<&'a T>,
}

/// Arena of posts forming one discussion's reply forest.
#[derive(Debug)]
pub struct PostForest<T> {
    nodes: Vec<T>,
    has_data: Vec<bool>,
    index: HashMap<i64, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl<T: ForestNode> PostForest<T> {
    /// Build the forest.
    ///
    /// A node whose parent is missing from `nodes` is treated as a root so
    /// that it is never silently dropped.
    pub fn build(mut nodes: Vec<T>) -> Self {
        nodes.sort_by_key(|n| n.sort_key());

        let index: HashMap<i64, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id(), i)).collect();
        let mut children = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();

        for (i, node) in nodes.iter().enumerate() {
            match node.parent().and_then(|p| index.get(&p)) {
                Some(&parent) if parent != i => children[parent].push(i),
                _ => roots.push(i),
            }
        }

        let has_data = vec![false; nodes.len()];
        Self {
            nodes,
            has_data,
            index,
            children,
            roots,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Mark every node for which `relevant` holds, together with all of its
    /// ancestors up to the root.
    pub fn mark(&mut self, relevant: impl Fn(&T) -> bool) {
        for i in 0..self.nodes.len() {
            if !relevant(&self.nodes[i]) {
                continue;
            }
            self.has_data[i] = true;

            // Bounded by the node count so a corrupt parent cycle terminates.
            let mut current = i;
            for _ in 0..self.nodes.len() {
                let Some(&parent) = self.nodes[current]
                    .parent()
                    .and_then(|p| self.index.get(&p))
                else {
                    break;
                };
                if parent == current || self.has_data[parent] {
                    break;
                }
                self.has_data[parent] = true;
                current = parent;
            }
        }
    }

    /// Whether the node with this ID is marked.
    pub fn has_data(&self, id: i64) -> bool {
        self.index.get(&id).is_some_and(|&i| self.has_data[i])
    }

    /// Depth-first walk from the roots, skipping every unmarked node and its
    /// whole subtree. Parents are yielded before their children.
    pub fn relevant(&self) -> Vec<Visit<'_, T>> {
        let mut visits = Vec::new();
        let mut stack: Vec<(usize, Vec<usize>)> =
            self.roots.iter().rev().map(|&r| (r, Vec::new())).collect();

        while let Some((i, ancestors)) = stack.pop() {
            if !self.has_data[i] {
                continue;
            }

            let mut chain = ancestors.clone();
            chain.push(i);
            for &child in self.children[i].iter().rev() {
                stack.push((child, chain.clone()));
            }

            visits.push(Visit {
                node: &self.nodes[i],
                ancestors: ancestors.iter().map(|&a| &self.nodes[a]).collect(),
            });
        }

        visits
    }
}
