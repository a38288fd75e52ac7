//! Assemble the nested view of a user's workspace from flat parent links.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// One stored entity as it comes out of the store: its id, its display
/// name, and the id of the directory it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry<K> {
    pub id: K,
    pub name: String,
    pub parent: Option<K>,
    pub summary: Option<String>,
}

impl<K> FlatEntry<K> {
    pub fn new(id: K, name: impl Into<String>, parent: Option<K>) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TreeNode<K> {
    #[serde(rename = "D")]
    Directory {
        id: K,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
        children: Vec<TreeNode<K>>,
    },
    #[serde(rename = "F")]
    File { id: K, name: String },
}

impl<K> TreeNode<K> {
    pub fn id(&self) -> &K {
        match self {
            TreeNode::Directory { id, .. } | TreeNode::File { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } | TreeNode::File { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[TreeNode<K>] {
        match self {
            TreeNode::Directory { children, .. } => children,
            TreeNode::File { .. } => &[],
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }
}

struct Index<'a, K> {
    dirs: HashMap<Option<K>, Vec<&'a FlatEntry<K>>>,
    files: HashMap<Option<K>, Vec<&'a FlatEntry<K>>>,
}

impl<'a, K> Index<'a, K>
where
    K: Copy + Eq + Hash,
{
    fn new(files: &'a [FlatEntry<K>], dirs: &'a [FlatEntry<K>]) -> Self {
        let mut index = Self {
            dirs: HashMap::new(),
            files: HashMap::new(),
        };
        for dir in dirs {
            index.dirs.entry(dir.parent).or_default().push(dir);
        }
        for file in files {
            index.files.entry(file.parent).or_default().push(file);
        }
        index
    }

    fn level(&self, parent: Option<K>, visited: &mut HashSet<K>) -> Vec<TreeNode<K>> {
        let mut nodes = Vec::new();

        for dir in self.dirs.get(&parent).into_iter().flatten() {
            // duplicated ids must not be expanded twice
            if !visited.insert(dir.id) {
                continue;
            }
            let children = self.level(Some(dir.id), visited);
            nodes.push(TreeNode::Directory {
                id: dir.id,
                name: dir.name.clone(),
                summary: dir.summary.clone(),
                children,
            });
        }

        for file in self.files.get(&parent).into_iter().flatten() {
            nodes.push(TreeNode::File {
                id: file.id,
                name: file.name.clone(),
            });
        }

        nodes
    }
}

/// Build the forest of root directories and root files.
///
/// Runs in time linear to the input and does not depend on input order.
/// Entries whose parent id is not among `dirs`, and everything below them,
/// are left out. Directories that only reach each other through a cycle
/// never hang off a root and are left out the same way. Within a level,
/// directories come before files and both keep their input order.
pub fn build_tree<K>(files: &[FlatEntry<K>], dirs: &[FlatEntry<K>]) -> Vec<TreeNode<K>>
where
    K: Copy + Eq + Hash,
{
    let index = Index::new(files, dirs);
    let mut visited = HashSet::with_capacity(dirs.len());
    index.level(None, &mut visited)
}
