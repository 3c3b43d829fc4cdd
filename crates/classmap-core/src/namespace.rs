//! Namespace tree: the hierarchical symbol table.
//!
//! Namespaces (packages) live in an arena addressed by [`NamespaceId`]. Each
//! node holds its full segment path, a non-owning parent index, its files
//! keyed by file name, and its child namespaces keyed by segment. The root has
//! the empty path.
//!
//! Invariants maintained by every mutating operation:
//! - `child.path == parent.path + [segment]`
//! - sibling segments are unique (enforced by the child map)
//! - every stored [`SourceFile`] carries the path of the namespace it lives in

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::model::{DeclaredType, IndexError, SourceFile, TypeRef};

/// Index of a namespace within its [`NamespaceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub u32);

impl NamespaceId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns_{}", self.0)
    }
}

/// Position of a stored file: its namespace and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub namespace: NamespaceId,
    pub name: String,
}

#[derive(Debug, Clone)]
struct NamespaceData {
    path: Vec<String>,
    parent: Option<NamespaceId>,
    files: BTreeMap<String, SourceFile>,
    children: BTreeMap<String, NamespaceId>,
}

impl NamespaceData {
    fn new(path: Vec<String>, parent: Option<NamespaceId>) -> Self {
        NamespaceData {
            path,
            parent,
            files: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }
}

/// Arena of namespaces rooted at the empty path.
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    nodes: Vec<NamespaceData>,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    /// Create a tree holding only the root namespace.
    pub fn new() -> Self {
        NamespaceTree {
            nodes: vec![NamespaceData::new(Vec::new(), None)],
        }
    }

    /// The root namespace.
    pub fn root(&self) -> NamespaceId {
        NamespaceId(0)
    }

    /// Number of namespaces, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always contains its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All namespace ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NamespaceId> {
        (0..self.nodes.len() as u32).map(NamespaceId)
    }

    // ------------------------------------------------------------------------
    // Node accessors
    // ------------------------------------------------------------------------

    /// Full segment path of a namespace.
    pub fn path(&self, id: NamespaceId) -> &[String] {
        &self.data(id).path
    }

    /// Last path segment; empty for the root.
    pub fn name(&self, id: NamespaceId) -> &str {
        self.data(id).path.last().map(String::as_str).unwrap_or("")
    }

    /// Dotted path, e.g. `a.b.c`; empty for the root.
    pub fn full_name(&self, id: NamespaceId) -> String {
        self.data(id).path.join(".")
    }

    pub fn parent(&self, id: NamespaceId) -> Option<NamespaceId> {
        self.data(id).parent
    }

    /// Child namespace for one segment.
    pub fn child(&self, id: NamespaceId, segment: &str) -> Option<NamespaceId> {
        self.data(id).children.get(segment).copied()
    }

    /// Child namespaces in segment order.
    pub fn children(&self, id: NamespaceId) -> impl Iterator<Item = (&str, NamespaceId)> {
        self.data(id)
            .children
            .iter()
            .map(|(segment, child)| (segment.as_str(), *child))
    }

    /// Files of a namespace in file-name order.
    pub fn files(&self, id: NamespaceId) -> impl Iterator<Item = &SourceFile> {
        self.data(id).files.values()
    }

    pub fn file(&self, id: NamespaceId, name: &str) -> Option<&SourceFile> {
        self.data(id).files.get(name)
    }

    pub fn file_mut(&mut self, id: NamespaceId, name: &str) -> Option<&mut SourceFile> {
        self.data_mut(id).files.get_mut(name)
    }

    /// Walk parent links to the top of the tree.
    pub fn root_of(&self, id: NamespaceId) -> NamespaceId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    // ------------------------------------------------------------------------
    // Path lookup
    // ------------------------------------------------------------------------

    /// Follow `segments` down from `from` without creating anything.
    ///
    /// Returns `None` as soon as a segment is missing. An empty path yields
    /// `from` itself.
    pub fn resolve_path<S: AsRef<str>>(
        &self,
        from: NamespaceId,
        segments: &[S],
    ) -> Option<NamespaceId> {
        segments
            .iter()
            .try_fold(from, |current, segment| self.child(current, segment.as_ref()))
    }

    /// Follow `segments` down from `from`, creating missing namespaces.
    ///
    /// Idempotent: calling it again with the same path returns the same id.
    pub fn ensure_path<S: AsRef<str>>(&mut self, from: NamespaceId, segments: &[S]) -> NamespaceId {
        let mut current = from;
        for segment in segments {
            current = self.ensure_child(current, segment.as_ref());
        }
        current
    }

    fn ensure_child(&mut self, id: NamespaceId, segment: &str) -> NamespaceId {
        if let Some(existing) = self.child(id, segment) {
            return existing;
        }
        let child = NamespaceId(self.nodes.len() as u32);
        let mut path = self.data(id).path.clone();
        path.push(segment.to_string());
        tracing::debug!(namespace = %path.join("."), "namespace created");
        self.nodes.push(NamespaceData::new(path, Some(id)));
        self.data_mut(id).children.insert(segment.to_string(), child);
        child
    }

    /// Look up a namespace by dotted name from the root; `""` is the root.
    pub fn find_qualified(&self, dotted: &str) -> Option<NamespaceId> {
        if dotted.is_empty() {
            return Some(self.root());
        }
        let segments: Vec<&str> = dotted.split('.').collect();
        self.resolve_path(self.root(), &segments)
    }

    // ------------------------------------------------------------------------
    // File insertion
    // ------------------------------------------------------------------------

    /// Insert a freshly examined file. A file with the same name in the same
    /// namespace is a duplicate declaration.
    pub fn insert_file(&mut self, id: NamespaceId, mut file: SourceFile) -> Result<(), IndexError> {
        if self.data(id).files.contains_key(file.name()) {
            return Err(IndexError::DuplicateFile {
                namespace: self.full_name(id),
                name: file.name().to_string(),
            });
        }
        file.set_namespace_path(self.data(id).path.clone());
        self.data_mut(id).files.insert(file.name().to_string(), file);
        Ok(())
    }

    /// Store a file, overwriting any same-name file in the namespace.
    ///
    /// Returns the file that was replaced.
    pub fn replace_file(&mut self, id: NamespaceId, mut file: SourceFile) -> Option<SourceFile> {
        file.set_namespace_path(self.data(id).path.clone());
        self.data_mut(id).files.insert(file.name().to_string(), file)
    }

    // ------------------------------------------------------------------------
    // Whole-tree queries
    // ------------------------------------------------------------------------

    /// Every file in the tree with its namespace, in namespace creation order
    /// then file-name order.
    pub fn iter_files(&self) -> impl Iterator<Item = (NamespaceId, &SourceFile)> {
        self.ids()
            .flat_map(move |id| self.files(id).map(move |file| (id, file)))
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().map(|n| n.files.len()).sum()
    }

    /// Number of declared types, nested types included.
    pub fn type_count(&self) -> usize {
        self.iter_files().map(|(_, f)| f.all_types().len()).sum()
    }

    /// Remove a file record, returning it.
    pub fn remove_file(&mut self, id: NamespaceId, name: &str) -> Option<SourceFile> {
        self.data_mut(id).files.remove(name)
    }

    /// True if any file in the tree was read from `path`.
    ///
    /// Paths are compared after canonicalization when both sides exist, so a
    /// relative and an absolute spelling of the same file match.
    pub fn contains_file_at_path(&self, path: &Path) -> bool {
        let wanted = canonical_path(path);
        self.iter_files()
            .any(|(_, file)| canonical_path(file.locator()) == wanted)
    }

    /// Where each stored file lives, keyed by its canonical locator.
    ///
    /// Builds the whole map in one pass; use it instead of repeated
    /// [`contains_file_at_path`](Self::contains_file_at_path) calls.
    pub fn indexed_paths(&self) -> BTreeMap<PathBuf, FileLocation> {
        self.iter_files()
            .map(|(namespace, file)| {
                let location = FileLocation {
                    namespace,
                    name: file.name().to_string(),
                };
                (canonical_path(file.locator()), location)
            })
            .collect()
    }

    /// Source paths of the files directly in a namespace.
    pub fn source_files(&self, id: NamespaceId) -> BTreeSet<PathBuf> {
        self.files(id).map(|f| f.locator().to_path_buf()).collect()
    }

    /// Directories holding the files directly in a namespace.
    pub fn source_locations(&self, id: NamespaceId) -> BTreeSet<PathBuf> {
        self.files(id)
            .filter_map(|f| f.locator().parent().map(Path::to_path_buf))
            .collect()
    }

    /// First top-level type named `name` among the files of namespace `id`,
    /// in file-name order.
    pub fn find_top_level_type(&self, id: NamespaceId, name: &str) -> Option<TypeRef> {
        self.files(id)
            .find(|file| file.get_type(name).is_some())
            .map(|file| TypeRef {
                namespace: self.path(id).to_vec(),
                file: file.name().to_string(),
                name: name.to_string(),
            })
    }

    /// Resolve `package.name` to a top-level type in that package.
    pub fn resolve_fully_qualified_name(&self, package: &str, name: &str) -> Option<TypeRef> {
        let id = self.find_qualified(package)?;
        self.find_top_level_type(id, name)
    }

    /// Dereference a [`TypeRef`].
    pub fn get_type(&self, type_ref: &TypeRef) -> Option<&DeclaredType> {
        let id = self.resolve_path(self.root(), &type_ref.namespace)?;
        self.file(id, &type_ref.file)?.get_type(&type_ref.name)
    }

    fn data(&self, id: NamespaceId) -> &NamespaceData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NamespaceId) -> &mut NamespaceData {
        &mut self.nodes[id.index()]
    }
}

/// `path` canonicalized, or unchanged when it does not exist.
pub fn canonical_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;

    fn file_with_types(name: &str, types: &[&str]) -> SourceFile {
        let mut file = SourceFile::new(name, format!("src/{}", name));
        for ty in types {
            file.add_type(DeclaredType::new(*ty, TypeKind::Class)).unwrap();
        }
        file
    }

    mod paths {
        use super::*;

        #[test]
        fn root_has_empty_path_and_name() {
            let tree = NamespaceTree::new();
            let root = tree.root();
            assert!(tree.path(root).is_empty());
            assert_eq!(tree.name(root), "");
            assert_eq!(tree.full_name(root), "");
            assert!(tree.parent(root).is_none());
        }

        #[test]
        fn ensure_path_is_idempotent() {
            let mut tree = NamespaceTree::new();
            let root = tree.root();
            let first = tree.ensure_path(root, &["a", "b", "c"]);
            let count = tree.len();
            let second = tree.ensure_path(root, &["a", "b", "c"]);
            assert_eq!(first, second);
            assert_eq!(tree.len(), count);
            assert_eq!(tree.len(), 4);
        }

        #[test]
        fn child_path_extends_parent_path() {
            let mut tree = NamespaceTree::new();
            let root = tree.root();
            let leaf = tree.ensure_path(root, &["a", "b"]);
            let parent = tree.parent(leaf).unwrap();
            let mut expected = tree.path(parent).to_vec();
            expected.push("b".to_string());
            assert_eq!(tree.path(leaf), expected.as_slice());
            assert_eq!(tree.name(leaf), "b");
            assert_eq!(tree.full_name(leaf), "a.b");
        }

        #[test]
        fn resolve_path_does_not_create() {
            let mut tree = NamespaceTree::new();
            let root = tree.root();
            tree.ensure_path(root, &["a"]);
            assert!(tree.resolve_path(root, &["a", "b"]).is_none());
            assert_eq!(tree.len(), 2);
            assert_eq!(tree.resolve_path::<&str>(root, &[]), Some(root));
        }

        #[test]
        fn ensure_then_resolve_round_trips() {
            let mut tree = NamespaceTree::new();
            let root = tree.root();
            let leaf = tree.ensure_path(root, &["x", "y"]);
            assert_eq!(tree.resolve_path(root, &["x", "y"]), Some(leaf));
            let mid = tree.resolve_path(root, &["x"]).unwrap();
            assert_eq!(tree.resolve_path(mid, &["y"]), Some(leaf));
        }

        #[test]
        fn root_of_walks_to_top() {
            let mut tree = NamespaceTree::new();
            let root = tree.root();
            let leaf = tree.ensure_path(root, &["a", "b", "c"]);
            assert_eq!(tree.root_of(leaf), root);
            assert_eq!(tree.root_of(root), root);
        }

        #[test]
        fn find_qualified_splits_on_dots() {
            let mut tree = NamespaceTree::new();
            let root = tree.root();
            let leaf = tree.ensure_path(root, &["com", "example"]);
            assert_eq!(tree.find_qualified("com.example"), Some(leaf));
            assert_eq!(tree.find_qualified(""), Some(root));
            assert!(tree.find_qualified("com.other").is_none());
        }

        #[test]
        fn children_are_ordered_by_segment() {
            let mut tree = NamespaceTree::new();
            let root = tree.root();
            tree.ensure_path(root, &["zeta"]);
            tree.ensure_path(root, &["alpha"]);
            let names: Vec<&str> = tree.children(root).map(|(s, _)| s).collect();
            assert_eq!(names, vec!["alpha", "zeta"]);
        }
    }

    mod files {
        use super::*;

        #[test]
        fn insert_sets_namespace_path() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            tree.insert_file(ns, file_with_types("A.java", &["A"])).unwrap();
            let file = tree.file(ns, "A.java").unwrap();
            assert_eq!(file.namespace_path(), &["p".to_string()]);
        }

        #[test]
        fn duplicate_file_is_rejected() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            tree.insert_file(ns, file_with_types("A.java", &["A"])).unwrap();
            let err = tree
                .insert_file(ns, file_with_types("A.java", &["Other"]))
                .unwrap_err();
            assert!(matches!(err, IndexError::DuplicateFile { .. }));
            assert!(tree.file(ns, "A.java").unwrap().get_type("A").is_some());
        }

        #[test]
        fn replace_file_overwrites() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            tree.insert_file(ns, file_with_types("A.java", &["A"])).unwrap();
            let previous = tree.replace_file(ns, file_with_types("A.java", &["B"]));
            assert!(previous.is_some());
            let file = tree.file(ns, "A.java").unwrap();
            assert!(file.get_type("A").is_none());
            assert!(file.get_type("B").is_some());
        }

        #[test]
        fn counts_include_nested_types() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            let mut file = SourceFile::new("A.java", "src/A.java");
            let mut outer = DeclaredType::new("A", TypeKind::Class);
            outer
                .add_type(DeclaredType::new("Inner", TypeKind::Class))
                .unwrap();
            file.add_type(outer).unwrap();
            tree.insert_file(ns, file).unwrap();
            tree.insert_file(tree.root(), file_with_types("B.java", &["B"]))
                .unwrap();

            assert_eq!(tree.file_count(), 2);
            assert_eq!(tree.type_count(), 3);
        }

        #[test]
        fn source_files_and_locations() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            tree.insert_file(ns, file_with_types("A.java", &["A"])).unwrap();
            tree.insert_file(ns, file_with_types("B.java", &["B"])).unwrap();

            let files = tree.source_files(ns);
            assert_eq!(files.len(), 2);
            assert!(files.contains(Path::new("src/A.java")));
            let dirs = tree.source_locations(ns);
            assert_eq!(dirs.into_iter().collect::<Vec<_>>(), vec![PathBuf::from("src")]);
        }

        #[test]
        fn contains_file_at_path_searches_whole_tree() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["deep", "er"]);
            tree.insert_file(ns, file_with_types("A.java", &["A"])).unwrap();
            assert!(tree.contains_file_at_path(Path::new("src/A.java")));
            assert!(!tree.contains_file_at_path(Path::new("src/B.java")));
        }

        #[test]
        fn indexed_paths_locate_every_file() {
            let mut tree = NamespaceTree::new();
            let deep = tree.ensure_path(tree.root(), &["deep"]);
            tree.insert_file(deep, file_with_types("A.java", &["A"])).unwrap();
            let root = tree.root();
            tree.insert_file(root, file_with_types("B.java", &["B"])).unwrap();

            let paths = tree.indexed_paths();
            assert_eq!(paths.len(), 2);
            assert_eq!(
                paths[Path::new("src/A.java")],
                FileLocation {
                    namespace: deep,
                    name: "A.java".to_string()
                }
            );
            assert_eq!(paths[Path::new("src/B.java")].namespace, root);
        }

        #[test]
        fn remove_file_drops_record() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            tree.insert_file(ns, file_with_types("A.java", &["A"])).unwrap();
            assert!(tree.remove_file(ns, "A.java").is_some());
            assert!(tree.remove_file(ns, "A.java").is_none());
            assert_eq!(tree.file_count(), 0);
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn find_top_level_type_in_file_order() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            tree.insert_file(ns, file_with_types("B.java", &["Shared"])).unwrap();
            tree.insert_file(ns, file_with_types("A.java", &["Shared"])).unwrap();
            let found = tree.find_top_level_type(ns, "Shared").unwrap();
            assert_eq!(found.file, "A.java");
        }

        #[test]
        fn nested_types_are_not_top_level() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["p"]);
            let mut file = SourceFile::new("A.java", "src/A.java");
            let mut outer = DeclaredType::new("A", TypeKind::Class);
            outer
                .add_type(DeclaredType::new("Inner", TypeKind::Class))
                .unwrap();
            file.add_type(outer).unwrap();
            tree.insert_file(ns, file).unwrap();
            assert!(tree.find_top_level_type(ns, "Inner").is_none());
        }

        #[test]
        fn fully_qualified_and_get_type() {
            let mut tree = NamespaceTree::new();
            let ns = tree.ensure_path(tree.root(), &["a", "b"]);
            tree.insert_file(ns, file_with_types("C.java", &["C"])).unwrap();

            let type_ref = tree.resolve_fully_qualified_name("a.b", "C").unwrap();
            assert_eq!(type_ref.qualified_name(), "a.b.C");
            assert_eq!(tree.get_type(&type_ref).unwrap().name, "C");
            assert!(tree.resolve_fully_qualified_name("a", "C").is_none());
            assert!(tree.resolve_fully_qualified_name("x.y", "C").is_none());
        }
    }
}
