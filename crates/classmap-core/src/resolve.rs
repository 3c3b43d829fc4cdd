//! Cross-file type-identifier resolution.
//!
//! After ingestion, every declared type holds raw identifiers such as `Foo`.
//! The resolution pass maps each one to a top-level declared type elsewhere in
//! the tree:
//!
//! 1. Scan the owning file's imports in order. The first import whose local
//!    name equals the identifier decides the outcome: its source namespace is
//!    resolved from the root and searched for a top-level type of that name.
//!    No fallback happens after a matching import, even when it fails.
//! 2. Otherwise search every file in the owning file's namespace.
//!
//! Unresolved identifiers are dropped. Each pass rebuilds every file's
//! resolved map from scratch and touches nothing else.
//!
//! The pass runs in two phases, compute then write, so lookups see a stable
//! tree while results are gathered.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{ResolvedReference, SourceFile, TypeRef};
use crate::namespace::{NamespaceId, NamespaceTree};

/// Where an import-matched identifier is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportScope {
    /// Search the namespace the import names.
    #[default]
    TargetNamespace,
    /// Legacy behavior: once the imported namespace is confirmed to exist,
    /// search the resolving file's own namespace instead.
    ResolvingNamespace,
}

/// Options for a resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub import_scope: ImportScope,
}

impl ResolveOptions {
    pub fn with_import_scope(mut self, import_scope: ImportScope) -> Self {
        self.import_scope = import_scope;
        self
    }
}

/// Summary of one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveStats {
    /// Files visited.
    pub files: usize,
    /// Declared types visited, nested types included.
    pub types: usize,
    /// Raw identifiers considered.
    pub identifiers: usize,
    /// Identifiers that resolved to a declared type.
    pub resolved: usize,
}

type ResolvedMap = BTreeMap<String, BTreeSet<ResolvedReference>>;

/// Resolve every raw identifier in the tree and replace each file's resolved
/// map with the result.
pub fn resolve_type_identifiers(
    tree: &mut NamespaceTree,
    options: &ResolveOptions,
) -> ResolveStats {
    if options.import_scope == ImportScope::ResolvingNamespace {
        warn!(
            "legacy import scope selected: imported names are searched in the importing namespace"
        );
    }

    let mut stats = ResolveStats::default();
    let mut updates: Vec<(NamespaceId, String, ResolvedMap)> = Vec::new();

    for (ns, file) in tree.iter_files() {
        stats.files += 1;
        let mut resolved = ResolvedMap::new();
        for (key, declared) in file.all_types() {
            stats.types += 1;
            let mut refs = BTreeSet::new();
            for identifier in &declared.type_identifiers {
                stats.identifiers += 1;
                let target = resolve_identifier(tree, ns, file, identifier, options.import_scope);
                if let Some(target) = target {
                    refs.insert(ResolvedReference {
                        identifier: identifier.clone(),
                        target,
                    });
                }
            }
            stats.resolved += refs.len();
            resolved.insert(key, refs);
        }
        updates.push((ns, file.name().to_string(), resolved));
    }

    for (ns, name, resolved) in updates {
        if let Some(file) = tree.file_mut(ns, &name) {
            file.replace_resolved(resolved);
        }
    }

    info!(
        files = stats.files,
        types = stats.types,
        identifiers = stats.identifiers,
        resolved = stats.resolved,
        "type identifiers resolved"
    );
    stats
}

/// Resolve one identifier as seen from `file`, which lives in namespace `ns`.
pub fn resolve_identifier(
    tree: &NamespaceTree,
    ns: NamespaceId,
    file: &SourceFile,
    identifier: &str,
    scope: ImportScope,
) -> Option<TypeRef> {
    if let Some(import) = file.imports().iter().find(|i| i.local == identifier) {
        let root = tree.root_of(ns);
        let target = tree.resolve_path(root, &import.source_segments())?;
        let search = match scope {
            ImportScope::TargetNamespace => target,
            ImportScope::ResolvingNamespace => ns,
        };
        return tree.find_top_level_type(search, identifier);
    }
    tree.find_top_level_type(ns, identifier)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclaredType, Import, TypeKind};

    fn declared(name: &str, identifiers: &[&str]) -> DeclaredType {
        let mut ty = DeclaredType::new(name, TypeKind::Class);
        for id in identifiers {
            ty.add_type_identifier(*id);
        }
        ty
    }

    fn add_file(
        tree: &mut NamespaceTree,
        path: &[&str],
        name: &str,
        imports: &[(&str, &str)],
        types: Vec<DeclaredType>,
    ) {
        let ns = tree.ensure_path(tree.root(), path);
        let mut file = SourceFile::new(name, name);
        for (source, local) in imports {
            file.add_import(Import::new(*source, *local));
        }
        for ty in types {
            file.add_type(ty).unwrap();
        }
        tree.insert_file(ns, file).unwrap();
    }

    fn resolved_names(tree: &NamespaceTree, path: &[&str], file: &str, key: &str) -> Vec<String> {
        let ns = tree.resolve_path(tree.root(), path).unwrap();
        tree.file(ns, file)
            .unwrap()
            .resolved_for(key)
            .map(|refs| refs.iter().map(|r| r.target.qualified_name()).collect())
            .unwrap_or_default()
    }

    mod same_namespace {
        use super::*;

        #[test]
        fn sibling_file_resolves() {
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[], vec![declared("A", &["B"])]);
            add_file(&mut tree, &["p"], "B.java", &[], vec![declared("B", &[])]);

            let stats = resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert_eq!(resolved_names(&tree, &["p"], "A.java", "A"), vec!["p.B"]);
            assert_eq!(stats.files, 2);
            assert_eq!(stats.types, 2);
            assert_eq!(stats.identifiers, 1);
            assert_eq!(stats.resolved, 1);
        }

        #[test]
        fn external_identifier_is_dropped() {
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[], vec![declared("A", &["String", "List"])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert!(resolved_names(&tree, &["p"], "A.java", "A").is_empty());
        }

        #[test]
        fn other_namespace_not_searched_without_import() {
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[], vec![declared("A", &["B"])]);
            add_file(&mut tree, &["q"], "B.java", &[], vec![declared("B", &[])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert!(resolved_names(&tree, &["p"], "A.java", "A").is_empty());
        }

        #[test]
        fn nested_types_resolve_under_dotted_key() {
            let mut tree = NamespaceTree::new();
            let mut outer = declared("A", &[]);
            outer.add_type(declared("Inner", &["B"])).unwrap();
            add_file(&mut tree, &["p"], "A.java", &[], vec![outer]);
            add_file(&mut tree, &["p"], "B.java", &[], vec![declared("B", &[])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert_eq!(resolved_names(&tree, &["p"], "A.java", "A.Inner"), vec!["p.B"]);
        }

        #[test]
        fn nested_type_is_not_a_target() {
            let mut tree = NamespaceTree::new();
            let mut holder = declared("Holder", &[]);
            holder.add_type(declared("Inner", &[])).unwrap();
            add_file(&mut tree, &["p"], "Holder.java", &[], vec![holder]);
            add_file(&mut tree, &["p"], "A.java", &[], vec![declared("A", &["Inner"])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert!(resolved_names(&tree, &["p"], "A.java", "A").is_empty());
        }
    }

    mod imports {
        use super::*;

        #[test]
        fn import_resolves_in_target_namespace() {
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[("q", "B")], vec![declared("A", &["B"])]);
            add_file(&mut tree, &["q"], "B.java", &[], vec![declared("B", &[])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert_eq!(resolved_names(&tree, &["p"], "A.java", "A"), vec!["q.B"]);
        }

        #[test]
        fn matching_import_short_circuits() {
            // The import names a namespace that lacks B; the sibling B must not
            // be used as a fallback.
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[("q", "B")], vec![declared("A", &["B"])]);
            add_file(&mut tree, &["p"], "B.java", &[], vec![declared("B", &[])]);
            add_file(&mut tree, &["q"], "Other.java", &[], vec![declared("Other", &[])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert!(resolved_names(&tree, &["p"], "A.java", "A").is_empty());
        }

        #[test]
        fn import_of_missing_namespace_is_unresolved() {
            let mut tree = NamespaceTree::new();
            let imports = [("java.util", "List")];
            add_file(&mut tree, &["p"], "A.java", &imports, vec![declared("A", &["List"])]);
            add_file(&mut tree, &["p"], "List.java", &[], vec![declared("List", &[])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert!(resolved_names(&tree, &["p"], "A.java", "A").is_empty());
        }

        #[test]
        fn first_matching_import_wins() {
            let mut tree = NamespaceTree::new();
            add_file(
                &mut tree,
                &["p"],
                "A.java",
                &[("q", "B"), ("r", "B")],
                vec![declared("A", &["B"])],
            );
            add_file(&mut tree, &["q"], "B.java", &[], vec![declared("B", &[])]);
            add_file(&mut tree, &["r"], "B.java", &[], vec![declared("B", &[])]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert_eq!(resolved_names(&tree, &["p"], "A.java", "A"), vec!["q.B"]);
        }
    }

    mod legacy_scope {
        use super::*;

        fn legacy() -> ResolveOptions {
            ResolveOptions::default().with_import_scope(ImportScope::ResolvingNamespace)
        }

        #[test]
        fn legacy_scope_searches_importing_namespace() {
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[("q", "B")], vec![declared("A", &["B"])]);
            add_file(&mut tree, &["p"], "B.java", &[], vec![declared("B", &[])]);
            add_file(&mut tree, &["q"], "B.java", &[], vec![declared("B", &[])]);

            resolve_type_identifiers(&mut tree, &legacy());
            assert_eq!(resolved_names(&tree, &["p"], "A.java", "A"), vec!["p.B"]);

            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert_eq!(resolved_names(&tree, &["p"], "A.java", "A"), vec!["q.B"]);
        }

        #[test]
        fn legacy_scope_still_requires_imported_namespace() {
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[("missing", "B")], vec![declared("A", &["B"])]);
            add_file(&mut tree, &["p"], "B.java", &[], vec![declared("B", &[])]);

            resolve_type_identifiers(&mut tree, &legacy());
            assert!(resolved_names(&tree, &["p"], "A.java", "A").is_empty());
        }
    }

    mod passes {
        use super::*;

        #[test]
        fn second_pass_replaces_previous_results() {
            let mut tree = NamespaceTree::new();
            add_file(&mut tree, &["p"], "A.java", &[], vec![declared("A", &["B"])]);
            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert!(resolved_names(&tree, &["p"], "A.java", "A").is_empty());

            add_file(&mut tree, &["p"], "B.java", &[], vec![declared("B", &[])]);
            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            assert_eq!(resolved_names(&tree, &["p"], "A.java", "A"), vec!["p.B"]);
        }

        #[test]
        fn every_type_gets_an_entry() {
            let mut tree = NamespaceTree::new();
            let types = vec![declared("A", &[]), declared("A2", &[])];
            add_file(&mut tree, &["p"], "A.java", &[], types);
            resolve_type_identifiers(&mut tree, &ResolveOptions::default());
            let ns = tree.find_qualified("p").unwrap();
            let file = tree.file(ns, "A.java").unwrap();
            assert_eq!(file.resolved().len(), 2);
            assert!(file.resolved_for("A2").unwrap().is_empty());
        }
    }
}
