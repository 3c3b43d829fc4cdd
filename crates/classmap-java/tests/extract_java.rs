//! Java extraction and indexing against real source files.

use std::fs;
use std::path::{Path, PathBuf};

use classmap_core::discovery::SourceDiscovery;
use classmap_core::examiner::{examine_path, Examiner, IndexOptions};
use classmap_core::model::TypeKind;
use classmap_core::namespace::NamespaceTree;
use classmap_core::resolve::{ImportScope, ResolveOptions};
use classmap_core::snapshot;
use classmap_core::syntax::GrammarParser;
use classmap_java::{JavaExaminer, JavaGrammar, TreeSitterJavaParser};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/java_test")
}

fn parser() -> TreeSitterJavaParser {
    TreeSitterJavaParser::new(JavaGrammar::shared()).unwrap()
}

fn discovery() -> SourceDiscovery {
    SourceDiscovery::new(JavaExaminer.extensions(), &[] as &[&str]).unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

mod fixture {
    use super::*;

    #[test]
    fn test_class_declarations() {
        let path = fixtures().join("test/TestClass.java");
        let source = fs::read(&path).unwrap();
        let tree = parser().parse(&source).unwrap();
        let examined = JavaExaminer.examine(&path, &tree).unwrap();

        assert_eq!(examined.namespace, vec!["test"]);
        assert_eq!(examined.file.name(), "TestClass.java");
        assert!(examined.file.imports().is_empty());

        let class = examined.file.get_type("TestClass").unwrap();
        assert_eq!(class.kind, TypeKind::Class);
        assert_eq!(class.modifiers, vec!["public"]);

        let value = &class.fields["value"];
        assert_eq!(value.type_name, "int");
        assert_eq!(value.modifier_string(), "private");

        let main = &class.methods["main"];
        assert_eq!(main.return_type, "void");
        assert!(main.is_public() && main.is_static());
        assert_eq!(main.parameters[0].type_name, "String[]");
        assert_eq!(class.methods["getValue"].return_type, "int");
        assert_eq!(class.methods["TestClass"].parameters[0].name, "_value");

        let ids: Vec<&str> = class.type_identifiers.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["String", "TestClass"]);
    }

    #[test]
    fn fixture_directory_indexes_into_package() {
        let mut tree = NamespaceTree::new();
        let summary = examine_path(
            &mut tree,
            &fixtures(),
            &discovery(),
            &mut parser(),
            &JavaExaminer,
            &IndexOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.examined, 1);
        assert!(summary.failures.is_empty());
        let ns = tree.find_qualified("test").unwrap();
        let file = tree.file(ns, "TestClass.java").unwrap();
        assert_eq!(file.namespace_path().to_vec(), vec!["test".to_string()]);

        // Self-reference resolves within the package; String does not.
        let refs = file.resolved_for("TestClass").unwrap();
        let targets: Vec<String> = refs.iter().map(|r| r.target.qualified_name()).collect();
        assert_eq!(targets, vec!["test.TestClass"]);
    }
}

mod project {
    use super::*;

    fn sample_project(root: &Path) {
        write(
            root,
            "src/app/model/User.java",
            "package app.model;\n\npublic class User {\n    private String name;\n    public static class Builder {}\n}\n",
        );
        write(
            root,
            "src/app/model/Role.java",
            "package app.model;\n\npublic enum Role { ADMIN, GUEST }\n",
        );
        write(
            root,
            "src/app/service/UserService.java",
            "package app.service;\n\nimport app.model.User;\nimport app.model.*;\nimport java.util.List;\n\n\
             public class UserService {\n    private List<User> users;\n    public Role roleOf(User user) { return null; }\n}\n",
        );
    }

    #[test]
    fn imports_resolve_across_packages() {
        let temp = TempDir::new().unwrap();
        sample_project(temp.path());

        let mut tree = NamespaceTree::new();
        let summary = examine_path(
            &mut tree,
            temp.path(),
            &discovery(),
            &mut parser(),
            &JavaExaminer,
            &IndexOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.examined, 3);
        assert_eq!(tree.type_count(), 4);

        let service = tree.find_qualified("app.service").unwrap();
        let refs = tree
            .file(service, "UserService.java")
            .unwrap()
            .resolved_for("UserService")
            .unwrap();
        let resolved: Vec<(String, String)> = refs
            .iter()
            .map(|r| (r.identifier.clone(), r.target.qualified_name()))
            .collect();
        // List comes from an unindexed package; Role is only reachable
        // through the on-demand import, which binds no name.
        assert_eq!(
            resolved,
            vec![("User".to_string(), "app.model.User".to_string())]
        );
    }

    #[test]
    fn legacy_scope_misses_cross_package_imports() {
        let temp = TempDir::new().unwrap();
        sample_project(temp.path());

        let mut tree = NamespaceTree::new();
        let options = IndexOptions {
            reindex: false,
            resolve: ResolveOptions::default().with_import_scope(ImportScope::ResolvingNamespace),
        };
        examine_path(
            &mut tree,
            temp.path(),
            &discovery(),
            &mut parser(),
            &JavaExaminer,
            &options,
        )
        .unwrap();

        let service = tree.find_qualified("app.service").unwrap();
        let file = tree.file(service, "UserService.java").unwrap();
        assert!(file
            .resolved_for("UserService")
            .is_some_and(|refs| refs.is_empty()));
    }

    #[test]
    fn snapshot_carries_java_records_between_runs() {
        let temp = TempDir::new().unwrap();
        sample_project(temp.path());
        let save = temp.path().join("classmap.json");

        let mut first = NamespaceTree::new();
        examine_path(
            &mut first,
            &temp.path().join("src/app/model"),
            &discovery(),
            &mut parser(),
            &JavaExaminer,
            &IndexOptions::default(),
        )
        .unwrap();
        snapshot::write_snapshot(&save, &snapshot::store(&first)).unwrap();

        let mut second = NamespaceTree::new();
        snapshot::load(&mut second, snapshot::read_snapshot(&save).unwrap()).unwrap();
        let summary = examine_path(
            &mut second,
            &temp.path().join("src"),
            &discovery(),
            &mut parser(),
            &JavaExaminer,
            &IndexOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.examined, 1);
        let model = second.find_qualified("app.model").unwrap();
        let user = second.file(model, "User.java").unwrap().get_type("User").unwrap();
        assert!(user.types.contains_key("Builder"));
        assert_eq!(user.fields["name"].type_name, "String");
    }
}
