//! Property-based tests for the file tree.

use super::{Entry, FileTree};
use crate::path;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_.-]{1,12}".prop_filter("relative references are not names", |s| {
        s != "." && s != ".."
    })
}

fn dir_path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(name_strategy(), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // mkdir twice yields the same tree as mkdir once
    #[test]
    fn mkdir_idempotent(parts in dir_path_strategy()) {
        let dir = format!("/{}", parts.join("/"));
        let mut tree = FileTree::new();
        tree.mkdir(&dir).unwrap();
        let once = tree.clone();
        tree.mkdir(&dir).unwrap();
        prop_assert_eq!(tree, once);
    }

    // Every inserted file is found again with the same content
    #[test]
    fn inserted_entries_are_found(
        dirs in prop::collection::vec(dir_path_strategy(), 1..5),
        file in name_strategy(),
    ) {
        let mut tree = FileTree::new();
        let mut inserted = Vec::new();
        for parts in dirs {
            let dir = format!("/d/{}", parts.join("/"));
            // A previously inserted file may shadow part of this path.
            if tree.mkdir(&dir).is_err() {
                continue;
            }
            let file_path = path::join(&dir, &file);
            if tree.get_entry(&file_path).is_err() {
                tree.add_file(&dir, &file, format!("/src{file_path}")).unwrap();
                inserted.push(file_path);
            }
        }
        for file_path in inserted {
            let expected = Entry::Regular {
                source: format!("/src{file_path}").into(),
                mode: None,
            };
            prop_assert_eq!(tree.get_entry(&file_path).unwrap(), &expected);
        }
    }

    // Walk visits each entry once, directories before their children
    #[test]
    fn walk_visits_parents_first(dirs in prop::collection::vec(dir_path_strategy(), 1..8)) {
        let mut tree = FileTree::new();
        for parts in &dirs {
            tree.mkdir(&format!("/{}", parts.join("/"))).unwrap();
        }

        let mut seen = BTreeSet::new();
        let mut visits = 0;
        tree.walk(|entry_path, _| {
            visits += 1;
            let (parent, _) = path::split(entry_path);
            assert!(path::is_root(&parent) || seen.contains(&parent));
            seen.insert(entry_path.to_string());
            Ok(())
        }).unwrap();

        let mut expected = BTreeSet::new();
        for parts in &dirs {
            for depth in 1..=parts.len() {
                expected.insert(format!("/{}", parts[..depth].join("/")));
            }
        }

        prop_assert_eq!(visits, expected.len());
        prop_assert_eq!(seen, expected);
    }

    // Canonicalization is idempotent and always absolute
    #[test]
    fn canonicalize_idempotent(raw in "[a-z/.]{0,30}") {
        let once = path::canonicalize(&raw);
        prop_assert!(once.starts_with('/'));
        prop_assert!(!once.contains("//"));
        prop_assert_eq!(path::canonicalize(&once), once);
    }
}
