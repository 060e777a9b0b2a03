use super::*;
use crate::arena::NodeId;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

fn validate_tree<T: Eq + Hash + Clone + Debug>(t: &PrefixTree<T>) {
    let mut seen = vec![false; t.arena.len()];
    let mut stack: Vec<NodeId> = Vec::new();

    for (key, &id) in &t.roots {
        assert_eq!(
            t.arena.node(id).label.first(),
            Some(key),
            "root key must equal the first label symbol"
        );
        stack.push(id);
    }

    while let Some(id) = stack.pop() {
        assert!(!seen[id.index()], "node reachable from two parents");
        seen[id.index()] = true;

        let node = t.arena.node(id);
        assert!(!node.label.is_empty(), "empty label");
        for (key, &child) in &node.children {
            assert_eq!(
                t.arena.node(child).label.first(),
                Some(key),
                "child key must equal the first label symbol"
            );
            stack.push(child);
        }
    }

    assert!(seen.iter().all(|&s| s), "arena holds an unreachable node");
}

fn validate_dict<T: Eq + Hash + Clone + Debug>(d: &DelimitedDictionary<T>) {
    validate_tree(&d.heads);

    let mut referenced = vec![false; d.tails.len()];
    for (_, node) in d.heads.arena.iter() {
        if let Some(subtree) = node.secondary {
            assert!(subtree.index() < d.tails.len(), "dangling tail tree");
            assert!(!referenced[subtree.index()], "tail tree shared by two heads");
            referenced[subtree.index()] = true;
        }
    }
    assert!(referenced.iter().all(|&r| r), "orphaned tail tree");

    for tails in &d.tails {
        assert!(!tails.is_empty(), "tail trees are created with a member");
        validate_tree(tails);
        assert!(
            tails.arena.iter().all(|(_, node)| node.secondary.is_none()),
            "tail trees never nest"
        );
    }
}

fn word_strategy() -> impl Strategy<Value = Vec<u8>> {
    // A small alphabet forces shared prefixes and splits.
    prop::collection::vec(prop::sample::select(b"abc-".to_vec()), 0..=8)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    Insert(#[proptest(strategy = "word_strategy()")] Vec<u8>),
    Get(#[proptest(strategy = "word_strategy()")] Vec<u8>),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_completion(ops in prop::collection::vec(any::<Op>(), 0..=300)) {
        let mut t: PrefixTree<u8> = PrefixTree::new();
        let mut inserted: Vec<Vec<u8>> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(word) => {
                    let before = t.contains(&word);
                    let changed = t.insert(&word);
                    prop_assert_eq!(changed, !word.is_empty() && !before);
                    if !word.is_empty() {
                        prop_assert!(t.contains(&word));
                        inserted.push(word);
                    }
                }
                Op::Get(word) => {
                    let found = t.get(&word);
                    if word.is_empty() {
                        prop_assert_eq!(found, None);
                    } else if t.contains(&word) {
                        prop_assert_eq!(found, Some(word));
                    }
                }
            }
        }

        validate_tree(&t);
        let paths: HashSet<Vec<u8>> = t.iter().collect();
        prop_assert_eq!(paths.len(), t.node_count());

        for word in &inserted {
            prop_assert!(paths.contains(word));
            let got = t.get(word);
            prop_assert_eq!(got.as_ref(), Some(word));
            for end in 1..word.len() {
                let prefix = &word[..end];
                let found = t.get(prefix);
                prop_assert!(found.is_some(), "prefix {:?} of {:?} not found", prefix, word);
                let found = found.unwrap_or_default();
                prop_assert!(found.starts_with(prefix));
                prop_assert!(word.starts_with(&found));
            }
        }
    }

    #[test]
    fn prop_dict_completion(ops in prop::collection::vec(any::<Op>(), 0..=300)) {
        let mut d: DelimitedDictionary<u8> = DelimitedDictionary::new(b'-');
        let mut inserted: Vec<Vec<u8>> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(word) => {
                    let has_head = word.first().is_some_and(|&s| s != b'-');
                    let before = d.contains(&word);
                    let changed = d.insert(&word);
                    prop_assert_eq!(changed, has_head && !before);
                    if has_head {
                        prop_assert!(d.contains(&word));
                        inserted.push(word);
                    }
                }
                Op::Get(word) => {
                    let got = d.get(&word);
                    let resolved = d.resolve(&word);
                    match resolved {
                        Ok(full) => prop_assert_eq!(got, Some(full)),
                        Err(ResolveError::UnresolvedTail { partial }) => {
                            prop_assert_eq!(partial.last(), Some(&b'-'));
                            prop_assert_eq!(got, Some(partial));
                        }
                        Err(_) => prop_assert_eq!(got, None),
                    }
                }
            }
        }

        validate_dict(&d);
        for word in &inserted {
            let got = d.get(word);
            prop_assert_eq!(got.as_ref(), Some(word));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn all_prefixes(words: &[Vec<u8>]) -> Vec<Vec<u8>> {
    let mut queries: Vec<Vec<u8>> = words
        .iter()
        .flat_map(|w| (1..=w.len()).map(move |end| w[..end].to_vec()))
        .collect();
    queries.sort();
    queries.dedup();
    queries
}

#[test]
fn exhaustive_insert_order_tree() {
    let words: Vec<Vec<u8>> = ["a", "b", "ab", "abc", "abd", "ba"]
        .map(|w| w.as_bytes().to_vec())
        .into();
    let queries = all_prefixes(&words);

    let reference: PrefixTree<u8> = words.iter().collect();
    let expected_paths: HashSet<Vec<u8>> = reference.iter().collect();
    let expected: Vec<Option<Vec<u8>>> = queries.iter().map(|q| reference.get(q)).collect();

    for_each_permutation(&words, |perm| {
        let t: PrefixTree<u8> = perm.iter().collect();
        validate_tree(&t);
        assert_eq!(t.iter().collect::<HashSet<_>>(), expected_paths);
        let got: Vec<Option<Vec<u8>>> = queries.iter().map(|q| t.get(q)).collect();
        assert_eq!(got, expected);
        for w in &perm {
            assert_eq!(t.get(w).as_ref(), Some(w));
        }
    });
}

#[test]
fn exhaustive_insert_order_dict() {
    let words: Vec<Vec<u8>> = ["ab-x", "a-y", "ab", "abc-x-z", "b-", "abd-xy"]
        .map(|w| w.as_bytes().to_vec())
        .into();
    let queries = all_prefixes(&words);

    let reference = DelimitedDictionary::from_words(b'-', &words);
    let expected_keys: HashSet<Vec<u8>> = reference.iter().collect();
    let expected: Vec<Option<Vec<u8>>> = queries.iter().map(|q| reference.get(q)).collect();

    for_each_permutation(&words, |perm| {
        let d = DelimitedDictionary::from_words(b'-', &perm);
        validate_dict(&d);
        assert_eq!(d.iter().collect::<HashSet<_>>(), expected_keys);
        let got: Vec<Option<Vec<u8>>> = queries.iter().map(|q| d.get(q)).collect();
        assert_eq!(got, expected);
        for w in &perm {
            assert_eq!(d.get(w).as_ref(), Some(w));
        }
    });
}
