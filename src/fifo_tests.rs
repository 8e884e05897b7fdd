// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn push_get_preserves_order() {
    let mut q = Fifo::new();
    q.push(1);
    q.push(2);
    q.push(3);
    assert_eq!(q.get(), Some(1));
    assert_eq!(q.get(), Some(2));
    assert_eq!(q.head(), Some(&3));
    assert_eq!(q.get(), Some(3));
    assert!(q.empty());
    assert_eq!(q.get(), None);
}

#[test]
fn contains_tests_membership_without_removing() {
    let mut q: Fifo<&str> = Fifo::new();
    q.push("a");
    q.push("b");
    assert!(q.contains(&"a"));
    assert!(!q.contains(&"c"));
    assert_eq!(q.len(), 2);
}

proptest::proptest! {
    #[test]
    fn get_order_matches_push_order(elements: Vec<i32>) {
        let mut q = Fifo::new();
        for e in &elements {
            q.push(*e);
        }
        let mut drained = Vec::new();
        while let Some(e) = q.get() {
            drained.push(e);
        }
        proptest::prop_assert_eq!(drained, elements);
    }
}
