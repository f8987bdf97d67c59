//! Step-by-step bisection scenarios.
//!
//! Each test drives the bisector by hand and pins the exact candidate
//! returned by every transition, so any change to split points, descent or
//! ascent order shows up as a concrete diff.

use bisect_kernel::tree::TreeNodeV1;
use bisect_search::bisector::{FailedOutcome, HierarchicalBisector};
use bisect_search::error::BisectError;
use bisect_search::policy::BisectPolicyV1;
use lock_tests::bisect_test_helpers::{leaf, mixed_depth_forest, names, node, roots};

type Bisector<'a> = HierarchicalBisector<&'a TreeNodeV1>;

fn start(forest: &[TreeNodeV1], split_children_immediately: bool) -> Bisector<'_> {
    HierarchicalBisector::with_split_children(roots(forest), split_children_immediately).unwrap()
}

/// `failed()` must return a candidate; returns its identities.
fn fail_next<'a>(b: &mut Bisector<'a>) -> Vec<&'a str> {
    match b.failed().unwrap() {
        FailedOutcome::Next(set) => names(&set),
        FailedOutcome::LeafConfirmed(confirmed) => panic!("unexpected leaf {}", confirmed.name),
    }
}

/// `failed()` must confirm a leaf; returns its identity.
fn fail_leaf<'a>(b: &mut Bisector<'a>) -> &'a str {
    match b.failed().unwrap() {
        FailedOutcome::LeafConfirmed(confirmed) => confirmed.name.as_str(),
        FailedOutcome::Next(set) => panic!("unexpected candidate {:?}", names(&set)),
    }
}

/// `passed()`; `None` when exhausted.
fn pass<'a>(b: &mut Bisector<'a>) -> Option<Vec<&'a str>> {
    b.passed().unwrap().map(|set| names(&set))
}

#[test]
fn single_chain() {
    let forest = vec![node("A", vec![node("A.A", vec![leaf("A.A.A")])])];
    let mut b = start(&forest, false);
    assert_eq!(names(b.current().unwrap()), ["A"]);
    assert_eq!(fail_next(&mut b), ["A.A"]);
    assert_eq!(fail_next(&mut b), ["A.A.A"]);
    assert_eq!(fail_leaf(&mut b), "A.A.A");
    assert_eq!(pass(&mut b), None);
    assert!(b.is_exhausted());
}

#[test]
fn single_chain_with_immediate_split_is_identical() {
    // A lone child is never pre-split, so the flag changes nothing here.
    let forest = vec![node("A", vec![node("A.A", vec![leaf("A.A.A")])])];
    let mut b = start(&forest, true);
    assert_eq!(fail_next(&mut b), ["A.A"]);
    assert_eq!(fail_next(&mut b), ["A.A.A"]);
    assert_eq!(fail_leaf(&mut b), "A.A.A");
    assert_eq!(pass(&mut b), None);
}

#[test]
fn flat_pair() {
    let forest = vec![leaf("A"), leaf("B")];
    let mut b = start(&forest, false);
    assert_eq!(fail_next(&mut b), ["A"]);
    assert_eq!(fail_leaf(&mut b), "A");
    assert_eq!(pass(&mut b), Some(vec!["B"]));
    assert_eq!(fail_leaf(&mut b), "B");
    assert_eq!(pass(&mut b), None);
}

#[test]
fn odd_split() {
    let forest = vec![leaf("A"), leaf("B"), leaf("C")];
    let mut b = start(&forest, false);
    assert_eq!(fail_next(&mut b), ["A"]);
    assert_eq!(fail_leaf(&mut b), "A");
    assert_eq!(pass(&mut b), Some(vec!["B", "C"]));
    assert_eq!(fail_next(&mut b), ["B"]);
    assert_eq!(fail_leaf(&mut b), "B");
    assert_eq!(pass(&mut b), Some(vec!["C"]));
    assert_eq!(pass(&mut b), None);
}

#[test]
fn deferred_child_split() {
    let forest = vec![node("A", vec![leaf("A.A"), leaf("A.B")])];
    let mut b = start(&forest, false);
    assert_eq!(fail_next(&mut b), ["A.A", "A.B"]);
    assert_eq!(fail_next(&mut b), ["A.A"]);
    assert_eq!(fail_leaf(&mut b), "A.A");
    assert_eq!(pass(&mut b), Some(vec!["A.B"]));
    assert_eq!(fail_leaf(&mut b), "A.B");
    assert_eq!(pass(&mut b), None);
}

#[test]
fn immediate_child_split() {
    let forest = vec![node("A", vec![leaf("A.A"), leaf("A.B")])];
    let mut b = start(&forest, true);
    assert_eq!(fail_next(&mut b), ["A.A"]);
    assert_eq!(fail_leaf(&mut b), "A.A");
    assert_eq!(pass(&mut b), Some(vec!["A.B"]));
    assert_eq!(fail_leaf(&mut b), "A.B");
    assert_eq!(pass(&mut b), None);
}

#[test]
fn unequal_depth() {
    let forest = vec![node(
        "A",
        vec![leaf("A.A"), node("A.B", vec![leaf("A.B.A"), leaf("A.B.B")])],
    )];
    let mut b = start(&forest, false);
    assert_eq!(fail_next(&mut b), ["A.A", "A.B"]);
    assert_eq!(fail_next(&mut b), ["A.A"]);
    assert_eq!(fail_leaf(&mut b), "A.A");
    assert_eq!(pass(&mut b), Some(vec!["A.B"]));
    assert_eq!(fail_next(&mut b), ["A.B.A", "A.B.B"]);
    assert_eq!(fail_next(&mut b), ["A.B.A"]);
    assert_eq!(pass(&mut b), Some(vec!["A.B.B"]));
    assert_eq!(fail_leaf(&mut b), "A.B.B");
    assert_eq!(pass(&mut b), None);
}

#[test]
fn mixed_depth_forest_full_traversal() {
    let forest = mixed_depth_forest();
    let mut b = start(&forest, false);
    assert_eq!(names(b.current().unwrap()), ["A", "B", "C", "D", "E"]);

    assert_eq!(fail_next(&mut b), ["A", "B"]);
    assert_eq!(fail_next(&mut b), ["A"]);
    assert_eq!(fail_next(&mut b), ["A.A", "A.B", "A.C", "A.D"]);
    assert_eq!(fail_next(&mut b), ["A.A", "A.B"]);
    assert_eq!(pass(&mut b), Some(vec!["A.C", "A.D"]));
    assert_eq!(fail_next(&mut b), ["A.C"]);
    assert_eq!(fail_leaf(&mut b), "A.C");
    assert_eq!(pass(&mut b), Some(vec!["A.D"]));
    assert_eq!(fail_next(&mut b), ["A.D.A", "A.D.B"]);
    assert_eq!(fail_next(&mut b), ["A.D.A"]);
    assert_eq!(fail_next(&mut b), ["A.D.A.A", "A.D.A.B"]);
    assert_eq!(fail_next(&mut b), ["A.D.A.A"]);
    assert_eq!(fail_leaf(&mut b), "A.D.A.A");
    assert_eq!(pass(&mut b), Some(vec!["A.D.A.B"]));
    assert_eq!(fail_leaf(&mut b), "A.D.A.B");

    // Ascent: finish A.D, then the rest of the roots.
    assert_eq!(pass(&mut b), Some(vec!["A.D.B"]));
    assert_eq!(pass(&mut b), Some(vec!["B"]));
    assert_eq!(pass(&mut b), Some(vec!["C", "D", "E"]));
    assert_eq!(pass(&mut b), None);
}

#[test]
fn deep_chain_under_later_root() {
    let forest = mixed_depth_forest();
    let mut b = start(&forest, false);
    assert_eq!(pass(&mut b), None);

    let mut b = start(&forest, false);
    assert_eq!(fail_next(&mut b), ["A", "B"]);
    assert_eq!(pass(&mut b), Some(vec!["C", "D", "E"]));
    assert_eq!(fail_next(&mut b), ["C"]);
    assert_eq!(fail_next(&mut b), ["C.A"]);
    assert_eq!(fail_next(&mut b), ["C.A.A"]);
    assert_eq!(fail_next(&mut b), ["C.A.A.A"]);
    assert_eq!(fail_next(&mut b), ["C.A.A.A.A"]);
    assert_eq!(fail_leaf(&mut b), "C.A.A.A.A");
    assert_eq!(pass(&mut b), Some(vec!["D", "E"]));
    assert_eq!(fail_next(&mut b), ["D"]);
    assert_eq!(pass(&mut b), Some(vec!["E"]));
    assert_eq!(pass(&mut b), None);
}

#[test]
fn immediate_split_on_wide_children() {
    let forest = vec![node(
        "R",
        vec![leaf("R.A"), leaf("R.B"), leaf("R.C"), leaf("R.D"), leaf("R.E")],
    )];
    let mut b = start(&forest, true);
    assert_eq!(fail_next(&mut b), ["R.A", "R.B"]);
    assert_eq!(pass(&mut b), Some(vec!["R.C", "R.D", "R.E"]));
    assert_eq!(fail_next(&mut b), ["R.C"]);
    assert_eq!(pass(&mut b), Some(vec!["R.D", "R.E"]));
    assert_eq!(fail_next(&mut b), ["R.D"]);
    assert_eq!(fail_leaf(&mut b), "R.D");
    assert_eq!(pass(&mut b), Some(vec!["R.E"]));
    assert_eq!(pass(&mut b), None);
}

#[test]
fn leaf_confirmation_leaves_state_unchanged() {
    let forest = vec![leaf("A"), leaf("B")];
    let mut b = start(&forest, false);
    fail_next(&mut b);
    let before = b.snapshot();
    assert_eq!(fail_leaf(&mut b), "A");
    assert_eq!(b.snapshot(), before);
    // Confirming again is allowed and still does not move.
    assert_eq!(fail_leaf(&mut b), "A");
    assert_eq!(b.snapshot(), before);
}

#[test]
fn transitions_after_exhaustion_are_protocol_violations() {
    let forest = vec![leaf("A")];
    let mut b = start(&forest, false);
    assert_eq!(pass(&mut b), None);
    assert!(matches!(b.failed(), Err(BisectError::ProtocolViolation { .. })));
    assert!(matches!(b.passed(), Err(BisectError::ProtocolViolation { .. })));
}

#[test]
fn empty_forest_rejected() {
    let forest: Vec<TreeNodeV1> = Vec::new();
    let err = HierarchicalBisector::new(roots(&forest), BisectPolicyV1::default()).unwrap_err();
    assert!(matches!(err, BisectError::InvalidInput { .. }));
}

#[test]
fn candidate_consistency_with_current() {
    // Whatever a transition returns is exactly what `current()` reports.
    let forest = mixed_depth_forest();
    let mut b = start(&forest, false);
    let next = b.failed().unwrap().next().unwrap();
    assert_eq!(names(&next), names(b.current().unwrap()));
    let next = b.passed().unwrap().unwrap();
    assert_eq!(names(&next), names(b.current().unwrap()));
}
