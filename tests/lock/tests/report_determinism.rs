//! In-process determinism: identical inputs produce byte-identical reports.

use bisect_harness::manifest::parse_requirements;
use bisect_harness::oracle::GroundTruthOracle;
use bisect_harness::policy::RunConfig;
use bisect_harness::report::BisectionReportV1;
use bisect_harness::runner::{run_bisection, run_forest_bisection};
use bisect_kernel::proof::canon::canonical_json_bytes;
use bisect_search::log::{TransitionCauseV1, TransitionOutcomeV1, Verdict};
use bisect_search::policy::BisectPolicyV1;
use lock_tests::bisect_test_helpers::{mixed_depth_forest, read_fixture, roots};

const RUNS: usize = 10;

fn mixed_report(guilty: &[&str], policy: BisectPolicyV1) -> BisectionReportV1 {
    let forest = mixed_depth_forest();
    let mut oracle = GroundTruthOracle::new(guilty.iter().copied());
    run_bisection(&roots(&forest), &mut oracle, policy, &RunConfig::default()).unwrap()
}

#[test]
fn report_bytes_identical_across_runs() {
    let baseline = mixed_report(&["A.B.B", "C.A.A.A.A", "E"], BisectPolicyV1::default())
        .to_canonical_json_bytes()
        .unwrap();
    for _ in 0..RUNS {
        let bytes = mixed_report(&["A.B.B", "C.A.A.A.A", "E"], BisectPolicyV1::default())
            .to_canonical_json_bytes()
            .unwrap();
        assert_eq!(bytes, baseline);
    }
}

#[test]
fn manifest_report_digest_identical_across_runs() {
    let src = read_fixture("requirements_compiled.txt");
    let digests: Vec<String> = (0..RUNS)
        .map(|_| {
            let manifest = parse_requirements(&src).unwrap();
            let forest = manifest.to_forest().unwrap();
            let mut oracle = GroundTruthOracle::new(["six", "idna"]);
            run_forest_bisection(
                &forest,
                &mut oracle,
                BisectPolicyV1::default(),
                &RunConfig::default(),
            )
            .unwrap()
            .digest()
            .unwrap()
            .as_str()
            .to_string()
        })
        .collect();
    assert!(digests.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn report_json_is_already_canonical() {
    let report = mixed_report(&["A.C"], BisectPolicyV1::default());
    let bytes = report.to_canonical_json_bytes().unwrap();
    let reparsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(canonical_json_bytes(&reparsed).unwrap(), bytes);
}

#[test]
fn policy_is_bound_into_report_digest() {
    let deferred = mixed_report(&["A.D.B"], BisectPolicyV1::default());
    let eager = mixed_report(&["A.D.B"], BisectPolicyV1::eager_child_split());
    assert_eq!(deferred.culprits, eager.culprits);
    assert_eq!(deferred.forest_digest, eager.forest_digest);
    assert_ne!(deferred.policy_digest, eager.policy_digest);
    assert_ne!(deferred.digest().unwrap(), eager.digest().unwrap());
}

#[test]
fn log_replays_the_run() {
    let report = mixed_report(&["A.C", "D"], BisectPolicyV1::default());
    let events = report.log.events();

    // Every event's tested candidate is the previous event's proposal,
    // except after a leaf confirmation, where the leaf itself is resumed.
    for pair in events.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        match &prev.outcome {
            TransitionOutcomeV1::Next { candidate } => assert_eq!(&next.tested, candidate),
            TransitionOutcomeV1::LeafConfirmed { leaf } => {
                assert_eq!(next.tested, vec![leaf.clone()]);
                assert_eq!(next.cause, TransitionCauseV1::LeafFixed);
            }
            TransitionOutcomeV1::Exhausted => panic!("event after exhaustion"),
        }
    }

    let oracle_verdicts = events
        .iter()
        .filter(|e| matches!(e.cause, TransitionCauseV1::Oracle(_)))
        .count() as u64;
    assert_eq!(oracle_verdicts, report.oracle_invocations);
    assert_eq!(events[0].tested, vec!["A", "B", "C", "D", "E"]);
    assert_eq!(events[0].cause, TransitionCauseV1::Oracle(Verdict::Fail));
    assert_eq!(report.log.confirmed_leaves(), vec!["A.C", "D"]);
    assert_eq!(events.last().unwrap().depth_after, 0);
}
