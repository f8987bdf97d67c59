//! Shared forest generators and drivers for bisection benchmark suites.

use std::collections::BTreeSet;

use bisect_harness::oracle::GroundTruthOracle;
use bisect_harness::policy::RunConfig;
use bisect_harness::report::BisectionReportV1;
use bisect_harness::runner::run_bisection;
use bisect_kernel::tree::{leaf_ids, TreeNodeV1};
use bisect_search::policy::BisectPolicyV1;

/// A named benchmark workload: a forest plus the leaves the oracle treats
/// as guilty.
pub struct Regime {
    pub name: &'static str,
    pub forest: Vec<TreeNodeV1>,
    pub guilty: BTreeSet<String>,
}

impl Regime {
    /// Root handles, as the runner takes them.
    #[must_use]
    pub fn roots(&self) -> Vec<&TreeNodeV1> {
        self.forest.iter().collect()
    }
}

/// `n` flat roots.
#[must_use]
pub fn wide_forest(n: usize) -> Vec<TreeNodeV1> {
    (0..n).map(|i| TreeNodeV1::leaf(format!("w{i}"))).collect()
}

/// `roots` independent chains, each `depth` nodes long.
#[must_use]
pub fn deep_forest(roots: usize, depth: usize) -> Vec<TreeNodeV1> {
    (0..roots)
        .map(|r| {
            let mut node = TreeNodeV1::leaf(format!("d{r}.{}", depth.saturating_sub(1)));
            for level in (0..depth.saturating_sub(1)).rev() {
                node = TreeNodeV1::branch(format!("d{r}.{level}"), vec![node]);
            }
            node
        })
        .collect()
}

/// `roots` complete trees of the given fanout and depth.
#[must_use]
pub fn balanced_forest(roots: usize, fanout: usize, depth: usize) -> Vec<TreeNodeV1> {
    fn build(prefix: String, fanout: usize, depth: usize) -> TreeNodeV1 {
        if depth <= 1 {
            return TreeNodeV1::leaf(prefix);
        }
        let children = (0..fanout)
            .map(|i| build(format!("{prefix}.{i}"), fanout, depth - 1))
            .collect();
        TreeNodeV1::branch(prefix, children)
    }
    (0..roots)
        .map(|r| build(format!("b{r}"), fanout, depth))
        .collect()
}

/// Every `stride`-th leaf in depth-first order, starting at the first.
#[must_use]
pub fn every_nth_leaf(forest: &[TreeNodeV1], stride: usize) -> BTreeSet<String> {
    let roots: Vec<&TreeNodeV1> = forest.iter().collect();
    leaf_ids(&roots)
        .into_iter()
        .step_by(stride.max(1))
        .map(str::to_string)
        .collect()
}

/// The standard regimes: one guilty leaf in a wide set, sparse and dense
/// culprits in balanced trees, and a single culprit at the bottom of the
/// last deep chain.
#[must_use]
pub fn standard_regimes() -> Vec<Regime> {
    let wide = wide_forest(1024);
    let wide_guilty = ["w700".to_string()].into_iter().collect();

    let balanced = balanced_forest(4, 4, 5);
    let sparse = every_nth_leaf(&balanced, 97);
    let dense = every_nth_leaf(&balanced, 7);

    let deep = deep_forest(8, 64);
    let deep_guilty = ["d7.63".to_string()].into_iter().collect();

    vec![
        Regime {
            name: "wide_single",
            forest: wide,
            guilty: wide_guilty,
        },
        Regime {
            name: "balanced_sparse",
            forest: balanced.clone(),
            guilty: sparse,
        },
        Regime {
            name: "balanced_dense",
            forest: balanced,
            guilty: dense,
        },
        Regime {
            name: "deep_chain",
            forest: deep,
            guilty: deep_guilty,
        },
    ]
}

/// Full `run_bisection()` for a regime with an unbounded transition budget.
///
/// # Panics
///
/// Panics if the run fails. Benchmark runs are expected to succeed.
#[must_use]
pub fn run_regime(regime: &Regime, policy: BisectPolicyV1) -> BisectionReportV1 {
    let mut oracle = GroundTruthOracle::new(regime.guilty.iter().cloned());
    let config = RunConfig {
        max_transitions: Some(u64::MAX),
        max_oracle_attempts: None,
    };
    run_bisection(&regime.roots(), &mut oracle, policy, &config)
        .expect("run_bisection should succeed in benchmarks")
}
