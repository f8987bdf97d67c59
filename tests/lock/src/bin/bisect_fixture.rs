//! Binary that bisects a requirements manifest against a ground-truth
//! oracle and prints deterministic output lines for cross-process
//! verification.
//!
//! Usage: `bisect_fixture <requirements.txt> <guilty[,guilty...]> [--split-children]`
//!
//! Output: key=value lines (see source for format).

use bisect_harness::manifest::parse_requirements;
use bisect_harness::oracle::GroundTruthOracle;
use bisect_harness::policy::RunConfig;
use bisect_harness::runner::run_forest_bisection;
use bisect_search::policy::BisectPolicyV1;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("usage: bisect_fixture <requirements.txt> <guilty[,guilty...]> [--split-children]");
        std::process::exit(1);
    }
    let split_children_immediately = match args.get(3).map(String::as_str) {
        None => false,
        Some("--split-children") => true,
        Some(other) => {
            eprintln!("unknown flag: {other}");
            std::process::exit(1);
        }
    };

    let src = std::fs::read_to_string(&args[1]).expect("failed to read manifest");
    let manifest = parse_requirements(&src).expect("manifest parse failed");
    let forest = manifest.to_forest().expect("forest construction failed");

    let guilty: Vec<&str> = args[2].split(',').filter(|g| !g.is_empty()).collect();
    let mut oracle = GroundTruthOracle::new(guilty);
    let policy = BisectPolicyV1 {
        split_children_immediately,
    };
    let report = run_forest_bisection(&forest, &mut oracle, policy, &RunConfig::default())
        .expect("bisection failed");

    println!(
        "manifest_digest={}",
        manifest.digest().expect("manifest digest").as_str()
    );
    println!("forest_digest={}", report.forest_digest.as_str());
    println!("policy_digest={}", report.policy_digest.as_str());
    println!("report_digest={}", report.digest().expect("report digest").as_str());
    println!(
        "log_digest={}",
        report.log.digest().expect("log digest").as_str()
    );
    println!("transitions={}", report.transition_count());
    println!("oracle_invocations={}", report.oracle_invocations);
    for culprit in &report.culprits {
        println!("culprit={culprit}");
    }
    print!("{}", manifest.render_unpinned(&report.culprits));
}
