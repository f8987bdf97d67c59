//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. Canonical domain set has expected count (catches forgotten additions to ALL)
//! 2. All domain byte strings are unique (prevents domain collision)
//! 3. All domains are null-terminated and follow `BISECT::*::V1\0`
//! 4. No raw `BISECT::` domain literals in production source outside `hash_domain.rs`
//! 5. Golden digests for fixed inputs do not drift

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use bisect_kernel::proof::hash::HashDomain;
use bisect_kernel::tree::{forest_digest, ForestBuilder, TreeNodeV1};
use bisect_search::policy::BisectPolicyV1;

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        6,
        "expected 6 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_all_unique_bytes() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(seen.insert(domain.as_bytes()), "duplicate domain bytes: {domain}");
    }
}

#[test]
fn hash_domain_wire_format() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"BISECT::"), "{domain} does not start with BISECT::");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} does not end with ::V1\\0");
        assert_eq!(
            bytes.iter().filter(|&&b| b == 0).count(),
            1,
            "{domain} has an interior null"
        );
    }
}

/// Scan kernel/, search/, harness/ source for `b"BISECT::` literals.
/// The only file allowed to contain them is `hash_domain.rs`.
#[test]
fn no_raw_domain_literals_outside_authority() {
    let production_dirs = [
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../kernel/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../search/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../harness/src"),
    ];
    let pattern = "b\"BISECT::";
    let authority_file = "hash_domain.rs";
    let mut violations = Vec::new();

    for dir in &production_dirs {
        for path in walkdir(Path::new(dir)) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(authority_file) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if !trimmed.starts_with("//") && trimmed.contains(pattern) {
                    violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "raw BISECT:: domain literals found outside {authority_file}:\n{}",
        violations.join("\n")
    );
}

/// Simple recursive directory walker (avoids adding walkdir dependency).
fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(walkdir(&path));
            } else {
                results.push(path);
            }
        }
    }
    results
}

#[test]
fn golden_policy_digests() {
    assert_eq!(
        BisectPolicyV1::default().digest().unwrap().as_str(),
        "sha256:6546cf7c01d021ecd32137bcbfc0d02edc975455d1a668c7813d88183b3f9e65"
    );
    assert_eq!(
        BisectPolicyV1::eager_child_split().digest().unwrap().as_str(),
        "sha256:d0af25fbe6827b5d2ae99c4b4fdd23faa6d91956930e0346f3d3de0cb37946b5"
    );
}

#[test]
fn golden_forest_digest() {
    let forest = vec![TreeNodeV1::leaf("A"), TreeNodeV1::leaf("B")];
    let roots: Vec<&TreeNodeV1> = forest.iter().collect();
    assert_eq!(
        forest_digest(&roots).unwrap().as_str(),
        "sha256:d809f8266d6a10e9eecc349fda0454a197af620b7114bb082483848a6070f8ca"
    );
}

#[test]
fn golden_arena_forest_digest() {
    let mut builder = ForestBuilder::new();
    builder.add_node("A").unwrap();
    builder.add_node("B").unwrap();
    builder.add_root("A").unwrap();
    builder.add_root("B").unwrap();
    assert_eq!(
        builder.build().unwrap().digest().unwrap().as_str(),
        "sha256:a43570ab216540c6ba5fb80c9041a6c6107fac1654e5c51327bed9da6283f620"
    );
}
