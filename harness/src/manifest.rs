//! Requirements manifest reader: a pip-compile style `requirements.txt`
//! becomes a candidate forest.
//!
//! # Edge direction
//!
//! pip-compile annotates each pinned package with the packages that pulled
//! it in (`# via parent`). A package's children are therefore the packages
//! annotated `via` it; releasing a parent releases what it depends on. Roots
//! are the primary requirements (annotated `via -r file` or
//! `via (pyproject.toml)`) plus anything with no `via` parent at all.
//!
//! # Accepted syntax
//!
//! ```text
//! # header comment                      skipped
//! --index-url https://...               recorded in skipped_options
//! graphene==2.1.9 \                     requirement (" \" dropped)
//!     --hash=sha256:...                 dropped
//!     # via graphene-django             inline annotation
//! graphene-django==2.13.0
//!     # via                             multiline annotation
//!     #   -r requirements.in
//!     #   other-package
//! six==1.16.0 --hash=sha256:...         inline options dropped
//! ```

use std::collections::BTreeSet;

use bisect_kernel::proof::canon::{canonical_digest, CanonError};
use bisect_kernel::proof::hash::{ContentHash, HashDomain};
use bisect_kernel::tree::{CandidateForestV1, ForestBuilder, ForestError};

/// Schema tag written into the manifest's canonical JSON.
pub const REQUIREMENTS_MANIFEST_SCHEMA_VERSION: &str = "requirements_manifest.v1";

/// One comparison in a version specifier, e.g. `>=` `2.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpecV1 {
    pub op: String,
    pub version: String,
}

/// A single pinned (or unpinned) requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementV1 {
    /// Distribution name as written.
    pub name: String,
    /// Normalized name: lowercase, runs of `-`, `_`, `.` collapsed to `-`.
    pub key: String,
    /// The requirement line with continuation markers and trailing
    /// comments removed.
    pub line: String,
    /// 1-based line number in the source.
    pub line_number: usize,
    pub specs: Vec<VersionSpecV1>,
    /// Listed directly in an input file.
    pub is_primary: bool,
    /// Keys of the packages that pulled this one in, in annotation order.
    pub via: Vec<String>,
}

/// A parsed manifest, requirements in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementsManifestV1 {
    requirements: Vec<RequirementV1>,
    skipped_options: Vec<String>,
}

/// Typed failure for manifest parsing and forest construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// A line that is neither comment, option nor parseable requirement.
    InvalidRequirement { line_number: usize, line: String },
    /// Two requirements normalize to the same key.
    DuplicateRequirement { key: String, line_number: usize },
    /// A `via` annotation names a package the manifest does not pin.
    UnknownViaReference { requirement: String, via: String },
    /// The dependency graph could not be turned into a forest.
    Forest(ForestError),
    /// No requirement lines at all.
    Empty,
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequirement { line_number, line } => {
                write!(f, "line {line_number}: invalid requirement: {line:?}")
            }
            Self::DuplicateRequirement { key, line_number } => {
                write!(f, "line {line_number}: duplicate requirement {key}")
            }
            Self::UnknownViaReference { requirement, via } => {
                write!(f, "{requirement} is annotated via unknown package {via}")
            }
            Self::Forest(e) => write!(f, "dependency graph: {e}"),
            Self::Empty => write!(f, "manifest contains no requirements"),
        }
    }
}

impl std::error::Error for ManifestError {}

impl From<ForestError> for ManifestError {
    fn from(e: ForestError) -> Self {
        Self::Forest(e)
    }
}

/// Normalize a distribution name for comparison (`Foo_Bar.baz` → `foo-bar-baz`).
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

/// Parse a requirements file.
///
/// # Errors
///
/// Returns [`ManifestError`] on an unparseable line, a duplicate
/// requirement, or a manifest without requirements.
pub fn parse_requirements(src: &str) -> Result<RequirementsManifestV1, ManifestError> {
    let mut requirements: Vec<RequirementV1> = Vec::new();
    let mut skipped_options = Vec::new();
    let mut keys: BTreeSet<String> = BTreeSet::new();
    // Requirement that trailing annotations attach to.
    let mut current: Option<usize> = None;
    let mut in_via_block = false;

    for (i, raw) in src.lines().enumerate() {
        let line_number = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            in_via_block = false;
            continue;
        }
        let indented = raw.starts_with(char::is_whitespace);

        if let Some(comment) = trimmed.strip_prefix('#') {
            if !indented {
                current = None;
                in_via_block = false;
                continue;
            }
            let body = comment.trim();
            if let Some(rest) = strip_via(body) {
                in_via_block = rest.is_empty();
                for entry in rest.split(',') {
                    annotate(&mut requirements, current, entry);
                }
            } else if in_via_block {
                annotate(&mut requirements, current, body);
            }
            continue;
        }

        in_via_block = false;
        if indented && trimmed.starts_with("--hash") {
            continue;
        }
        // `-r`, `-c`, `-i`, `--index-url`, `-e` and friends.
        if trimmed.starts_with('-') {
            skipped_options.push(trimmed.to_string());
            current = None;
            continue;
        }

        let requirement = parse_requirement_line(trimmed, line_number)?;
        if !keys.insert(requirement.key.clone()) {
            return Err(ManifestError::DuplicateRequirement {
                key: requirement.key,
                line_number,
            });
        }
        current = Some(requirements.len());
        requirements.push(requirement);
    }

    if requirements.is_empty() {
        return Err(ManifestError::Empty);
    }
    Ok(RequirementsManifestV1 {
        requirements,
        skipped_options,
    })
}

/// `via`, `via x` → `Some("")`, `Some("x")`; anything else → `None`.
fn strip_via(body: &str) -> Option<&str> {
    let rest = body.strip_prefix("via")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn annotate(requirements: &mut [RequirementV1], current: Option<usize>, entry: &str) {
    let Some(req) = current.and_then(|idx| requirements.get_mut(idx)) else {
        return;
    };
    let entry = entry.trim();
    if entry.is_empty() {
        return;
    }
    if entry.starts_with("-r") || entry.starts_with("--requirement") || entry.starts_with('(') {
        req.is_primary = true;
        return;
    }
    if entry.starts_with("-c") || entry.starts_with("--constraint") {
        return;
    }
    let name_len = leading_name_len(entry);
    if name_len == 0 {
        return;
    }
    let key = normalize_name(&entry[..name_len]);
    if !req.via.contains(&key) {
        req.via.push(key);
    }
}

/// Length of the distribution name at the start of `s` (0 if none).
pub(crate) fn leading_name_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphanumeric() => {}
        _ => return 0,
    }
    chars
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .map_or(s.len(), |(idx, _)| idx)
}

/// Strip a trailing ` \` continuation, a trailing ` # comment` and any
/// per-requirement options (` --hash=...`, ` --global-option ...`).
fn clean_line(line: &str) -> &str {
    let line = line.strip_suffix('\\').unwrap_or(line).trim_end();
    let bytes = line.as_bytes();
    for (idx, &b) in bytes.iter().enumerate() {
        let after_space = idx > 0 && bytes[idx - 1].is_ascii_whitespace();
        if after_space && (b == b'#' || line[idx..].starts_with("--")) {
            return line[..idx].trim_end();
        }
    }
    line
}

fn parse_requirement_line(raw: &str, line_number: usize) -> Result<RequirementV1, ManifestError> {
    let invalid = || ManifestError::InvalidRequirement {
        line_number,
        line: raw.to_string(),
    };
    let line = clean_line(raw);
    let name_len = leading_name_len(line);
    if name_len == 0 {
        return Err(invalid());
    }
    let name = &line[..name_len];
    let mut rest = line[name_len..].trim_start();

    if let Some(extras) = rest.strip_prefix('[') {
        let close = extras.find(']').ok_or_else(invalid)?;
        rest = extras[close + 1..].trim_start();
    }
    // Environment markers do not affect the pin.
    let rest = rest.split(';').next().unwrap_or_default().trim();

    let specs = if rest.is_empty() || rest.starts_with('@') {
        Vec::new()
    } else {
        rest.split(',')
            .map(|part| parse_spec(part.trim()).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(RequirementV1 {
        name: name.to_string(),
        key: normalize_name(name),
        line: line.to_string(),
        line_number,
        specs,
        is_primary: false,
        via: Vec::new(),
    })
}

fn parse_spec(part: &str) -> Option<VersionSpecV1> {
    let op_len = part
        .find(|c: char| !matches!(c, '=' | '<' | '>' | '!' | '~'))
        .unwrap_or(part.len());
    let (op, version) = part.split_at(op_len);
    let version = version.trim();
    if op.is_empty() || version.is_empty() {
        return None;
    }
    Some(VersionSpecV1 {
        op: op.to_string(),
        version: version.to_string(),
    })
}

impl RequirementsManifestV1 {
    #[must_use]
    pub fn requirements(&self) -> &[RequirementV1] {
        &self.requirements
    }

    /// Option lines that were recognised and ignored, in source order.
    #[must_use]
    pub fn skipped_options(&self) -> &[String] {
        &self.skipped_options
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Look a requirement up by any spelling of its name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RequirementV1> {
        let key = normalize_name(name);
        self.requirements.iter().find(|r| r.key == key)
    }

    /// Primary requirements, in source order.
    pub fn primary(&self) -> impl Iterator<Item = &RequirementV1> {
        self.requirements.iter().filter(|r| r.is_primary)
    }

    /// Build the candidate forest. Node names are requirement keys.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnknownViaReference`] for a dangling
    /// annotation and [`ManifestError::Forest`] if the graph has a cycle.
    pub fn to_forest(&self) -> Result<CandidateForestV1, ManifestError> {
        self.to_candidate_forest(&BTreeSet::new())
    }

    /// Keys of requirements that carry version specifiers.
    ///
    /// Applied to the parsed input manifest (`requirements.in`), these are
    /// the requirements the user constrained by hand; they stay pinned and
    /// are never bisection candidates.
    #[must_use]
    pub fn constrained_keys(&self) -> BTreeSet<String> {
        self.requirements
            .iter()
            .filter(|r| !r.specs.is_empty())
            .map(|r| r.key.clone())
            .collect()
    }

    /// Build the candidate forest without the `pinned` keys.
    ///
    /// Pinned requirements and their edges are left out. A requirement
    /// whose every `via` parent is pinned becomes a root, so what a pinned
    /// package pulls in is still bisected.
    ///
    /// # Errors
    ///
    /// As [`Self::to_forest`]; [`ManifestError::Forest`] also when every
    /// requirement is pinned.
    pub fn to_candidate_forest(
        &self,
        pinned: &BTreeSet<String>,
    ) -> Result<CandidateForestV1, ManifestError> {
        let keys: BTreeSet<&str> = self.requirements.iter().map(|r| r.key.as_str()).collect();
        let mut builder = ForestBuilder::new();
        for req in self.requirements.iter().filter(|r| !pinned.contains(&r.key)) {
            builder.add_node(&req.key)?;
        }
        for req in &self.requirements {
            if let Some(parent) = req.via.iter().find(|p| !keys.contains(p.as_str())) {
                return Err(ManifestError::UnknownViaReference {
                    requirement: req.key.clone(),
                    via: parent.clone(),
                });
            }
            if pinned.contains(&req.key) {
                continue;
            }
            let mut has_candidate_parent = false;
            for parent in req.via.iter().filter(|p| !pinned.contains(*p)) {
                builder.add_child(parent, &req.key)?;
                has_candidate_parent = true;
            }
            if req.is_primary || !has_candidate_parent {
                builder.add_root(&req.key)?;
            }
        }
        Ok(builder.build()?)
    }

    /// Render the manifest fed to the resolver when `released` are unpinned:
    /// released requirements appear as bare names, the rest keep their
    /// pinned line. One requirement per line, source order.
    #[must_use]
    pub fn render_unpinned<S: AsRef<str>>(&self, released: impl IntoIterator<Item = S>) -> String {
        let released: BTreeSet<String> = released
            .into_iter()
            .map(|s| normalize_name(s.as_ref()))
            .collect();
        let mut out = String::new();
        for req in &self.requirements {
            if released.contains(&req.key) {
                out.push_str(&req.name);
            } else {
                out.push_str(&req.line);
            }
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let requirements: Vec<serde_json::Value> = self
            .requirements
            .iter()
            .map(|r| {
                serde_json::json!({
                    "is_primary": r.is_primary,
                    "key": r.key,
                    "line": r.line,
                    "line_number": r.line_number,
                    "name": r.name,
                    "specs": r.specs.iter().map(|s| serde_json::json!({
                        "op": s.op,
                        "version": s.version,
                    })).collect::<Vec<_>>(),
                    "via": r.via,
                })
            })
            .collect();
        serde_json::json!({
            "requirements": requirements,
            "schema_version": REQUIREMENTS_MANIFEST_SCHEMA_VERSION,
            "skipped_options": self.skipped_options,
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        canonical_digest(HashDomain::RequirementsManifest, &self.to_json_value())
    }
}
