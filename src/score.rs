//! Field equivalence scoring between a C++ type and a Java candidate.
//!
//! Every C++ field is compared with every Java field by normalized name.
//! Pairs at or above the threshold are matches. The match percentage is the
//! number of distinct Java fields matched over the number of C++ fields,
//! since the C++ side is the source of truth.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract;
use crate::model::{FieldRecord, VariableDeclaration};
use crate::parent::resolve_with_parent_fallback;
use crate::parser::ParseContext;
use crate::similarity::{normalize_name, round2, similarity};

/// Verdict thresholds on the match percentage.
pub mod verdicts {
    pub const EXCELLENT_MIN: f64 = 80.0;
    pub const POSSIBLE_MIN: f64 = 50.0;
}

/// How plausible the Java class is as a migration target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "excellent")]
    Excellent,
    #[serde(rename = "possible")]
    Possible,
    #[serde(rename = "no-match")]
    NoMatch,
}

impl Verdict {
    pub fn from_percentage(has_matches: bool, match_percentage: f64) -> Self {
        match match_percentage {
            _ if !has_matches => Verdict::NoMatch,
            p if p >= verdicts::EXCELLENT_MIN => Verdict::Excellent,
            p if p >= verdicts::POSSIBLE_MIN => Verdict::Possible,
            _ => Verdict::NoMatch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Excellent => "excellent",
            Verdict::Possible => "possible",
            Verdict::NoMatch => "no-match",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A C++/Java field pair at or above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub cpp_field: VariableDeclaration,
    pub java_field: FieldRecord,
    /// Percentage, rounded to two decimals.
    pub similarity_score: f64,
    pub normalized_cpp: String,
    pub normalized_java: String,
}

/// Matches and aggregate statistics for one field-list pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceScore {
    pub threshold: f64,
    pub cpp_fields_count: usize,
    pub java_fields_count: usize,
    pub matches_found: usize,
    /// Distinct C++ names with at least one match.
    pub cpp_fields_matched: usize,
    /// Distinct Java names with at least one match.
    pub java_fields_matched: usize,
    pub match_percentage: f64,
    pub final_result: Verdict,
    pub matches: Vec<MatchRecord>,
}

fn check_threshold(threshold: f64) -> Result<()> {
    if (0.0..=100.0).contains(&threshold) {
        Ok(())
    } else {
        Err(Error::InvalidThreshold(threshold))
    }
}

/// Pairs at or above `threshold`, grouped by C++ field in input order and
/// sorted by descending score within each group.
pub fn find_matches(
    cpp: &[VariableDeclaration],
    java: &[FieldRecord],
    threshold: f64,
) -> Vec<MatchRecord> {
    let mut matches = Vec::new();

    for cpp_field in cpp {
        let mut group: Vec<MatchRecord> = java
            .iter()
            .filter_map(|java_field| {
                let score = similarity(&cpp_field.name, &java_field.name);
                (score >= threshold).then(|| MatchRecord {
                    cpp_field: cpp_field.clone(),
                    java_field: java_field.clone(),
                    similarity_score: round2(score),
                    normalized_cpp: normalize_name(&cpp_field.name),
                    normalized_java: normalize_name(&java_field.name),
                })
            })
            .collect();
        // stable: equal scores keep Java declaration order
        group.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
        });
        matches.extend(group);
    }

    matches
}

/// Score a C++ field list against a Java field list.
pub fn score(
    cpp: &[VariableDeclaration],
    java: &[FieldRecord],
    threshold: f64,
) -> Result<EquivalenceScore> {
    check_threshold(threshold)?;

    if cpp.is_empty() || java.is_empty() {
        return Ok(EquivalenceScore {
            threshold,
            cpp_fields_count: cpp.len(),
            java_fields_count: java.len(),
            matches_found: 0,
            cpp_fields_matched: 0,
            java_fields_matched: 0,
            match_percentage: 0.0,
            final_result: Verdict::NoMatch,
            matches: Vec::new(),
        });
    }

    let matches = find_matches(cpp, java, threshold);
    let cpp_fields_matched = matches
        .iter()
        .map(|m| m.cpp_field.name.as_str())
        .collect::<HashSet<_>>()
        .len();
    let java_fields_matched = matches
        .iter()
        .map(|m| m.java_field.name.as_str())
        .collect::<HashSet<_>>()
        .len();
    let match_percentage = java_fields_matched as f64 / cpp.len() as f64 * 100.0;

    Ok(EquivalenceScore {
        threshold,
        cpp_fields_count: cpp.len(),
        java_fields_count: java.len(),
        matches_found: matches.len(),
        cpp_fields_matched,
        java_fields_matched,
        match_percentage: round2(match_percentage),
        final_result: Verdict::from_percentage(!matches.is_empty(), match_percentage),
        matches,
    })
}

/// Equivalence result for a pair of files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceReport {
    pub cpp_file: String,
    pub java_file: String,
    #[serde(flatten)]
    pub score: EquivalenceScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_cpp_fields: Option<Vec<VariableDeclaration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_java_fields: Option<Vec<FieldRecord>>,
}

impl EquivalenceReport {
    /// Attach the full field lists that were scored.
    pub fn with_fields(mut self, cpp: Vec<VariableDeclaration>, java: Vec<FieldRecord>) -> Self {
        self.all_cpp_fields = Some(cpp);
        self.all_java_fields = Some(java);
        self
    }
}

/// C++ fields of a file, through the parent fallback.
pub fn load_cpp_fields(
    ctx: &mut ParseContext,
    path: &Path,
    config: &Config,
) -> Result<Vec<VariableDeclaration>> {
    let file_model = resolve_with_parent_fallback(ctx, path, &config.fallback_options())?;
    Ok(file_model.model.variables)
}

/// Java fields of a file, minus the configured ignored names.
pub fn load_java_fields(
    ctx: &mut ParseContext,
    path: &Path,
    config: &Config,
) -> Result<Vec<FieldRecord>> {
    let fields = extract::extract_java_fields_file(ctx, path)?;
    Ok(extract::without_ignored(fields, &config.ignored_java_fields))
}

fn report_for(
    cpp_path: &Path,
    java_path: &Path,
    cpp: &[VariableDeclaration],
    java: &[FieldRecord],
    threshold: f64,
) -> Result<EquivalenceReport> {
    Ok(EquivalenceReport {
        cpp_file: cpp_path.to_string_lossy().into_owned(),
        java_file: java_path.to_string_lossy().into_owned(),
        score: score(cpp, java, threshold)?,
        all_cpp_fields: None,
        all_java_fields: None,
    })
}

/// Score one C++ file against one Java file.
pub fn score_files(
    ctx: &mut ParseContext,
    cpp_path: &Path,
    java_path: &Path,
    config: &Config,
    verbose: bool,
) -> Result<EquivalenceReport> {
    check_threshold(config.threshold)?;
    let cpp = load_cpp_fields(ctx, cpp_path, config)?;
    let java = load_java_fields(ctx, java_path, config)?;

    let report = report_for(cpp_path, java_path, &cpp, &java, config.threshold)?;
    Ok(if verbose {
        report.with_fields(cpp, java)
    } else {
        report
    })
}

/// Score one C++ file against many Java candidates, best first.
///
/// Candidates run in parallel, each worker with its own parse context.
/// Candidates matching `excluded_paths` or failing to load are skipped.
pub fn rank_candidates(
    cpp_path: &Path,
    java_paths: &[PathBuf],
    config: &Config,
) -> Result<Vec<EquivalenceReport>> {
    check_threshold(config.threshold)?;
    let exclusions = config.exclusions()?;
    let cpp = load_cpp_fields(&mut ParseContext::new(), cpp_path, config)?;

    let mut reports: Vec<EquivalenceReport> = java_paths
        .par_iter()
        .filter(|path| !exclusions.is_excluded(path))
        .map_init(ParseContext::new, |ctx, path| {
            let loaded = load_java_fields(ctx, path, config)
                .and_then(|java| report_for(cpp_path, path, &cpp, &java, config.threshold));
            match loaded {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping candidate");
                    None
                }
            }
        })
        .flatten()
        .collect();

    reports.sort_by(|a, b| {
        b.score
            .match_percentage
            .partial_cmp(&a.score.match_percentage)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.java_file.cmp(&b.java_file))
    });

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpp(names: &[&str]) -> Vec<VariableDeclaration> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| VariableDeclaration {
                name: n.to_string(),
                var_type: "int".to_string(),
                line: i + 1,
                initialization: None,
            })
            .collect()
    }

    fn java(names: &[&str]) -> Vec<FieldRecord> {
        names
            .iter()
            .map(|n| FieldRecord {
                name: n.to_string(),
                field_type: "Integer".to_string(),
                modifiers: None,
            })
            .collect()
    }

    #[test]
    fn test_single_exact_pair_is_excellent() {
        let result = score(&cpp(&["report_version"]), &java(&["_ReportVersion"]), 80.0).unwrap();
        assert_eq!(result.matches_found, 1);
        assert_eq!(result.matches[0].similarity_score, 100.0);
        assert_eq!(result.matches[0].normalized_cpp, "reportversion");
        assert_eq!(result.matches[0].normalized_java, "reportversion");
        assert_eq!(result.match_percentage, 100.0);
        assert_eq!(result.final_result, Verdict::Excellent);
    }

    #[test]
    fn test_empty_cpp_side() {
        let result = score(&[], &java(&["a", "b"]), 80.0).unwrap();
        assert_eq!(result.final_result, Verdict::NoMatch);
        assert_eq!(result.match_percentage, 0.0);
        assert_eq!(result.java_fields_count, 2);
        assert_eq!(result.cpp_fields_count, 0);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_empty_java_side() {
        let result = score(&cpp(&["a"]), &[], 80.0).unwrap();
        assert_eq!(result.final_result, Verdict::NoMatch);
        assert_eq!(result.matches_found, 0);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(
            score(&cpp(&["a"]), &java(&["a"]), 100.5),
            Err(Error::InvalidThreshold(_))
        ));
        assert!(score(&cpp(&["a"]), &java(&["a"]), -1.0).is_err());
        assert!(score(&cpp(&["a"]), &java(&["a"]), 0.0).is_ok());
        assert!(score(&cpp(&["a"]), &java(&["a"]), 100.0).is_ok());
    }

    #[test]
    fn test_many_to_many_sorted_within_group() {
        let result = score(
            &cpp(&["user_name", "id"]),
            &java(&["userNames", "_UserName", "ID"]),
            80.0,
        )
        .unwrap();

        let pairs: Vec<(&str, &str)> = result
            .matches
            .iter()
            .map(|m| (m.cpp_field.name.as_str(), m.java_field.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("user_name", "_UserName"),
                ("user_name", "userNames"),
                ("id", "ID")
            ]
        );
        assert_eq!(result.cpp_fields_matched, 2);
        // three distinct Java names over two C++ fields
        assert_eq!(result.java_fields_matched, 3);
        assert_eq!(result.match_percentage, 150.0);
        assert_eq!(result.final_result, Verdict::Excellent);
    }

    #[test]
    fn test_possible_and_no_match() {
        let result = score(&cpp(&["alpha", "beta"]), &java(&["Alpha", "zzz"]), 80.0).unwrap();
        assert_eq!(result.match_percentage, 50.0);
        assert_eq!(result.final_result, Verdict::Possible);

        let result = score(&cpp(&["alpha", "beta", "gamma"]), &java(&["Alpha"]), 80.0).unwrap();
        assert_eq!(result.match_percentage, 33.33);
        assert_eq!(result.final_result, Verdict::NoMatch);
    }

    #[test]
    fn test_verdict_json() {
        assert_eq!(serde_json::to_string(&Verdict::NoMatch).unwrap(), "\"no-match\"");
        assert_eq!(Verdict::Excellent.to_string(), "excellent");
    }

    #[test]
    fn test_report_json_shape() {
        let report = report_for(
            Path::new("Report.h"),
            Path::new("Report.java"),
            &cpp(&["report_version"]),
            &java(&["_ReportVersion"]),
            80.0,
        )
        .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cpp_file"], "Report.h");
        assert_eq!(json["final_result"], "excellent");
        assert_eq!(json["matches"][0]["cpp_field"]["name"], "report_version");
        assert_eq!(json["matches"][0]["java_field"]["type"], "Integer");
        assert!(json.get("all_cpp_fields").is_none());
    }
}
