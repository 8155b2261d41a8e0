//! Reporter (§4.7): sorts, truncates, sums, and writes the final
//! `rpt/sta_<case>.rpt` report, mirroring `parse_net.py`'s top-level driver
//! (sort by slack, truncate to 100, sum, write one file per case).

use std::fs;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::analyze::{AnalyzedPath, PathClass};

pub const TOP_N: usize = 100;

pub struct ReportSummary {
    pub total_setup_slack: f64,
    pub total_hold_slack: f64,
    pub total_combinational_delay: f64,
    pub text: String,
}

/// Build the final report text from every analyzed path, applying the §4.7
/// sort/truncate/sum rules. `top` overrides [`TOP_N`], clamped to it.
pub fn build_report(paths: &[AnalyzedPath], top: usize) -> ReportSummary {
    let top = top.min(TOP_N);

    let mut setup_violated: Vec<&AnalyzedPath> =
        paths.iter().filter(|p| p.is_setup_violated()).collect();
    setup_violated.sort_by_key(|p| OrderedFloat(p.setup_slack.unwrap()));
    setup_violated.truncate(top);

    let mut hold_violated: Vec<&AnalyzedPath> =
        paths.iter().filter(|p| p.is_hold_violated()).collect();
    hold_violated.sort_by_key(|p| OrderedFloat(p.hold_slack.unwrap()));
    hold_violated.truncate(top);

    let combinational: Vec<&AnalyzedPath> = paths
        .iter()
        .filter(|p| p.class == PathClass::InToOut)
        .collect();

    let total_setup_slack: f64 = setup_violated.iter().map(|p| p.setup_slack.unwrap()).sum();
    let total_hold_slack: f64 = hold_violated.iter().map(|p| p.hold_slack.unwrap()).sum();
    let total_combinational_delay: f64 = combinational.iter().map(|p| p.data_arrival_time).sum();

    let mut text = String::new();
    text.push_str(&format!("Total setup slack {total_setup_slack:.3} ns\n"));
    text.push_str(&format!("Total hold slack {total_hold_slack:.3} ns\n"));
    text.push_str(&format!(
        "Total combinal Port delay: {total_combinational_delay:.3} ns\n\n\n"
    ));

    text.push_str(&format!("Top {} setup violated paths:\n", setup_violated.len()));
    text.push_str(&setup_violated.iter().map(|p| p.setup_report.as_str()).join(""));
    text.push('\n');

    text.push_str(&format!("Top {} hold violated paths:\n", hold_violated.len()));
    text.push_str(&hold_violated.iter().map(|p| p.hold_report.as_str()).join(""));
    text.push('\n');

    text.push_str(&format!(
        "Top {} combinational critical paths:\n",
        combinational.len()
    ));
    text.push_str(&combinational.iter().map(|p| p.report.as_str()).join(""));

    ReportSummary {
        total_setup_slack,
        total_hold_slack,
        total_combinational_delay,
        text,
    }
}

/// Derive `<case>` from a design directory path: its file stem, the same
/// extraction the distilled source performs on `data/.../testdata_3`.
pub fn case_name(design_dir: &Path) -> String {
    design_dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "design".to_string())
}

/// Write `summary.text` to `<report_dir>/sta_<case>.rpt`, creating
/// `report_dir` if absent.
pub fn write_report(report_dir: &Path, case: &str, summary: &ReportSummary) -> anyhow::Result<()> {
    fs::create_dir_all(report_dir)?;
    let path = report_dir.join(format!("sta_{case}.rpt"));
    let mut file = fs::File::create(&path)?;
    file.write_all(summary.text.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_path(slack: f64) -> AnalyzedPath {
        AnalyzedPath {
            class: PathClass::FfToFf,
            data_arrival_time: 1.0,
            setup_slack: Some(slack),
            hold_slack: Some(1.0),
            setup_report: format!("path with setup slack {slack}\n"),
            hold_report: String::new(),
            report: String::new(),
        }
    }

    #[test]
    fn sorts_ascending_and_sums_violations() {
        let paths = vec![setup_path(-1.0), setup_path(-5.0), setup_path(2.0)];
        let summary = build_report(&paths, 100);
        assert_eq!(summary.total_setup_slack, -6.0);
        assert!(summary.text.contains("setup slack -5"));
    }

    #[test]
    fn truncates_to_top_n() {
        let paths: Vec<_> = (0..150).map(|i| setup_path(-(i as f64))).collect();
        let summary = build_report(&paths, 100);
        assert_eq!(summary.text.matches("path with setup slack").count(), 100);
    }

    #[test]
    fn case_name_is_directory_stem() {
        let path = Path::new("data/testcase_10_29/testdata_3");
        assert_eq!(case_name(path), "testdata_3");
    }
}
