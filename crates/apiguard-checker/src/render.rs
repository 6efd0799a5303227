//! Text and JSON rendering of reports

use crate::report::{ConsistencyReport, FindingKind, Severity};
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 60;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable sections
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected text or json)")),
        }
    }
}

/// Render `report` in `format`
///
/// # Errors
/// Returns error only if JSON serialization fails
pub fn render(
    report: &ConsistencyReport,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

/// Human-readable report
#[must_use]
pub fn render_text(report: &ConsistencyReport) -> String {
    let mut out = String::new();
    // Writing into a String never fails
    write_text(&mut out, report).ok();
    out
}

/// Write the human-readable report to `out`
///
/// # Errors
/// Propagates errors from the writer
pub fn write_text<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    let summary = &report.summary;

    writeln!(out, "{rule}")?;
    writeln!(out, "API consistency report ({})", report.root.display())?;
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "registry {} | convention {}",
        report.config_version, report.convention
    )?;

    if report.is_clean() {
        writeln!(out, "\nNo API consistency issues found.")?;
        writeln!(
            out,
            "Checked {} distinct {} in {} files.",
            summary.distinct_methods,
            callee_noun(report),
            summary.files_scanned
        )?;
        return write_notes(out, report);
    }

    writeln!(out, "\nStatistics:")?;
    writeln!(out, "  - files scanned: {}", summary.files_scanned)?;
    writeln!(out, "  - files calling the client: {}", summary.files_referencing)?;
    writeln!(
        out,
        "  - distinct {} called: {}",
        callee_noun(report),
        summary.distinct_methods
    )?;
    if report.convention.is_member() {
        writeln!(out, "  - deprecated methods used: {}", summary.deprecated)?;
        writeln!(out, "  - invalid calls: {}", summary.invalid)?;
    }
    writeln!(out, "  - argument-count mismatches: {}", summary.arity_mismatches)?;
    if report.convention.is_member() {
        writeln!(out, "  - files bypassing the registry: {}", summary.unmapped_files)?;
    }
    writeln!(out, "  - unanalyzable calls: {}", summary.unanalyzable)?;

    write_deprecated(out, report)?;
    write_invalid(out, report)?;
    write_arity(out, report)?;
    write_unmapped(out, report)?;
    write_unanalyzable(out, report)?;
    write_fixes(out, report)?;
    write_notes(out, report)?;

    let status = if report.has_blocking_issues() { "FAILED" } else { "PASSED" };
    writeln!(out, "\nStatus: {status}")
}

fn callee_noun(report: &ConsistencyReport) -> &'static str {
    if report.convention.is_member() {
        "methods"
    } else {
        "endpoints"
    }
}

fn write_deprecated<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    if report.deprecated.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nDeprecated API usage [{}]:", severity(FindingKind::Deprecated))?;
    for usage in &report.deprecated {
        write!(out, "\n  {} -> use {}", usage.method, usage.replacement)?;
        if usage.final_replacement != usage.replacement {
            write!(out, " (finally {})", usage.final_replacement)?;
        }
        writeln!(out)?;
        for site in &usage.call_sites {
            writeln!(out, "    - {}", site.location())?;
        }
    }
    Ok(())
}

fn write_invalid<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    if report.invalid.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nInvalid API methods [{}]:", severity(FindingKind::Invalid))?;
    for call in &report.invalid {
        write!(out, "  - {} ({})", call.site.method, call.site.location())?;
        if let Some(suggestion) = &call.suggestion {
            write!(out, " did you mean {suggestion}?")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_arity<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    if report.arity_mismatches.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "\nInconsistent argument counts [{}]:",
        severity(FindingKind::ArityMismatch)
    )?;
    for mismatch in &report.arity_mismatches {
        writeln!(out, "\n  {}:", mismatch.method)?;
        for variant in &mismatch.variants {
            let locations: Vec<String> =
                variant.call_sites.iter().map(|s| s.location()).collect();
            writeln!(
                out,
                "    {} argument(s): {}",
                variant.argument_count,
                locations.join(", ")
            )?;
        }
    }
    Ok(())
}

fn write_unmapped<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    if report.unmapped_usage.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "\nFiles not using the API mapping [{}]:",
        severity(FindingKind::UnmappedUsage)
    )?;
    for path in &report.unmapped_usage {
        writeln!(out, "  - {}", path.display())?;
    }
    Ok(())
}

fn write_unanalyzable<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    if report.unanalyzable.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "\nCalls that cannot be checked statically [{}]:",
        severity(FindingKind::Unanalyzable)
    )?;
    for call in &report.unanalyzable {
        writeln!(
            out,
            "  - {}:{} {} ({})",
            call.file_path.display(),
            call.line,
            call.snippet,
            call.reason
        )?;
    }
    Ok(())
}

fn write_fixes<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    writeln!(out, "\nSuggested fixes:")?;
    if !report.deprecated.is_empty() {
        writeln!(
            out,
            "  1. Replace deprecated methods with their replacements (apiguard fix --write)"
        )?;
    }
    if !report.invalid.is_empty() {
        writeln!(out, "  2. Check invalid method names and define them in the API mapping")?;
    }
    if !report.unmapped_usage.is_empty() || !report.arity_mismatches.is_empty() {
        writeln!(out, "  3. Route API calls through the shared API mapping module")?;
    }
    Ok(())
}

fn write_notes<W: Write>(out: &mut W, report: &ConsistencyReport) -> fmt::Result {
    if !report.skipped.is_empty() {
        writeln!(out, "\nSkipped files:")?;
        for skipped in &report.skipped {
            writeln!(out, "  - {}: {}", skipped.path.display(), skipped.reason)?;
        }
    }
    if !report.config_warnings.is_empty() {
        writeln!(out, "\nConfiguration warnings:")?;
        for warning in &report.config_warnings {
            writeln!(out, "  - {warning}")?;
        }
    }
    Ok(())
}

fn severity(kind: FindingKind) -> &'static str {
    match kind.severity() {
        Severity::Blocking => "blocking",
        Severity::Advisory => "advisory",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DeprecatedUsage, InvalidCall, ReportSummary};
    use apiguard_scanner::{CallConvention, CallSite};
    use std::path::PathBuf;

    fn report() -> ConsistencyReport {
        let site = |method: &str, line| CallSite {
            method: method.into(),
            argument_count: 0,
            file_path: PathBuf::from("src/a.js"),
            line: Some(line),
        };
        ConsistencyReport {
            root: PathBuf::from("web"),
            config_version: "2025.09".into(),
            convention: CallConvention::default(),
            summary: ReportSummary {
                files_scanned: 1,
                deprecated: 1,
                invalid: 1,
                ..ReportSummary::default()
            },
            deprecated: vec![DeprecatedUsage {
                method: "getOldThing".into(),
                replacement: "getNewThing".into(),
                final_replacement: "getNewThing".into(),
                call_sites: vec![site("getOldThing", 3)],
            }],
            invalid: vec![InvalidCall {
                site: site("getTagLsit", 7),
                suggestion: Some("getTagList".into()),
            }],
            arity_mismatches: vec![],
            unmapped_usage: vec![],
            unanalyzable: vec![],
            skipped: vec![],
            config_warnings: vec![],
            duplicate_methods: vec![],
        }
    }

    #[test]
    fn text_sections_in_order() {
        let text = render_text(&report());
        let deprecated = text.find("Deprecated API usage").unwrap();
        let invalid = text.find("Invalid API methods").unwrap();
        let fixes = text.find("Suggested fixes").unwrap();
        assert!(deprecated < invalid && invalid < fixes);
        assert!(text.contains("getOldThing -> use getNewThing"));
        assert!(text.contains("src/a.js:3"));
        assert!(text.contains("getTagLsit (src/a.js:7) did you mean getTagList?"));
        assert!(text.trim_end().ends_with("Status: FAILED"));
    }

    #[test]
    fn clean_report() {
        let mut clean = report();
        clean.deprecated.clear();
        clean.invalid.clear();
        let text = render_text(&clean);
        assert!(text.contains("No API consistency issues found."));
        assert!(!text.contains("Status"));
    }

    #[test]
    fn json_format() {
        let json = render(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["invalid"][0]["suggestion"], "getTagList");
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn wrapper_report_counts_endpoints() {
        let mut wrapper = report();
        wrapper.convention = CallConvention::wrapper("ajax").unwrap();
        wrapper.deprecated.clear();
        wrapper.invalid.clear();
        wrapper.summary.distinct_methods = 3;
        let text = render_text(&wrapper);
        assert!(text.contains("Checked 3 distinct endpoints in 1 files."));
        assert!(text.contains("convention ajax('<endpoint>', ...)"));

        let mut out = String::new();
        write_text(&mut out, &wrapper).unwrap();
        assert_eq!(out, text);
    }
}
