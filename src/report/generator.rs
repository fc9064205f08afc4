//! Report generation

use crate::models::ConversionResult;

pub fn generate_markdown_report(result: &ConversionResult) -> String {
    let mut report = String::new();

    report.push_str("# Opera to Chromium Extension Conversion Report\n\n");

    report.push_str("## Summary\n\n");
    report.push_str(&format!(
        "- **Extension**: {} v{}\n",
        result.report.summary.extension_name, result.report.summary.extension_version
    ));
    report.push_str(&format!(
        "- **Conversion Status**: {}\n",
        if result.report.summary.conversion_successful {
            "Success"
        } else {
            "Needs attention"
        }
    ));
    report.push_str(&format!(
        "- **Files Modified**: {}\n",
        result.report.summary.files_modified
    ));
    report.push_str(&format!(
        "- **Files Added**: {}\n",
        result.report.summary.files_added
    ));
    report.push_str(&format!(
        "- **Scripts Rewritten**: {}\n",
        result.report.summary.scripts_rewritten
    ));
    report.push_str(&format!(
        "- **Permissions Granted**: {}\n\n",
        result.report.summary.permissions_granted
    ));

    if !result.report.manifest_entries.is_empty() {
        report.push_str("## Manifest\n\n");
        for entry in &result.report.manifest_entries {
            report.push_str(&format!("- {}\n", entry));
        }
        report.push('\n');
    }

    if !result.report.javascript_changes.is_empty() {
        report.push_str("## JavaScript Transformations\n\n");
        for change in &result.report.javascript_changes {
            report.push_str(&format!("- {}\n", change));
        }
        report.push('\n');
    }

    if !result.report.warnings.is_empty() {
        report.push_str("## Warnings\n\n");
        for warning in &result.report.warnings {
            report.push_str(&format!("- {}\n", warning));
        }
        report.push('\n');
    }

    report.push_str("## Next Steps\n\n");
    report.push_str("1. Replace the bundled shim stand-ins with real builds (fetch-shims)\n");
    report.push_str("2. Load the package as an unpacked extension and test it\n");
    report.push_str("3. Address the warnings listed above\n");

    report
}
