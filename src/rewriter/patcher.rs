//! Text patcher
//!
//! Applies rewrite records onto the original script text as literal
//! first-occurrence substring replacements, in emission order. Matching is
//! by text, not node identity, so a replacement can land on an earlier
//! identical-looking span; that is an accepted limitation of the engine, not
//! something the patcher second-guesses. A record whose original text no
//! longer occurs (typically because an earlier record already altered that
//! span) is a warning-producing no-op.

use super::walker::RewriteRecord;

pub struct TextPatcher {
    records: Vec<RewriteRecord>,
}

impl TextPatcher {
    pub fn new(records: Vec<RewriteRecord>) -> Self {
        Self { records }
    }

    /// Apply all records to `source`, returning the patched text and any
    /// patch-miss warnings.
    pub fn apply(self, source: &str) -> (String, Vec<String>) {
        let mut text = source.to_string();
        let mut warnings = Vec::new();

        for record in self.records {
            if record.original == record.replacement {
                continue;
            }
            match text.find(&record.original) {
                Some(position) => {
                    text.replace_range(
                        position..position + record.original.len(),
                        &record.replacement,
                    );
                }
                None => {
                    warnings.push(format!(
                        "patch target for {:?} no longer present, left unchanged: {}",
                        record.kind,
                        truncate(&record.original)
                    ));
                }
            }
        }

        (text, warnings)
    }
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 60;
    if text.len() <= LIMIT {
        text.to_string()
    } else {
        let mut end = LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewriter::walker::RewriteKind;

    fn record(original: &str, replacement: &str) -> RewriteRecord {
        RewriteRecord {
            kind: RewriteKind::TopLevelExport,
            scope_depth: 0,
            original: original.to_string(),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_first_occurrence_only() {
        let (patched, warnings) =
            TextPatcher::new(vec![record("a = 1", "a = 2")]).apply("a = 1; b = 3; a = 1;");
        assert_eq!(patched, "a = 2; b = 3; a = 1;");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_applied_in_emission_order() {
        let records = vec![record("var x = 1;", "var x = window[\"x\"] = 1;"), record("x", "y")];
        let (patched, _) = TextPatcher::new(records).apply("var x = 1;");
        // the second record matches inside the first replacement
        assert!(patched.starts_with("var y"));
    }

    #[test]
    fn test_miss_is_warning_not_error() {
        let (patched, warnings) =
            TextPatcher::new(vec![record("gone", "here")]).apply("var x = 1;");
        assert_eq!(patched, "var x = 1;");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no longer present"));
    }

    #[test]
    fn test_no_records_roundtrips() {
        let source = "var untouched = true;\n";
        let (patched, warnings) = TextPatcher::new(Vec::new()).apply(source);
        assert_eq!(patched, source);
        assert!(warnings.is_empty());
    }
}
