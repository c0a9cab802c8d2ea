use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;
use crate::model::message::{Message, MessageStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct QaIssue {
    pub context: String,
    pub source: String,
    pub code: String,
    pub message: String,
}

pub fn run(catalog: &Catalog) -> Vec<QaIssue> {
    let placeholder_re = Regex::new(r"%(\d{1,2})").unwrap();
    let mut issues: Vec<QaIssue> = Vec::new();

    for ctx in &catalog.contexts {
        // (source, comment) must be unique within a context; duplicates in
        // shipped catalogs are a data-quality defect, not a feature
        let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();
        for m in &ctx.messages {
            if !seen.insert((m.source.as_str(), m.comment.as_deref())) {
                push(&mut issues, ctx, m, "DUPLICATE_SOURCE", "source string repeated within this context");
            }
        }

        for m in &ctx.messages {
            match m.status {
                MessageStatus::Vanished => {
                    if !m.locations.is_empty() {
                        push(
                            &mut issues,
                            ctx,
                            m,
                            "VANISHED_WITH_LOCATIONS",
                            "vanished message still carries location back-references",
                        );
                    }
                    continue;
                }
                MessageStatus::Obsolete => continue,
                MessageStatus::Finished | MessageStatus::Unfinished => {}
            }

            if m.source.is_empty() {
                push(&mut issues, ctx, m, "EMPTY_SOURCE", "message has an empty source string");
            }

            if m.status == MessageStatus::Unfinished {
                continue;
            }

            if m.numerus {
                if m.numerus_forms.iter().all(|f| f.trim().is_empty()) {
                    push(
                        &mut issues,
                        ctx,
                        m,
                        "NUMERUS_FORM_MISSING",
                        "plural message is finished but has no numerus forms",
                    );
                } else {
                    for form in m.numerus_forms.iter().filter(|f| !f.trim().is_empty()) {
                        check_translated_text(&mut issues, &placeholder_re, ctx, m, form);
                    }
                }
                continue;
            }

            if m.translation.trim().is_empty() {
                push(
                    &mut issues,
                    ctx,
                    m,
                    "STATUS_FINISHED_BUT_EMPTY",
                    "status says finished, but the translation is empty",
                );
                continue;
            }

            check_translated_text(&mut issues, &placeholder_re, ctx, m, &m.translation);

            if m.translation.trim() == m.source.trim() {
                push(
                    &mut issues,
                    ctx,
                    m,
                    "SAME_AS_SOURCE",
                    "translation is identical to the source string",
                );
            }
        }
    }

    issues
}

fn check_translated_text(
    issues: &mut Vec<QaIssue>,
    placeholder_re: &Regex,
    ctx: &crate::model::catalog::Context,
    m: &Message,
    translated: &str,
) {
    if placeholders(placeholder_re, &m.source) != placeholders(placeholder_re, translated) {
        push(
            issues,
            ctx,
            m,
            "PLACEHOLDER_MISMATCH",
            "positional placeholders differ between source and translation",
        );
    }

    if leading_ws(&m.source) != leading_ws(translated) || trailing_ws(&m.source) != trailing_ws(translated) {
        push(
            issues,
            ctx,
            m,
            "WHITESPACE_MISMATCH",
            "leading/trailing whitespace differs between source and translation",
        );
    }
}

/// Sorted multiset of `%N` markers; `%2` appearing twice is different
/// from appearing once.
fn placeholders(re: &Regex, text: &str) -> Vec<u32> {
    let mut found: Vec<u32> = re
        .captures_iter(text)
        .filter_map(|c| c[1].parse().ok())
        .collect();
    found.sort_unstable();
    found
}

fn leading_ws(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

fn trailing_ws(s: &str) -> &str {
    &s[s.trim_end().len()..]
}

fn push(issues: &mut Vec<QaIssue>, ctx: &crate::model::catalog::Context, m: &Message, code: &str, message: &str) {
    issues.push(QaIssue {
        context: ctx.name.clone(),
        source: m.source.clone(),
        code: code.to_string(),
        message: message.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::Context;
    use crate::model::message::Location;

    fn finished(source: &str, translation: &str) -> Message {
        Message {
            source: source.into(),
            translation: translation.into(),
            status: MessageStatus::Finished,
            ..Message::default()
        }
    }

    fn catalog(messages: Vec<Message>) -> Catalog {
        Catalog {
            contexts: vec![Context {
                name: "IntegerEnumerationControl".into(),
                messages,
            }],
            ..Catalog::default()
        }
    }

    fn codes(issues: &[QaIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn clean_catalog_yields_no_issues() {
        let issues = run(&catalog(vec![finished(
            "%1 control accepts 32-bit integers. \n Unit: %2",
            "Das %1-Steuerelement akzeptiert 32-Bit-Ganzzahlen.\n Einheit: %2",
        )]));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn detects_placeholder_mismatch() {
        let issues = run(&catalog(vec![finished(
            "%1 control accepts boolean values. Unit: %2",
            "Das Steuerelement akzeptiert boolesche Werte. Einheit %2",
        )]));
        assert_eq!(codes(&issues), vec!["PLACEHOLDER_MISMATCH"]);
    }

    #[test]
    fn placeholder_check_is_a_multiset() {
        let issues = run(&catalog(vec![finished("%1 and %1", "%1 einmal")]));
        assert_eq!(codes(&issues), vec!["PLACEHOLDER_MISMATCH"]);
    }

    #[test]
    fn detects_duplicate_source_within_context() {
        let issues = run(&catalog(vec![
            finished("Invert", "Umkehren"),
            finished("Invert", "Invertieren"),
        ]));
        assert_eq!(codes(&issues), vec!["DUPLICATE_SOURCE"]);
    }

    #[test]
    fn comment_disambiguates_duplicates() {
        let mut a = finished("Start", "Start der Aufnahme");
        a.comment = Some("recording".into());
        let b = finished("Start", "Start");
        let issues = run(&catalog(vec![a, b]));
        assert_eq!(codes(&issues), vec!["SAME_AS_SOURCE"]);
    }

    #[test]
    fn detects_finished_but_empty_and_same_as_source() {
        let issues = run(&catalog(vec![
            finished("Exposure Active", "   "),
            finished("Video4Linux", "Video4Linux"),
        ]));
        assert_eq!(
            codes(&issues),
            vec!["STATUS_FINISHED_BUT_EMPTY", "SAME_AS_SOURCE"]
        );
    }

    #[test]
    fn detects_whitespace_mismatch() {
        let issues = run(&catalog(vec![finished(
            "\n Control is READONLY",
            "Die Steuerung ist NUR LESEN",
        )]));
        assert_eq!(codes(&issues), vec!["WHITESPACE_MISMATCH"]);
    }

    #[test]
    fn vanished_messages_are_only_checked_for_locations() {
        let mut gone = finished("Failed to save sharpness!", "");
        gone.status = MessageStatus::Vanished;
        gone.locations.push(Location {
            filename: "Source/V4L2Viewer.cpp".into(),
            line: 42,
        });
        let issues = run(&catalog(vec![gone]));
        assert_eq!(codes(&issues), vec!["VANISHED_WITH_LOCATIONS"]);
    }

    #[test]
    fn unfinished_messages_are_not_checked() {
        let mut open = finished("Buffer count", "");
        open.status = MessageStatus::Unfinished;
        assert!(run(&catalog(vec![open])).is_empty());
    }

    #[test]
    fn empty_source_is_reported_for_active_messages_only() {
        let mut retired = finished("", "");
        retired.status = MessageStatus::Vanished;
        assert!(run(&catalog(vec![retired])).is_empty());

        let mut open = finished("", "");
        open.status = MessageStatus::Unfinished;
        let issues = run(&catalog(vec![open]));
        assert_eq!(codes(&issues), vec!["EMPTY_SOURCE"]);
    }

    #[test]
    fn numerus_message_needs_forms() {
        let mut plural = finished("%n frame(s)", "");
        plural.numerus = true;
        let issues = run(&catalog(vec![plural]));
        assert_eq!(codes(&issues), vec!["NUMERUS_FORM_MISSING"]);
    }
}
