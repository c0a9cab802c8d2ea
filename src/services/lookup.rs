use crate::model::catalog::Catalog;
use crate::model::message::MessageStatus;

/// Translator-style lookup: resolve `(context, source, comment)` to the
/// finished translation, fall back to the source text, then substitute
/// positional `%N` placeholders. Vanished and obsolete entries never
/// resolve.
pub fn translate(
    catalog: &Catalog,
    context: &str,
    source: &str,
    comment: Option<&str>,
    args: &[String],
) -> String {
    let text = find(catalog, context, source, comment).unwrap_or(source);
    substitute(text, args)
}

fn find<'a>(
    catalog: &'a Catalog,
    context: &str,
    source: &str,
    comment: Option<&str>,
) -> Option<&'a str> {
    let ctx = catalog.contexts.iter().find(|c| c.name == context)?;
    let msg = ctx.messages.iter().find(|m| {
        m.status == MessageStatus::Finished && m.source == source && m.comment.as_deref() == comment
    })?;

    if msg.numerus {
        // plural-rule selection is the caller's concern; the first filled
        // form is the best we can do without a count
        return msg
            .numerus_forms
            .iter()
            .find(|f| !f.is_empty())
            .map(String::as_str);
    }

    if msg.translation.is_empty() {
        None
    } else {
        Some(&msg.translation)
    }
}

/// `%1`..`%99` substitution with the framework's greedy two-digit rule:
/// `%12` names argument 12 when twelve arguments were supplied, and is
/// `%1` followed by a literal `2` otherwise. Markers without a matching
/// argument stay literal.
pub fn substitute(pattern: &str, args: &[String]) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '%' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
            let d1 = chars[i + 1] as usize - '0' as usize;

            if i + 2 < chars.len() && chars[i + 2].is_ascii_digit() {
                let n2 = d1 * 10 + (chars[i + 2] as usize - '0' as usize);
                if (1..=args.len()).contains(&n2) {
                    out.push_str(&args[n2 - 1]);
                    i += 3;
                    continue;
                }
            }

            if (1..=args.len()).contains(&d1) {
                out.push_str(&args[d1 - 1]);
                i += 2;
                continue;
            }
        }

        out.push(chars[i]);
        i += 1;
    }

    out
}
