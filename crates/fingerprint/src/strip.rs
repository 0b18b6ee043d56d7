//! Removal of UI-injected fragments from paragraph text.
//!
//! The widget decorates every paragraph with a count badge. When the
//! paragraph is read back as text, the badge digits would leak into the
//! fingerprint and break every later comparison. This module removes such
//! fragments without touching the rest of the text.
//!
//! For [`TextFormat::Markup`] input the text is recovered the way a DOM
//! `textContent` read would: tags are dropped, text between them is kept,
//! comments are skipped, and the common character references are decoded.
//! Elements carrying an injected class are dropped together with everything
//! nested inside them.

use std::borrow::Cow;

use crate::config::{FingerprintConfig, InjectedFragment, TextFormat};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Returns the visible text of a paragraph with all injected fragments removed.
///
/// Leading and trailing whitespace is preserved; trimming belongs to
/// [`extract`](crate::extract). The input is never modified.
///
/// # Examples
///
/// ```rust
/// use fingerprint::{strip_injected, FingerprintConfig};
///
/// let cfg = FingerprintConfig::markup();
/// let text = strip_injected(
///     r#"<p>Call me Ishmael.<span class="na-comment-count">3</span></p>"#,
///     &cfg,
/// );
/// assert_eq!(text, "Call me Ishmael.");
/// ```
pub fn strip_injected<'a>(text: &'a str, cfg: &FingerprintConfig) -> Cow<'a, str> {
    let visible = match cfg.format {
        TextFormat::Plain => Cow::Borrowed(text),
        TextFormat::Markup => {
            let classes: Vec<&str> = cfg
                .injected
                .iter()
                .filter_map(|fragment| match fragment {
                    InjectedFragment::Element { class } => Some(class.trim()),
                    InjectedFragment::Text { .. } => None,
                })
                .collect();
            Cow::Owned(text_content(text, &classes))
        }
    };
    remove_literals(visible, &cfg.injected)
}

fn remove_literals<'a>(text: Cow<'a, str>, injected: &[InjectedFragment]) -> Cow<'a, str> {
    let mut out = text;
    for fragment in injected {
        if let InjectedFragment::Text { value } = fragment {
            if !value.is_empty() && out.contains(value.as_str()) {
                out = Cow::Owned(out.replace(value.as_str(), ""));
            }
        }
    }
    out
}

enum Tag<'a> {
    Open {
        name: &'a str,
        class: Option<&'a str>,
        self_closing: bool,
    },
    Close,
    /// Doctype or processing instruction: no text, no nesting.
    Declaration,
}

impl<'a> Tag<'a> {
    /// Parses the body between `<` and `>`. `None` means the bracket was
    /// literal text (e.g. `a < b > c`).
    fn parse(body: &'a str) -> Option<Self> {
        let first = body.chars().next()?;
        if first == '/' {
            return Some(Tag::Close);
        }
        if first == '!' || first == '?' {
            return Some(Tag::Declaration);
        }
        if !first.is_ascii_alphabetic() {
            return None;
        }

        let name_end = body
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(body.len());
        Some(Tag::Open {
            name: &body[..name_end],
            class: class_attribute(&body[name_end..]),
            self_closing: body.trim_end().ends_with('/'),
        })
    }

    fn is_void(name: &str, self_closing: bool) -> bool {
        self_closing
            || VOID_ELEMENTS
                .iter()
                .any(|void| void.eq_ignore_ascii_case(name))
    }
}

/// Finds the value of the `class` attribute in a tag's attribute list.
fn class_attribute(attrs: &str) -> Option<&str> {
    let mut rest = attrs;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let mut value = None;
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (found, remaining) = match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let inner = &after_eq[1..];
                    match inner.find(quote) {
                        Some(end) => (&inner[..end], &inner[end + 1..]),
                        None => (inner, ""),
                    }
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            value = Some(found);
            rest = remaining;
        }

        if name.eq_ignore_ascii_case("class") {
            return value;
        }
    }
}

fn has_injected_class(class: Option<&str>, injected_classes: &[&str]) -> bool {
    class.is_some_and(|list| {
        list.split_whitespace()
            .any(|c| injected_classes.iter().any(|injected| *injected == c))
    })
}

/// Extracts text content from markup, dropping injected elements.
fn text_content(markup: &str, injected_classes: &[&str]) -> String {
    let mut out = String::with_capacity(markup.len());
    // Open elements nested inside an injected element; 0 means visible.
    let mut hidden_depth = 0usize;
    let mut rest = markup;

    while let Some(pos) = rest.find(['<', '&']) {
        let (before, tail) = rest.split_at(pos);
        if hidden_depth == 0 {
            out.push_str(before);
        }

        if tail.starts_with('&') {
            let (decoded, consumed) = decode_entity(tail);
            if hidden_depth == 0 {
                match decoded {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&tail[..consumed]),
                }
            }
            rest = &tail[consumed..];
            continue;
        }

        if let Some(after) = tail.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }

        let Some(close) = tail.find('>') else {
            // Unterminated bracket: the remainder is text.
            if hidden_depth == 0 {
                out.push_str(tail);
            }
            return out;
        };
        rest = &tail[close + 1..];

        match Tag::parse(&tail[1..close]) {
            None => {
                if hidden_depth == 0 {
                    out.push_str(&tail[..=close]);
                }
            }
            Some(Tag::Declaration) => {}
            Some(Tag::Close) => hidden_depth = hidden_depth.saturating_sub(1),
            Some(Tag::Open {
                name,
                class,
                self_closing,
            }) => {
                if Tag::is_void(name, self_closing) {
                    continue;
                }
                if hidden_depth > 0 {
                    hidden_depth += 1;
                } else if has_injected_class(class, injected_classes) {
                    hidden_depth = 1;
                }
            }
        }
    }

    if hidden_depth == 0 {
        out.push_str(rest);
    }
    out
}

/// Decodes a character reference at the start of `tail` (which begins with
/// `&`). Returns the decoded char, if any, and the number of bytes consumed.
fn decode_entity(tail: &str) -> (Option<char>, usize) {
    let Some(semi) = tail[1..].find(';').filter(|&i| i > 0 && i <= 10) else {
        return (None, 1);
    };
    let name = &tail[1..=semi];
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }),
    };
    match decoded {
        Some(ch) => (Some(ch), semi + 2),
        None => (None, 1),
    }
}
