//! Character classification.
//!
//! A box file token is turned into a [`Label`] in two steps: an ordered rule
//! table maps the raw token to a base name (first match wins), then a case or
//! category prefix is applied. The result is always usable as a single path
//! component.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// Punctuation mnemonics that are never given a case prefix.
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "tilde|period|comma|colon|semicolon|apostrophe|quot|exclamation|lparen|rparen|hyphen|question",
    )
    .expect("static punctuation pattern")
});

static UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new("[A-Z]").expect("static pattern"));

static LOWER: LazyLock<Regex> = LazyLock::new(|| Regex::new("[a-z]").expect("static pattern"));

static AE_ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new("e6").expect("static pattern"));

/// ASCII characters that cannot appear in a file name on common platforms.
const UNSAFE_ASCII: &[char] = &['/', '\\', '*', '"', '<', '>', '|'];

/// Fixed names for single-character punctuation tokens.
const MNEMONICS: &[(&str, &str)] = &[
    ("~", "tilde"),
    (".", "period"),
    (",", "comma"),
    (":", "colon"),
    (";", "semicolon"),
    ("!", "exclamation"),
    ("(", "lparen"),
    (")", "rparen"),
    ("-", "hyphen"),
    ("?", "question"),
];

/// A box file token seen both raw and in escaped form.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub raw: &'a str,
    pub escaped: String,
}

impl<'a> Token<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            escaped: escape_token(raw),
        }
    }
}

/// What a matching rule turns the token into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Replace the token with a fixed name.
    Fixed(&'static str),
    /// Replace the token with its punctuation mnemonic.
    Mnemonic,
    /// Spell every escaped or unsafe character as its bare code form (`u2014`).
    CodePoints,
}

/// One entry of the classification table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Token) -> bool,
    pub action: Action,
}

impl Rule {
    fn apply(&self, token: &Token) -> String {
        match self.action {
            Action::Fixed(label) => label.to_string(),
            Action::Mnemonic => mnemonic(token.raw).unwrap_or(token.raw).to_string(),
            Action::CodePoints => token.raw.chars().map(code_component).collect(),
        }
    }
}

/// Classification rules in priority order.
///
/// The ae rule inspects the escaped form and sits before the generic escape
/// rule, so every escape containing `e6` resolves to `u00e6`.
pub static RULES: &[Rule] = &[
    Rule {
        name: "ae",
        matches: is_ae_escape,
        action: Action::Fixed("u00e6"),
    },
    Rule {
        name: "apostrophe",
        matches: is_right_single_quote,
        action: Action::Fixed("apostrophe"),
    },
    Rule {
        name: "lquot",
        matches: is_left_double_quote,
        action: Action::Fixed("lquot"),
    },
    Rule {
        name: "rquot",
        matches: is_right_double_quote,
        action: Action::Fixed("rquot"),
    },
    Rule {
        name: "unicode-escape",
        matches: has_escape,
        action: Action::CodePoints,
    },
    Rule {
        name: "punctuation",
        matches: is_punctuation,
        action: Action::Mnemonic,
    },
    Rule {
        name: "unsafe",
        matches: is_unsafe,
        action: Action::CodePoints,
    },
];

fn is_ae_escape(token: &Token) -> bool {
    AE_ESCAPE.is_match(&token.escaped)
}

fn is_right_single_quote(token: &Token) -> bool {
    token.raw == "\u{2019}"
}

fn is_left_double_quote(token: &Token) -> bool {
    token.raw == "\u{201C}"
}

fn is_right_double_quote(token: &Token) -> bool {
    token.raw == "\u{201D}"
}

fn has_escape(token: &Token) -> bool {
    token.raw.chars().any(needs_escape)
}

fn is_punctuation(token: &Token) -> bool {
    mnemonic(token.raw).is_some()
}

// `.` and `..` are not usable as folder names
fn is_unsafe(token: &Token) -> bool {
    token.raw.contains(UNSAFE_ASCII) || token.raw.chars().all(|c| c == '.')
}

fn mnemonic(raw: &str) -> Option<&'static str> {
    MNEMONICS
        .iter()
        .find(|(token, _)| *token == raw)
        .map(|(_, name)| *name)
}

fn needs_escape(c: char) -> bool {
    !c.is_ascii() || c.is_ascii_control()
}

/// Bare code form of one character, without the escape marker.
fn code_form(c: char) -> String {
    let code = c as u32;
    if code > 0xffff {
        format!("U{code:08x}")
    } else {
        format!("u{code:04x}")
    }
}

fn code_component(c: char) -> String {
    if needs_escape(c) || UNSAFE_ASCII.contains(&c) || c == '.' {
        code_form(c)
    } else {
        c.to_string()
    }
}

/// Escaped form of a token.
///
/// Printable ASCII stays as is, a backslash is doubled, everything else is
/// written as `\uXXXX` (or `\UXXXXXXXX` outside the basic multilingual plane)
/// with lowercase hex digits.
///
/// # Example
/// ```
/// use glyphsort_core::analysis::labels::escape_token;
/// assert_eq!(escape_token("A"), "A");
/// assert_eq!(escape_token("\u{2019}"), "\\u2019");
/// assert_eq!(escape_token("\\"), "\\\\");
/// ```
pub fn escape_token(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' {
            escaped.push_str("\\\\");
        } else if needs_escape(c) {
            escaped.push('\\');
            escaped.push_str(&code_form(c));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Runs the rule table and returns the base name, before any case prefix.
pub fn classify(raw: &str) -> String {
    let token = Token::new(raw);

    RULES
        .iter()
        .find(|rule| (rule.matches)(&token))
        .map(|rule| rule.apply(&token))
        .unwrap_or_else(|| raw.to_string())
}

/// Prepends `Upper-` or `lower-` to a base name, leaving mnemonics alone.
pub fn case_prefix(base: &str) -> String {
    if PUNCTUATION.is_match(base) {
        base.to_string()
    } else if UPPER.is_match(base) {
        format!("Upper-{base}")
    } else if LOWER.is_match(base) {
        format!("lower-{base}")
    } else {
        base.to_string()
    }
}

/// Filesystem-safe name of a character class.
///
/// Used verbatim as the glyph folder name and as the glyph file name prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Classifies a raw box file token.
    ///
    /// # Example
    /// ```
    /// use glyphsort_core::analysis::labels::Label;
    /// assert_eq!(Label::from_token("A").name(), "Upper-A");
    /// assert_eq!(Label::from_token(".").name(), "period");
    /// ```
    pub fn from_token(raw: &str) -> Self {
        Self(case_prefix(&classify(raw)))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_characters_map_to_mnemonics() {
        let cases = [
            ("\u{2019}", "apostrophe"),
            ("\u{201C}", "lquot"),
            ("\u{201D}", "rquot"),
            ("~", "tilde"),
            (".", "period"),
            (",", "comma"),
            (":", "colon"),
            (";", "semicolon"),
            ("!", "exclamation"),
            ("(", "lparen"),
            (")", "rparen"),
            ("-", "hyphen"),
            ("?", "question"),
        ];

        for (raw, expected) in cases {
            assert_eq!(classify(raw), expected, "base name for {raw:?}");
            assert_eq!(Label::from_token(raw).name(), expected, "label for {raw:?}");
        }
    }

    #[test]
    fn test_ae_rule_wins_over_generic_escape() {
        assert_eq!(Label::from_token("\u{e6}").name(), "lower-u00e6");

        // U+1E6B escapes to `\u1e6b`: matches both rules, the earlier one wins
        let token = Token::new("\u{1e6b}");
        assert!(AE_ESCAPE.is_match(&token.escaped));
        assert!(token.raw.chars().any(needs_escape));
        assert_eq!(classify("\u{1e6b}"), "u00e6");
    }

    #[test]
    fn test_generic_escape_strips_marker() {
        assert_eq!(escape_token("\u{2014}"), "\\u2014");
        assert_eq!(classify("\u{2014}"), "u2014");
        assert_eq!(Label::from_token("\u{2014}").name(), "lower-u2014");

        assert_eq!(classify("\u{fb01}"), "ufb01");
        assert_eq!(classify("\u{1d400}"), "U0001d400");
        assert_eq!(Label::from_token("\u{1d400}").name(), "Upper-U0001d400");

        // accented letters outside the special cases
        assert_eq!(Label::from_token("\u{e9}").name(), "lower-u00e9");
    }

    #[test]
    fn test_case_prefix() {
        for c in 'A'..='Z' {
            let raw = c.to_string();
            assert_eq!(Label::from_token(&raw).name(), format!("Upper-{c}"));
        }
        for c in 'a'..='z' {
            let raw = c.to_string();
            assert_eq!(Label::from_token(&raw).name(), format!("lower-{c}"));
        }
        assert_eq!(Label::from_token("7").name(), "7");
        assert_eq!(Label::from_token("&").name(), "&");
    }

    #[test]
    fn test_unsafe_tokens_become_single_component() {
        assert_eq!(classify("/"), "u002f");
        assert_eq!(classify("\\"), "u005c");
        assert_eq!(classify("|"), "u007c");
        assert_eq!(classify(".."), "u002eu002e");
        assert_eq!(classify("\t"), "u0009");

        for raw in ["/", "\\", "*", "\"", "<", ">", "|", "..", "a/b"] {
            let label = Label::from_token(raw);
            assert!(
                !label.name().contains(UNSAFE_ASCII),
                "{raw:?} produced {label}"
            );
            assert_ne!(label.name(), "..");
        }
    }

    #[test]
    fn test_reference_row_label() {
        assert_eq!(Label::from_token("A").to_string(), "Upper-A");
    }

    #[test]
    fn test_rules_are_ordered() {
        let names = RULES.iter().map(|rule| rule.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "ae",
                "apostrophe",
                "lquot",
                "rquot",
                "unicode-escape",
                "punctuation",
                "unsafe"
            ]
        );
    }
}
