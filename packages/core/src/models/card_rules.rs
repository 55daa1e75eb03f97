//! Card Type Rules and Display Tables
//!
//! Static lookup tables keyed by argument category:
//!
//! - [`CardRule`] — placeholder copy, the terminating "sympunk" glyph and
//!   the successor category used when adding a default next child
//!   (Question → Idea → Claim → Question).
//! - [`Bullet`] — display glyph pairs for support lists: index 0 is the
//!   plain circle pair for bulleted lists, 1..=10 the circled-digit pairs
//!   for numbered lists.
//!
//! A sympunk is a presentation convention, not structural data: a single
//! trailing glyph encoding the category of the text it terminates.

use crate::models::ArgType;
use regex::Regex;
use std::sync::OnceLock;

/// Sympunk glyph for a Question.
pub const SYMPUNK_QUESTION: &str = "\u{2753}";
/// Sympunk glyph for an Idea.
pub const SYMPUNK_IDEA: &str = "\u{1F4A1}";
/// Sympunk glyph for a Claim.
pub const SYMPUNK_CLAIM: &str = "\u{1F56B}";

/// Per-category editing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRule {
    pub kind: ArgType,
    pub name: &'static str,
    /// Placeholder shown for the node's own text.
    pub placeholder: &'static str,
    /// Placeholder shown for a new support item.
    pub supports_ph: &'static str,
    /// Placeholder shown for a trailing conclusion item.
    pub concl_ph: &'static str,
    /// The sympunk glyph terminating this category's text.
    pub sympunk: &'static str,
    /// Category of the first default child.
    pub next: ArgType,
    /// Pattern of the plain punctuation this category's sympunk replaces.
    pub swap: &'static str,
}

/// The rule table. Event and SourceList nodes carry no rule; callers fall
/// back to Question defaults.
pub const CARD_RULES: [CardRule; 3] = [
    CardRule {
        kind: ArgType::Question,
        name: "Question",
        placeholder: "Enter a question",
        supports_ph: "Perhaps doing X would solve the problem\u{1F4A1}",
        concl_ph: "Add background context",
        sympunk: SYMPUNK_QUESTION,
        next: ArgType::Idea,
        swap: r"[?]$",
    },
    CardRule {
        kind: ArgType::Idea,
        name: "Idea",
        placeholder: "Enter an idea",
        supports_ph: "XYZ provide evidence to support the efficacy of the solution.",
        concl_ph: "Describe the problem it solves",
        sympunk: SYMPUNK_IDEA,
        next: ArgType::Claim,
        swap: r"[*]$",
    },
    CardRule {
        kind: ArgType::Claim,
        name: "Claim",
        placeholder: "Enter a claim",
        supports_ph: "Additionally, XYZ provides more granular reasoning or supporting evidence.",
        concl_ph: "Conclusion, restate or summarize claim",
        sympunk: SYMPUNK_CLAIM,
        next: ArgType::Question,
        swap: r"[!]$",
    },
];

/// Look up the rule for a category.
pub fn card_rule(kind: ArgType) -> Option<&'static CardRule> {
    CARD_RULES.iter().find(|rule| rule.kind == kind)
}

/// Matches plain terminators or sympunk glyphs at the end of a text.
pub fn trailing_sympunk_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[.*?!\u{1F56B}\u{1F4A1}\u{2753}]+$").expect("valid trailing sympunk pattern")
    })
}

/// Matches a text ending in a sympunk glyph proper.
pub fn sympunk_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\u{1F56B}\u{1F4A1}\u{2753}]$").expect("valid sympunk pattern")
    })
}

/// Terminate `text` with the sympunk of `kind`, replacing any existing
/// trailing punctuation or sympunk. Categories without a rule leave the
/// text untouched.
pub fn apply_sympunk(text: &str, kind: ArgType) -> String {
    let Some(rule) = card_rule(kind) else {
        return text.to_string();
    };
    let re = trailing_sympunk_regex();
    if re.is_match(text) {
        re.replace(text, rule.sympunk).into_owned()
    } else {
        format!("{}{}", text, rule.sympunk)
    }
}

/// Remove a trailing sympunk (or plain terminator run) from `text`.
pub fn strip_sympunk(text: &str) -> String {
    trailing_sympunk_regex().replace(text, "").into_owned()
}

/// Glyph pair for one support-list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bullet {
    pub index: usize,
    /// Hollow variant, shown for unvisited items.
    pub hollow: &'static str,
    /// Filled variant, shown for the current item.
    pub filled: &'static str,
    pub hollow_entity: &'static str,
    pub filled_entity: &'static str,
}

/// Index 0 is the plain bullet pair; 1..=10 are the circled-digit pairs.
pub const BULLETS: [Bullet; 11] = [
    Bullet { index: 0, hollow: "\u{25CB}", filled: "\u{25C9}", hollow_entity: "&#x25CB;", filled_entity: "&#x25C9;" },
    Bullet { index: 1, hollow: "\u{2780}", filled: "\u{278A}", hollow_entity: "&#x2780;", filled_entity: "&#x278A;" },
    Bullet { index: 2, hollow: "\u{2781}", filled: "\u{278B}", hollow_entity: "&#x2781;", filled_entity: "&#x278B;" },
    Bullet { index: 3, hollow: "\u{2782}", filled: "\u{278C}", hollow_entity: "&#x2782;", filled_entity: "&#x278C;" },
    Bullet { index: 4, hollow: "\u{2783}", filled: "\u{278D}", hollow_entity: "&#x2783;", filled_entity: "&#x278D;" },
    Bullet { index: 5, hollow: "\u{2784}", filled: "\u{278E}", hollow_entity: "&#x2784;", filled_entity: "&#x278E;" },
    Bullet { index: 6, hollow: "\u{2785}", filled: "\u{278F}", hollow_entity: "&#x2785;", filled_entity: "&#x278F;" },
    Bullet { index: 7, hollow: "\u{2786}", filled: "\u{2790}", hollow_entity: "&#x2786;", filled_entity: "&#x2790;" },
    Bullet { index: 8, hollow: "\u{2787}", filled: "\u{2791}", hollow_entity: "&#x2787;", filled_entity: "&#x2791;" },
    Bullet { index: 9, hollow: "\u{2788}", filled: "\u{2792}", hollow_entity: "&#x2788;", filled_entity: "&#x2792;" },
    Bullet { index: 10, hollow: "\u{2789}", filled: "\u{2793}", hollow_entity: "&#x2789;", filled_entity: "&#x2793;" },
];

/// Glyph pair for a list position: `None` for numbered positions past 10.
pub fn bullet(index: usize) -> Option<&'static Bullet> {
    BULLETS.get(index)
}
