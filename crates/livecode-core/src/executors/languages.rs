//! Mapping from the editor's friendly language keys to catalog identifiers
//!
//! The execution backend names its languages like `"Python (3.8.1)"` or
//! `"C++ (GCC 9.2.0)"`, and the editor only knows `python` or `cpp`. Each
//! supported key owns an ordered list of name predicates; the first predicate
//! that matches any catalog entry decides, and within a predicate the first
//! matching entry in catalog order wins. Keys without a rule fall back to a
//! plain substring search on the key itself.

use crate::core_types::LanguageDescriptor;

type NamePredicate = fn(&str) -> bool;

/// Heuristics for one group of friendly keys.
pub struct LanguageRule {
    pub keys: &'static [&'static str],
    /// Tried in order. Names are lower-cased before being tested.
    pub predicates: &'static [NamePredicate],
}

fn python3(name: &str) -> bool {
    name.contains("python") && name.contains('3')
}

fn python_any(name: &str) -> bool {
    name.contains("python")
}

fn javascript(name: &str) -> bool {
    name.contains("javascript") || name.contains("nodejs") || name.contains("node.js") || name.contains("node")
}

fn cpp(name: &str) -> bool {
    name.contains("c++") || name.contains("cpp")
}

fn c(name: &str) -> bool {
    name == "c" || name.contains("gcc") || name.contains("c (gcc)")
}

fn java(name: &str) -> bool {
    name.contains("java") && !name.contains("javascript")
}

pub static LANGUAGE_RULES: &[LanguageRule] = &[
    LanguageRule {
        keys: &["python"],
        predicates: &[python3, python_any],
    },
    LanguageRule {
        keys: &["javascript"],
        predicates: &[javascript],
    },
    LanguageRule {
        keys: &["c++", "cpp"],
        predicates: &[cpp],
    },
    LanguageRule {
        keys: &["c"],
        predicates: &[c],
    },
    LanguageRule {
        keys: &["java"],
        predicates: &[java],
    },
];

/// Find the rule registered for an already lower-cased key.
pub fn rule_for(key: &str) -> Option<&'static LanguageRule> {
    LANGUAGE_RULES.iter().find(|rule| rule.keys.contains(&key))
}

fn first_match(catalog: &[LanguageDescriptor], predicate: impl Fn(&str) -> bool) -> Option<u32> {
    catalog
        .iter()
        .find(|language| predicate(&language.name.to_lowercase()))
        .map(|language| language.id)
}

/// Resolve a friendly key against a catalog. `None` means the language is unsupported.
pub fn resolve_language_id(catalog: &[LanguageDescriptor], key: &str) -> Option<u32> {
    let key = key.trim().to_lowercase();

    match rule_for(&key) {
        Some(rule) => rule
            .predicates
            .iter()
            .find_map(|predicate| first_match(catalog, predicate)),
        None => first_match(catalog, |name| name.contains(key.as_str())),
    }
}
