//! # Value Normalizer
//!
//! Maps the noisy slot values annotated in MultiWOZ onto one canonical
//! surface form per `(domain, slot)`.
//!
//! ```rust
//! use beliefprep_core::normalize::clean;
//!
//! assert_eq!(
//!     clean("taxi", "arriveBy", "1530"),
//!     ("arrive by".to_string(), "15:30".to_string())
//! );
//! assert_eq!(clean("hotel", "area", "center").1, "centre");
//! ```

pub mod rules;

use std::collections::HashMap;
use std::sync::LazyLock;

pub use rules::{Matcher, RULE_TABLE, Rule, SlotRules, TimeFormat};

/// Canonical spelling of "any value is fine".
pub const DONT_CARE: &str = "do n't care";

/// Spellings folded into [`DONT_CARE`] for every domain and slot.
const DONT_CARE_VARIANTS: &[&str] = &["dont care", "don't care", "do nt care", "doesn't care"];

/// Annotation meaning the slot was never filled.
const NOT_MENTIONED: &str = "not mentioned";

static DEFAULT_NORMALIZER: LazyLock<ValueNormalizer> = LazyLock::new(ValueNormalizer::new);

/// Trim, lowercase, straighten curly quotes and split `don't`.
pub fn clean_text(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
        .replace("don't", "do n't")
}

/// Normalizes one belief-state annotation with the built-in rule table.
///
/// Returns `(canonical_slot, canonical_value)`; an empty value means the
/// slot is unset.
pub fn clean(domain: &str, slot: &str, value: &str) -> (String, String) {
    DEFAULT_NORMALIZER.clean(domain, slot, value)
}

/// Rule-table lookup indexed by domain, then by every slot spelling.
#[derive(Debug, Clone)]
pub struct ValueNormalizer {
    index: HashMap<&'static str, HashMap<&'static str, &'static SlotRules>>,
}

impl Default for ValueNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueNormalizer {
    /// Indexes [`RULE_TABLE`].
    pub fn new() -> Self {
        Self::with_table(RULE_TABLE)
    }

    /// Indexes a custom table. Later blocks never shadow earlier ones.
    pub fn with_table(table: &'static [SlotRules]) -> Self {
        let mut index: HashMap<&'static str, HashMap<&'static str, &'static SlotRules>> =
            HashMap::new();
        for rules in table {
            let by_slot = index.entry(rules.domain).or_default();
            for slot in rules.slots {
                by_slot.entry(*slot).or_insert(rules);
            }
        }
        Self { index }
    }

    /// The rule block for `(domain, slot)`, if the corpus needs one.
    pub fn rules_for(&self, domain: &str, slot: &str) -> Option<&'static SlotRules> {
        self.index.get(domain)?.get(slot).copied()
    }

    /// Normalizes one annotation. Unknown domains, slots and values pass
    /// through after text cleaning.
    pub fn clean(&self, domain: &str, slot: &str, value: &str) -> (String, String) {
        let rules = self.rules_for(domain, slot);
        let slot = rules
            .and_then(|r| r.canonical)
            .unwrap_or(slot)
            .to_string();

        let value = clean_text(value);
        if value.is_empty() || value == NOT_MENTIONED {
            return (slot, String::new());
        }

        // Folded before the slot rules so allowlist rules keep don't-care.
        let value = if DONT_CARE_VARIANTS.iter().any(|v| *v == value) {
            DONT_CARE.to_string()
        } else {
            value
        };

        let value = match rules {
            Some(rules) => rules.apply(&value),
            None => value,
        };
        (slot, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(domain: &str, slot: &str, raw: &str) -> String {
        clean(domain, slot, raw).1
    }

    #[test]
    fn taxi_arrive_by_time_fix() {
        assert_eq!(
            clean("taxi", "arriveBy", "1530"),
            ("arrive by".to_string(), "15:30".to_string())
        );
    }

    #[test]
    fn hotel_area_center() {
        assert_eq!(value("hotel", "area", "center"), "centre");
        assert_eq!(value("hotel", "area", "  Center "), "centre");
    }

    #[test]
    fn unset_values() {
        assert_eq!(value("hotel", "area", ""), "");
        assert_eq!(value("hotel", "area", "   "), "");
        assert_eq!(value("hotel", "area", "not mentioned"), "");
        assert_eq!(value("restaurant", "food", "Not Mentioned"), "");
    }

    #[test]
    fn dont_care_everywhere() {
        for raw in ["dont care", "don't care", "doesn't care", "do nt care", "Don\u{2019}t care"] {
            for (domain, slot) in [
                ("hotel", "type"),
                ("restaurant", "area"),
                ("train", "day"),
                ("taxi", "leaveAt"),
                ("police", "unknown"),
            ] {
                assert_eq!(value(domain, slot, raw), DONT_CARE, "{domain}-{slot} {raw:?}");
            }
        }
    }

    #[test]
    fn slot_aliases_are_renamed() {
        assert_eq!(clean("hotel", "pricerange", "cheap").0, "price range");
        assert_eq!(clean("restaurant", "price range", "cheap").0, "price range");
        assert_eq!(clean("train", "leaveAt", "").0, "leave at");
        assert_eq!(clean("hotel", "book day", "monda"), ("book day".into(), "monday".into()));
    }

    #[test]
    fn unknown_combinations_pass_through() {
        assert_eq!(
            clean("police", "address", "Parkside"),
            ("address".to_string(), "parkside".to_string())
        );
        assert_eq!(value("restaurant", "food", "Modern European"), "modern european");
    }

    #[test]
    fn time_formats() {
        assert_eq!(value("taxi", "leaveAt", "17.15"), "17:15");
        assert_eq!(value("taxi", "leave at", "0700"), "07:00");
        assert_eq!(value("train", "leaveAt", "after 5:45 pm"), "17:45");
        assert_eq!(value("train", "arriveBy", "1"), "01:00");
        assert_eq!(value("restaurant", "book time", "1330"), "13:30");
    }

    #[test]
    fn allowlist_rules_clear_strays() {
        assert_eq!(value("hotel", "type", "guesthouse"), "guest house");
        assert_eq!(value("hotel", "type", "bed and breakfast"), "");
        assert_eq!(value("restaurant", "area", "cb30aq"), "centre");
        assert_eq!(value("restaurant", "area", "cambridge"), "");
    }

    #[test]
    fn name_aliases() {
        assert_eq!(value("hotel", "name", "Uni"), "university arms hotel");
        assert_eq!(value("attraction", "name", "trinity"), "trinity college");
        assert_eq!(value("attraction", "type", "Pool"), "swimming pool");
    }

    #[test]
    fn clean_is_idempotent() {
        let samples = [
            ("attraction", "area", "town centre"),
            ("attraction", "type", "concerthall"),
            ("attraction", "name", "t"),
            ("hotel", "area", "east side"),
            ("hotel", "internet", "free internet"),
            ("hotel", "parking", "free parking"),
            ("hotel", "pricerange", "any"),
            ("hotel", "stars", "four stars"),
            ("hotel", "type", "guesthouse"),
            ("hotel", "book day", "t"),
            ("restaurant", "area", "city centre"),
            ("restaurant", "pricerange", "mo"),
            ("restaurant", "food", "barbecue"),
            ("restaurant", "book time", "9"),
            ("taxi", "arriveBy", "1530"),
            ("taxi", "leaveAt", "21:4"),
            ("taxi", "leaveAt", "9.30"),
            ("taxi", "leaveAt", "9:30"),
            ("train", "arriveBy", "doesnt care"),
            ("train", "day", "doesn't care"),
            ("train", "leaveAt", "1030"),
            ("police", "name", "Parkside Police"),
        ];

        for (domain, slot, raw) in samples {
            let (slot_once, value_once) = clean(domain, slot, raw);
            let twice = clean(domain, &slot_once, &value_once);
            assert_eq!(twice, (slot_once.clone(), value_once.clone()), "{domain}-{slot} {raw:?}");
        }
    }

    #[test]
    fn clean_text_basics() {
        assert_eq!(clean_text("  Don't Care "), "do n't care");
        assert_eq!(clean_text("King\u{2019}s"), "king's");
    }

    #[test]
    fn rules_lookup() {
        let normalizer = ValueNormalizer::new();
        assert!(normalizer.rules_for("hotel", "stars").is_some());
        assert!(normalizer.rules_for("hotel", "price range").is_some());
        assert!(normalizer.rules_for("hotel", "food").is_none());
        assert!(normalizer.rules_for("hospital", "department").is_none());
    }
}
