//! Corpus-specific value fixes, one block per `(domain, slot)`.
//!
//! Rules inside a block are tried in order and the first match wins. An
//! empty replacement clears the value.

use super::DONT_CARE;

/// Predicate over an already lowercased value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The value is one of the listed strings.
    OneOf(&'static [&'static str]),
    /// The value is none of the listed strings.
    NoneOf(&'static [&'static str]),
}

impl Matcher {
    /// Whether `value` satisfies the predicate.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::OneOf(values) => values.iter().any(|v| *v == value),
            Self::NoneOf(values) => values.iter().all(|v| *v != value),
        }
    }
}

/// A single rewrite: values satisfying `matcher` become `replacement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Matcher,
    pub replacement: &'static str,
}

/// Separator fix applied to time slots before their rules run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Not a time slot.
    AsIs,
    /// `15.30` → `15:30`.
    DotToColon,
}

/// All rules for one `(domain, slot)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRules {
    pub domain: &'static str,
    /// Every spelling of the slot name found in the corpus.
    pub slots: &'static [&'static str],
    /// Name the slot is renamed to, if it differs between spellings.
    pub canonical: Option<&'static str>,
    pub rules: &'static [Rule],
    pub time_format: TimeFormat,
}

impl SlotRules {
    /// Applies the block to an already cleaned value.
    pub fn apply(&self, value: &str) -> String {
        let value = match self.time_format {
            TimeFormat::AsIs => value.to_string(),
            TimeFormat::DotToColon => value.replace('.', ":"),
        };

        match self.rules.iter().find(|rule| rule.matcher.matches(&value)) {
            Some(rule) => rule.replacement.to_string(),
            None => value,
        }
    }
}

const fn to(values: &'static [&'static str], replacement: &'static str) -> Rule {
    Rule {
        matcher: Matcher::OneOf(values),
        replacement,
    }
}

const fn unless(values: &'static [&'static str], replacement: &'static str) -> Rule {
    Rule {
        matcher: Matcher::NoneOf(values),
        replacement,
    }
}

const fn block(
    domain: &'static str,
    slots: &'static [&'static str],
    rules: &'static [Rule],
) -> SlotRules {
    SlotRules {
        domain,
        slots,
        canonical: None,
        rules,
        time_format: TimeFormat::AsIs,
    }
}

const fn renamed(
    domain: &'static str,
    slots: &'static [&'static str],
    canonical: &'static str,
    rules: &'static [Rule],
    time_format: TimeFormat,
) -> SlotRules {
    SlotRules {
        domain,
        slots,
        canonical: Some(canonical),
        rules,
        time_format,
    }
}

const BOOK_DAY: &[Rule] = &[to(&["monda"], "monday"), to(&["t"], "tuesday")];

/// Every per-slot rule block, grouped by domain.
pub static RULE_TABLE: &[SlotRules] = &[
    // attraction
    block(
        "attraction",
        &["name"],
        &[to(&["t"], ""), to(&["trinity"], "trinity college")],
    ),
    block(
        "attraction",
        &["area"],
        &[
            to(&["town centre", "cent", "center", "ce"], "centre"),
            to(
                &["ely", "in town", "museum", "norwich", "same area as hotel"],
                "",
            ),
            to(&["we"], "west"),
        ],
    ),
    block(
        "attraction",
        &["type"],
        &[
            to(&["m", "mus", "musuem"], "museum"),
            to(&["art", "architectural"], "architecture"),
            to(&["churches"], "church"),
            to(&["coll"], "college"),
            to(&["concert", "concerthall"], "concert hall"),
            to(&["night club"], "nightclub"),
            to(
                &["mutiple sports", "mutliple sports", "sports", "galleria"],
                "multiple sports",
            ),
            to(&["ol", "science", "gastropub", "la raza"], ""),
            to(&["swimmingpool", "pool"], "swimming pool"),
            to(&["fun"], "entertainment"),
        ],
    ),
    // hotel
    block(
        "hotel",
        &["area"],
        &[
            to(
                &["cen", "centre of town", "near city center", "center"],
                "centre",
            ),
            to(&["east area", "east side"], "east"),
            to(&["in the north", "north part of town"], "north"),
            to(&["we"], "west"),
        ],
    ),
    block("hotel", &["book day"], BOOK_DAY),
    block(
        "hotel",
        &["name"],
        &[
            to(&["uni"], "university arms hotel"),
            to(&["university arms"], "university arms hotel"),
            to(&["acron"], "acorn guest house"),
            to(&["ashley"], "ashley hotel"),
            to(&["arbury lodge guesthouse"], "arbury lodge guest house"),
            to(&["la"], "la margherit"),
            to(&["no"], ""),
        ],
    ),
    block(
        "hotel",
        &["internet"],
        &[
            to(&["does not"], "no"),
            to(&["y", "free", "free internet"], "yes"),
            to(&["4"], ""),
        ],
    ),
    block(
        "hotel",
        &["parking"],
        &[
            to(&["n"], "no"),
            to(&["free parking"], "free"),
            to(&["y"], "yes"),
        ],
    ),
    renamed(
        "hotel",
        &["pricerange", "price range"],
        "price range",
        &[
            to(&["moderately"], "moderate"),
            to(&["any"], DONT_CARE),
            to(&["inexpensive"], "cheap"),
            to(&["2", "4"], ""),
        ],
        TimeFormat::AsIs,
    ),
    block(
        "hotel",
        &["stars"],
        &[
            to(&["two"], "2"),
            to(&["three"], "3"),
            to(
                &["4-star", "4 stars", "4 star", "four star", "four stars"],
                "4",
            ),
        ],
    ),
    block(
        "hotel",
        &["type"],
        &[
            to(&["0 star rarting"], ""),
            to(&["guesthouse"], "guest house"),
            unless(&["hotel", "guest house", DONT_CARE], ""),
        ],
    ),
    // restaurant
    block(
        "restaurant",
        &["area"],
        &[
            to(
                &[
                    "center",
                    "scentre",
                    "center of town",
                    "city center",
                    "cb30aq",
                    "town center",
                    "centre of cambridge",
                    "city centre",
                ],
                "centre",
            ),
            to(&["west part of town"], "west"),
            to(&["n"], "north"),
            to(&["the south"], "south"),
            unless(&["centre", "south", DONT_CARE, "west", "east", "north"], ""),
        ],
    ),
    block("restaurant", &["book day"], BOOK_DAY),
    renamed(
        "restaurant",
        &["pricerange", "price range"],
        "price range",
        &[
            to(&["moderately", "mode", "mo"], "moderate"),
            to(&["not"], ""),
            to(&["inexpensive", "ch"], "cheap"),
        ],
        TimeFormat::AsIs,
    ),
    block("restaurant", &["food"], &[to(&["barbecue"], "barbeque")]),
    block(
        "restaurant",
        &["book time"],
        &[
            to(&["9:00"], "09:00"),
            to(&["9:45"], "09:45"),
            to(&["1330"], "13:30"),
            to(&["1430"], "14:30"),
            to(&["9:15"], "09:15"),
            to(&["9:30"], "09:30"),
            to(&["1830"], "18:30"),
            to(&["9"], "09:00"),
            to(&["2:00"], "14:00"),
            to(&["1:00"], "13:00"),
            to(&["3:00"], "15:00"),
        ],
    ),
    // taxi
    renamed(
        "taxi",
        &["arriveBy", "arrive by"],
        "arrive by",
        &[to(&["1530"], "15:30"), to(&["15 minutes"], "")],
        TimeFormat::AsIs,
    ),
    renamed(
        "taxi",
        &["leaveAt", "leave at"],
        "leave at",
        &[
            to(&["1:00"], "01:00"),
            to(&["21:4"], "21:04"),
            to(&["4:15"], "04:15"),
            to(&["5:45"], "05:45"),
            to(&["0700"], "07:00"),
            to(&["4:45"], "04:45"),
            to(&["8:30"], "08:30"),
            to(&["9:30"], "09:30"),
        ],
        TimeFormat::DotToColon,
    ),
    // train
    renamed(
        "train",
        &["arriveBy", "arrive by"],
        "arrive by",
        &[
            to(&["1"], "01:00"),
            to(&["does not care", "doesnt care", "doesn't care"], DONT_CARE),
            to(&["8:30"], "08:30"),
            to(&["not 15:45"], ""),
        ],
        TimeFormat::DotToColon,
    ),
    block(
        "train",
        &["day"],
        &[to(&["doesnt care", "doesn't care"], DONT_CARE)],
    ),
    renamed(
        "train",
        &["leaveAt", "leave at"],
        "leave at",
        &[
            to(&["2:30"], "02:30"),
            to(&["7:54"], "07:54"),
            to(&["after 5:45 pm"], "17:45"),
            to(
                &["early evening", "friday", "sunday", "tuesday", "afternoon"],
                "",
            ),
            to(&["12"], "12:00"),
            to(&["1030"], "10:30"),
            to(&["1700"], "17:00"),
            to(
                &["does not care", "doesnt care", "do nt care", "doesn't care"],
                DONT_CARE,
            ),
        ],
        TimeFormat::DotToColon,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(domain: &str, slot: &str) -> &'static SlotRules {
        RULE_TABLE
            .iter()
            .find(|r| r.domain == domain && r.slots.iter().any(|s| *s == slot))
            .unwrap()
    }

    #[test]
    fn matcher_semantics() {
        assert!(Matcher::OneOf(&["a", "b"]).matches("b"));
        assert!(!Matcher::OneOf(&["a", "b"]).matches("c"));
        assert!(Matcher::NoneOf(&["a"]).matches("c"));
        assert!(!Matcher::NoneOf(&["a"]).matches("a"));
    }

    #[test]
    fn first_matching_rule_wins() {
        let hotel_type = rules("hotel", "type");
        assert_eq!(hotel_type.apply("guesthouse"), "guest house");
        assert_eq!(hotel_type.apply("hotel"), "hotel");
        assert_eq!(hotel_type.apply("boutique"), "");
    }

    #[test]
    fn dont_care_replacements_use_canonical_spelling() {
        assert_eq!(rules("hotel", "pricerange").apply("any"), DONT_CARE);
        assert_eq!(rules("train", "arriveBy").apply("doesnt care"), DONT_CARE);
        assert_eq!(rules("hotel", "type").apply(DONT_CARE), DONT_CARE);
    }

    #[test]
    fn unmatched_value_passes_through() {
        assert_eq!(rules("restaurant", "food").apply("italian"), "italian");
    }

    #[test]
    fn dot_to_colon_runs_before_rules() {
        let leave = rules("taxi", "leaveAt");
        assert_eq!(leave.apply("17.15"), "17:15");
        assert_eq!(leave.apply("0700"), "07:00");
        assert_eq!(leave.apply("9.30"), "09:30");
    }

    #[test]
    fn no_duplicate_slot_spellings() {
        for (i, a) in RULE_TABLE.iter().enumerate() {
            for b in &RULE_TABLE[i + 1..] {
                if a.domain == b.domain {
                    assert!(
                        a.slots.iter().all(|s| !b.slots.contains(s)),
                        "{} has two blocks for one slot",
                        a.domain
                    );
                }
            }
        }
    }

    #[test]
    fn every_block_is_idempotent_on_its_outputs() {
        for block in RULE_TABLE {
            for rule in block.rules {
                let once = block.apply(rule.replacement);
                assert_eq!(
                    block.apply(&once),
                    once,
                    "{}-{:?} not idempotent for {:?}",
                    block.domain,
                    block.slots,
                    rule.replacement
                );
            }
        }
    }
}
