//! Ordered keyword rule tables mapping free-form vendor text onto the closed
//! enumerations in [`teadb_core::taxonomy`].
//!
//! Rules are case-insensitive regexes checked in order; the first match wins.
//! Order matters: specific phrases (`"white tea"`, `"oolong"`) sit above
//! bare words (`"green"`, `"black"`) so blends classify by their base leaf.

use std::fmt::Debug;
use std::sync::LazyLock;

use regex::Regex;
use teadb_core::{ClayType, TeaType, TeawareCategory, TeawareMaterial};

/// An ordered list of `pattern -> value` rules.
pub struct Rules<T> {
    rules: Vec<(Regex, T)>,
}

impl<T: Copy + PartialEq> Rules<T> {
    /// Compiles `(pattern, value)` pairs; every pattern is made
    /// case-insensitive.
    ///
    /// # Panics
    ///
    /// Panics on an invalid pattern. Tables are static, so this surfaces on
    /// first use in any test that touches them.
    #[must_use]
    pub fn new(patterns: &[(&str, T)]) -> Self {
        let rules = patterns
            .iter()
            .map(|(pattern, value)| {
                let re = Regex::new(&format!("(?i){pattern}")).expect("valid rule regex");
                (re, *value)
            })
            .collect();
        Self { rules }
    }

    /// Value of the first rule matching `text`.
    #[must_use]
    pub fn first_match(&self, text: &str) -> Option<T> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, value)| *value)
    }

    /// Values of every matching rule, deduplicated in rule order.
    #[must_use]
    pub fn all_matches(&self, text: &str) -> Vec<T> {
        let mut out: Vec<T> = Vec::new();
        for (re, value) in &self.rules {
            if re.is_match(text) && !out.contains(value) {
                out.push(*value);
            }
        }
        out
    }
}

/// [`Rules`] plus the value used when nothing matches.
pub struct RuleTable<T> {
    name: &'static str,
    rules: Rules<T>,
    default: T,
}

impl<T: Copy + PartialEq + Debug> RuleTable<T> {
    #[must_use]
    pub fn new(name: &'static str, patterns: &[(&str, T)], default: T) -> Self {
        Self {
            name,
            rules: Rules::new(patterns),
            default,
        }
    }

    /// First matching rule's value, else the table default. Fallbacks are
    /// logged at debug with the input so misclassification is visible.
    #[must_use]
    pub fn classify(&self, text: &str) -> T {
        if let Some(value) = self.rules.first_match(text) {
            return value;
        }
        tracing::debug!(
            table = self.name,
            input = text,
            default = ?self.default,
            "no rule matched; using default"
        );
        self.default
    }
}

static TEA_TYPE_RULES: LazyLock<RuleTable<TeaType>> = LazyLock::new(|| {
    RuleTable::new(
        "tea_type",
        &[
            (r"\bpu-?erh\b|\bpu'?er\b|\bhei\s*cha\b|\bsheng\b", TeaType::Puerh),
            (r"\bmatcha\b", TeaType::Green),
            (r"\brooibos\b|\bhoneybush\b|\bred\s+bush\b", TeaType::Rooibos),
            (r"\byerba\b|\bmate\b|\bguayusa\b", TeaType::Mate),
            (
                r"\bwhite\s+tea\b|\bsilver\s+needle\b|\bbai\s*mu\s*dan\b|\bwhite\s+peony\b|\bshou\s+mei\b",
                TeaType::White,
            ),
            (
                r"\boolong\b|\btie\s*guan\s*yin\b|\bda\s*hong\s*pao\b|\bdan\s*cong\b",
                TeaType::Oolong,
            ),
            (
                r"\bgreen\s+tea\b|\bsencha\b|\bgyokuro\b|\bgenmaicha\b|\bhojicha\b|\bgunpowder\b|\bdragon\s*well\b|\blong\s*jing\b",
                TeaType::Green,
            ),
            (
                r"\bblack\s+tea\b|\bchai\b|\bearl\s+grey\b|\bbreakfast\b|\bdarjeeling\b|\bassam\b|\bceylon\b|\blapsang\b|\bkeemun\b",
                TeaType::Black,
            ),
            (
                r"\bherbal\b|\btisane\b|\bchamomile\b|\bhibiscus\b|\bpeppermint\b|\bmint\b|\bcaffeine[- ]free\b",
                TeaType::Herbal,
            ),
            (r"\bjasmine\b|\bgreen\b", TeaType::Green),
            (r"\bblack\b", TeaType::Black),
        ],
        TeaType::Herbal,
    )
});

static CATEGORY_RULES: LazyLock<RuleTable<TeawareCategory>> = LazyLock::new(|| {
    RuleTable::new(
        "teaware_category",
        &[
            (r"\bgaiwans?\b", TeawareCategory::Gaiwan),
            (r"\btea\s*pets?\b|\bcha\s*chong\b", TeawareCategory::TeaPet),
            (
                r"\bpitchers?\b|\bcha\s*hai\b|\bfairness\b|\bgong\s*dao\s*bei\b",
                TeawareCategory::Pitcher,
            ),
            (r"\btea\s*pots?\b|\bkyusu\b|壶", TeawareCategory::Teapot),
            (r"\btea\s*cups?\b|\bcups?\b|\bchawan\b|杯", TeawareCategory::Cup),
            (r"\btrays?\b|\btea\s*table\b|\btea\s*boat\b", TeawareCategory::TeaTray),
            (r"\bcanisters?\b|\bcaddy\b|\bstorage\b|\bjars?\b", TeawareCategory::Canister),
            (r"\btravel\b|\bportable\b|\btea\s*set\b", TeawareCategory::TravelSet),
            (r"\bkettles?\b|\btetsubin\b", TeawareCategory::Kettle),
            (
                r"\bstrainers?\b|\bfilters?\b|\btools?\b|\bpicks?\b|\btowels?\b|\bscoops?\b|\btongs\b|\bwhisk\b|\binfusers?\b",
                TeawareCategory::TeaTools,
            ),
        ],
        TeawareCategory::Other,
    )
});

static MATERIAL_RULES: LazyLock<RuleTable<TeawareMaterial>> = LazyLock::new(|| {
    RuleTable::new(
        "teaware_material",
        &[
            (
                r"\byixing\b|\bzi\s*sha\b|\bpurple\s+sand\b|\bzhu\s*ni\b|\bhong\s*ni\b|\bduan\s*ni\b|\bzi\s*ni\b",
                TeawareMaterial::YixingClay,
            ),
            (r"\bjian\s*shui\b", TeawareMaterial::JianshuiClay),
            (r"\bporcelain\b|\bde\s*hua\b|\bjingdezhen\b", TeawareMaterial::Porcelain),
            (r"\bglass\b|\bborosilicate\b", TeawareMaterial::Glass),
            (r"\bcast\s*iron\b|\btetsubin\b", TeawareMaterial::CastIron),
            (r"\bsilver\b|\bsterling\b", TeawareMaterial::Silver),
            (r"\btitanium\b|\bbamboo\b|\bwood(?:en)?\b", TeawareMaterial::Other),
            (r"\bjian\s*zhan\b|\bstoneware\b", TeawareMaterial::Stoneware),
            (r"\bceramic\b|\bceladon\b|\bhuaning\b", TeawareMaterial::Ceramic),
        ],
        TeawareMaterial::Ceramic,
    )
});

static CLAY_RULES: LazyLock<RuleTable<Option<ClayType>>> = LazyLock::new(|| {
    RuleTable::new(
        "clay_type",
        &[
            (r"\bzi\s*sha\b|\bpurple\s+sand\b|\bwenge\s*ni\b", Some(ClayType::ZiSha)),
            (r"\bhong\s*ni\b|\bzhu\s*ni\b|\bred\s+clay\b", Some(ClayType::HongNi)),
            (r"\bduan\s*ni\b|\bduan\s+clay\b", Some(ClayType::DuanNi)),
            (r"\bzi\s*ni\b|\bpurple\s+clay\b", Some(ClayType::ZiNi)),
            (r"\bqing\s*shui\b|\bclear\s+water\b", Some(ClayType::QingShuiNi)),
            (r"\bdi\s*cao\s*qing\b", Some(ClayType::DiCaoQing)),
            (r"\bjian\s*shui\b", Some(ClayType::Jianshui)),
            (r"\bhuaning\b", Some(ClayType::Huaning)),
        ],
        None,
    )
});

static RECOMMENDED_TEA_RULES: LazyLock<Rules<TeaType>> = LazyLock::new(|| {
    Rules::new(&[
        (r"\bpu-?erh\b|\bpu'?er\b|\bhei\s*cha\b", TeaType::Puerh),
        (r"\boolong\b|\bdan\s*cong\b|\btie\s*guan\s*yin\b", TeaType::Oolong),
        (r"\bblack\s+teas?\b|\bhong\s*cha\b", TeaType::Black),
        (r"\bgreen\s+teas?\b", TeaType::Green),
        (r"\bwhite\s+teas?\b", TeaType::White),
    ])
});

/// Tea type from tags, title, and product type. Defaults to herbal.
#[must_use]
pub fn classify_tea_type(text: &str) -> TeaType {
    TEA_TYPE_RULES.classify(text)
}

/// Teaware category from title and product type. Defaults to other.
#[must_use]
pub fn classify_category(text: &str) -> TeawareCategory {
    CATEGORY_RULES.classify(text)
}

/// Teaware material. Defaults to ceramic.
#[must_use]
pub fn classify_material(text: &str) -> TeawareMaterial {
    MATERIAL_RULES.classify(text)
}

/// Clay type, if the text names one.
#[must_use]
pub fn classify_clay_type(text: &str) -> Option<ClayType> {
    CLAY_RULES.classify(text)
}

/// Tea types a listing explicitly mentions brewing.
#[must_use]
pub fn mentioned_tea_types(text: &str) -> Vec<TeaType> {
    RECOMMENDED_TEA_RULES.all_matches(text)
}

/// Tea types a vessel suits when its listing names none: porous clays favor
/// dark teas, glass and porcelain favor delicate ones.
#[must_use]
pub fn recommended_for_vessel(
    material: TeawareMaterial,
    clay: Option<ClayType>,
) -> Vec<TeaType> {
    match (clay, material) {
        (Some(ClayType::DuanNi), _) => vec![TeaType::Green, TeaType::White, TeaType::Oolong],
        (Some(_), _) | (None, TeawareMaterial::YixingClay | TeawareMaterial::JianshuiClay) => {
            vec![TeaType::Puerh, TeaType::Oolong, TeaType::Black]
        }
        (None, TeawareMaterial::Porcelain | TeawareMaterial::Glass) => {
            vec![TeaType::Green, TeaType::White, TeaType::Oolong]
        }
        (None, TeawareMaterial::CastIron) => vec![TeaType::Black, TeaType::Puerh],
        (None, _) => Vec::new(),
    }
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;
