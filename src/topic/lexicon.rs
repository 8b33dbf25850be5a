//! Fixed keyword lexicons
//!
//! Every classification that is driven by word lists lives here: the phrase
//! patterns scanned by the extractor, the keyword-to-category and
//! keyword-to-priority tables, the synonym dictionary used by the gap
//! classifier, and the depth/structure indicators used for quality scoring.
//!
//! All entries are stored folded (lowercase, punctuation replaced by spaces) so
//! they can be compared directly against folded text.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Reverse;

use super::normalizer::fold;
use super::types::{TopicCategory, TopicPriority};

/// Phrase patterns scanned sentence by sentence during topic extraction
pub const PHRASE_LEXICONS: &[&str] = &[
    r"\b(machine learning|deep learning|intelligenza artificiale|neural network|algoritmi|automazione)\b",
    r"\b(applicazioni|vantaggi|sfide|definizione|caratteristiche)\b",
    r"\b(sanità|trasporti|finanza|industria|robotica)\b",
];

// Keyword prefixes; a keyword matches when a word of the topic starts with it
const CATEGORY_LEXICON: &[(TopicCategory, &[&str])] = &[
    (
        TopicCategory::Theoretical,
        &[
            "definizion", "principi", "teori", "concett", "fondament", "storia", "origin",
            "significat", "definition", "principle", "theory", "concept",
        ],
    ),
    (
        TopicCategory::Practical,
        &[
            "applicazion", "esempi", "caso d uso", "casi d uso", "utilizz", "pratic", "guida",
            "tutorial", "sanità", "trasporti", "industria", "robotica", "application",
            "example", "use case", "practice",
        ],
    ),
    (
        TopicCategory::Ethical,
        &[
            "etica", "etiche", "etico", "etici", "privacy", "bias", "responsabilit",
            "sicurezza", "trasparenz", "ethic", "fairness",
        ],
    ),
    (
        TopicCategory::Economic,
        &[
            "costo", "costi", "mercat", "economi", "investiment", "finanz", "lavoro",
            "occupazion", "business", "profitt", "prezz", "market", "cost",
        ],
    ),
    (
        TopicCategory::Technical,
        &[
            "algoritm", "machine learning", "deep learning", "intelligenza artificiale",
            "rete neural", "reti neural", "neural network", "modell", "dati", "architettur",
            "tecnolog", "software", "automazion", "algorithm", "model", "data",
        ],
    ),
];

const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "definizion", "principi", "fondament", "concett", "cos è", "significat", "definition",
    "principle", "fundamental", "basics",
];

const MEDIUM_PRIORITY_KEYWORDS: &[&str] = &[
    "applicazion", "esempi", "caso d uso", "casi d uso", "utilizz", "application", "example",
    "use case",
];

/// Canonical domain terms and the synonyms that count as partial coverage
pub const SYNONYMS: &[(&str, &[&str])] = &[
    (
        "intelligenza artificiale",
        &["ai", "machine intelligence", "artificial intelligence"],
    ),
    (
        "machine learning",
        &["apprendimento automatico", "ml", "apprendimento macchina"],
    ),
    (
        "deep learning",
        &["apprendimento profondo", "reti neurali profonde"],
    ),
    ("rete neurale", &["neural network", "reti neurali"]),
    (
        "algoritmo",
        &["algoritmi", "procedura", "metodo computazionale"],
    ),
    ("dati", &["data", "informazioni", "dataset"]),
    (
        "automazione",
        &["automatizzazione", "processo automatico"],
    ),
    (
        "efficienza",
        &["efficacia", "ottimizzazione", "performance"],
    ),
];

/// Terms signalling in-depth treatment (evidence, examples, analysis)
pub const DEPTH_INDICATORS: &[&str] = &[
    "ad esempio", "per esempio", "esempio", "caso di studio", "casi di studio", "ricerca",
    "studio", "studi", "statistiche", "percentuale", "analisi", "approfondimento",
    "for example", "research", "case study", "according to",
];

/// Terms signalling an organised, sectioned text
pub const STRUCTURE_INDICATORS: &[&str] = &[
    "introduzione", "conclusione", "in conclusione", "in sintesi", "riassumendo",
    "innanzitutto", "in primo luogo", "inoltre", "infine", "quindi", "pertanto", "tuttavia",
    "in summary", "first", "finally", "however", "therefore",
];

lazy_static! {
    pub static ref PHRASE_PATTERNS: Vec<Regex> = PHRASE_LEXICONS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("phrase lexicon pattern is valid"))
        .collect();
}

/// Word-prefix match: some word of `folded` starts with `keyword`
fn has_prefix_keyword(folded: &str, keyword: &str) -> bool {
    format!(" {}", folded).contains(&format!(" {}", keyword))
}

/// Whole-word (or whole-phrase) match inside folded text
pub fn contains_phrase(folded: &str, phrase: &str) -> bool {
    format!(" {} ", folded).contains(&format!(" {} ", phrase))
}

/// Category of a topic; first lexicon with a matching keyword wins
pub fn categorize(topic: &str) -> TopicCategory {
    let folded = fold(topic);
    CATEGORY_LEXICON
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| has_prefix_keyword(&folded, k)))
        .map(|(category, _)| *category)
        .unwrap_or(TopicCategory::General)
}

/// Priority of a topic: definitions and principles first, then applications
pub fn prioritize(topic: &str) -> TopicPriority {
    let folded = fold(topic);
    if HIGH_PRIORITY_KEYWORDS
        .iter()
        .any(|k| has_prefix_keyword(&folded, k))
    {
        TopicPriority::High
    } else if MEDIUM_PRIORITY_KEYWORDS
        .iter()
        .any(|k| has_prefix_keyword(&folded, k))
    {
        TopicPriority::Medium
    } else {
        TopicPriority::Low
    }
}

/// Find a synonym of one of the topic's canonical terms inside the folded
/// candidate text. Returns the synonym that matched.
pub fn find_synonym(topic: &str, folded_candidate: &str) -> Option<&'static str> {
    let folded_topic = fold(topic);
    SYNONYMS
        .iter()
        .filter(|(canonical, _)| contains_phrase(&folded_topic, canonical))
        .flat_map(|(_, synonyms)| synonyms.iter())
        .find(|synonym| contains_phrase(folded_candidate, synonym))
        .copied()
}

/// Indicators from `list` present in the folded text, in lexicon order.
///
/// Longer phrases claim their span first, so "in conclusione" is one
/// indicator and does not also count as "conclusione". A shorter term still
/// counts when it occurs on its own elsewhere in the text.
pub fn indicators_present(folded_text: &str, list: &[&'static str]) -> Vec<&'static str> {
    let padded = format!(" {} ", folded_text);
    let mut longest_first: Vec<usize> = (0..list.len()).collect();
    longest_first.sort_by_key(|&i| Reverse(list[i].len()));

    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut present = vec![false; list.len()];
    for i in longest_first {
        let needle = format!(" {} ", list[i]);
        let spans: Vec<(usize, usize)> = padded
            .match_indices(&needle)
            .map(|(start, _)| (start + 1, start + needle.len() - 1))
            .filter(|&(start, end)| !claimed.iter().any(|&(s, e)| start < e && s < end))
            .collect();
        if !spans.is_empty() {
            present[i] = true;
            claimed.extend(spans);
        }
    }

    list.iter()
        .zip(present)
        .filter(|(_, present)| *present)
        .map(|(indicator, _)| *indicator)
        .collect()
}

/// Fixed editorial advice for a category with several missing topics
pub fn category_advice(category: TopicCategory) -> &'static str {
    match category {
        TopicCategory::Theoretical => {
            "Rafforza le basi teoriche: aggiungi definizioni chiare e i principi fondamentali."
        }
        TopicCategory::Practical => {
            "Aggiungi esempi concreti, casi d'uso e applicazioni reali."
        }
        TopicCategory::Technical => {
            "Approfondisci gli aspetti tecnici spiegando funzionamento, modelli e strumenti."
        }
        TopicCategory::Ethical => {
            "Includi una sezione sulle implicazioni etiche, sulla privacy e sulla responsabilità."
        }
        TopicCategory::Economic => {
            "Analizza l'impatto economico: costi, benefici e opportunità di mercato."
        }
        TopicCategory::General => {
            "Amplia la trattazione degli argomenti generali citati dall'AI Overview."
        }
    }
}
