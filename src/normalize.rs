// src/normalize.rs
//! Text normalization pipeline: clean → tokenize → stopword removal →
//! lemmatization.
//!
//! The cleaning steps run in a fixed order with no locale branching, so the
//! same input always yields the same cleaned string. `clean` is public on its
//! own because some callers want the cleaned string without tokenization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z ?!]+").unwrap());
static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Contraction expansions, applied in this exact order after lowercasing.
/// `what's` must run before the generic `'s` rule.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("what's", "what is "),
    ("(ap)", ""),
    ("'s", " is "),
    ("'ve", " have "),
    ("can't", "cannot "),
    ("n't", " not "),
    ("i'm", "i am "),
    ("'re", " are "),
    ("'d", " would "),
    ("'ll", " will "),
];

/// Normalize a raw string for analysis: lowercase, expand contractions,
/// strip punctuation and non-ASCII, collapse whitespace.
///
/// Empty input cleans to an empty string; this never fails.
pub fn clean(text: &str) -> String {
    let mut out = text.to_lowercase();
    for (pat, rep) in CONTRACTIONS {
        out = out.replace(pat, rep);
    }
    out = RE_NON_WORD.replace_all(&out, " ").into_owned();
    out = RE_WS.replace_all(&out, " ").into_owned();
    out = out.replace(['\\', '\'', '"'], "");
    out = RE_NON_ALPHA.replace_all(&out, "").into_owned();
    out.retain(|c| (c as u32) < 128);
    out.trim().to_string()
}

/// Split a cleaned string into `\w+` tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    RE_TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Drop tokens found in the stopword set.
pub fn remove_stopwords(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|t| !STOPWORDS.contains(t.as_str()))
        .collect()
}

/// Full pipeline: clean, tokenize, remove stopwords, lemmatize each token.
pub fn normalize(text: &str) -> Vec<String> {
    remove_stopwords(tokenize(&clean(text)))
        .into_iter()
        .map(|t| lemma(&t))
        .collect()
}

/// `normalize` joined with single spaces, for callers persisting one field.
pub fn normalize_joined(text: &str) -> String {
    normalize(text).join(" ")
}

/// Reduce a token to its dictionary base form (noun/verb lemmatization).
/// Tokens with no known lemma pass through unchanged.
pub fn lemma(word: &str) -> String {
    if word.len() < 3 {
        return word.to_string();
    }
    if let Some(base) = LEMMA_EXCEPTIONS.get(word) {
        return (*base).to_string();
    }
    if let Some(base) = noun_lemma(word) {
        return base;
    }
    if let Some(base) = verb_lemma(word) {
        return base;
    }
    word.to_string()
}

/// Plural-reduction rules, most specific suffix first.
fn noun_lemma(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return Some(format!("{stem}y"));
        }
    }
    for (suf, rep) in [("ches", "ch"), ("shes", "sh"), ("sses", "ss")] {
        if let Some(stem) = word.strip_suffix(suf) {
            return Some(format!("{stem}{rep}"));
        }
    }
    for suf in ["xes", "zes"] {
        if let Some(stem) = word.strip_suffix(suf) {
            return Some(format!("{stem}{}", &suf[..1]));
        }
    }
    // Invariant endings: glass, virus, crisis.
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    if let Some(stem) = word.strip_suffix('s') {
        if stem.len() >= 3 {
            return Some(stem.to_string());
        }
    }
    None
}

/// Conservative -ing / -ed reduction: undo consonant doubling, restore a
/// trailing `e` after a CVC stem. Anything ambiguous passes through.
fn verb_lemma(word: &str) -> Option<String> {
    let stem = word
        .strip_suffix("ing")
        .or_else(|| word.strip_suffix("ed"))?;
    if stem.len() < 2 || !stem.bytes().any(is_vowel) {
        return None;
    }
    let b = stem.as_bytes();
    let last = b[b.len() - 1];
    // Doubled final consonant: running -> run, stopped -> stop.
    if stem.len() >= 4 && last == b[b.len() - 2] && !is_vowel(last) && last != b'l' && last != b's'
    {
        return Some(stem[..stem.len() - 1].to_string());
    }
    // CVC stem lost its silent e: making -> make, moved -> move.
    if stem.len() >= 3 {
        let (a, m) = (b[b.len() - 3], b[b.len() - 2]);
        if !is_vowel(a) && is_vowel(m) && !is_vowel(last) && !matches!(last, b'w' | b'x' | b'y') {
            return Some(format!("{stem}e"));
        }
        return Some(stem.to_string());
    }
    None
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Irregular forms the suffix rules cannot reach.
static LEMMA_EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("halves", "half"),
        ("selves", "self"),
        ("indices", "index"),
        ("crises", "crisis"),
        ("analyses", "analysis"),
        ("data", "datum"),
        ("media", "medium"),
        ("said", "say"),
        ("went", "go"),
        ("ran", "run"),
        ("took", "take"),
        ("got", "get"),
        ("made", "make"),
        ("saw", "see"),
        ("came", "come"),
        ("knew", "know"),
        ("gave", "give"),
        ("found", "find"),
        ("told", "tell"),
        ("became", "become"),
        ("left", "leave"),
        ("felt", "feel"),
        ("brought", "bring"),
        ("began", "begin"),
        ("kept", "keep"),
        ("held", "hold"),
        ("wrote", "write"),
        ("stood", "stand"),
        ("heard", "hear"),
        ("meant", "mean"),
        ("met", "meet"),
        ("paid", "pay"),
        ("sat", "sit"),
        ("spoke", "speak"),
        ("led", "lead"),
        ("grew", "grow"),
        ("lost", "lose"),
        ("fell", "fall"),
        ("sent", "send"),
        ("built", "build"),
        ("bought", "buy"),
        ("sought", "seek"),
        ("thought", "think"),
        ("fought", "fight"),
        ("caught", "catch"),
        ("taught", "teach"),
        ("sold", "sell"),
        ("rose", "rise"),
        ("broke", "break"),
        ("spent", "spend"),
        ("struck", "strike"),
    ])
});

/// Fixed English stopword set extended with a small domain exclusion list.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set: HashSet<&'static str> = ENGLISH_STOPWORDS.iter().copied().collect();
    set.extend(["char", "u", "hindustan", "doj", "washington"]);
    set
});

const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn",
    "mustn", "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];
