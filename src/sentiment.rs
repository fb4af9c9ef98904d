// src/sentiment.rs
//! Lexicon-and-rule polarity scorer in the VADER style.
//!
//! Token valences come from an embedded lexicon; rules adjust for negation,
//! booster/dampener words, ALL-CAPS emphasis, a "but" pivot, and trailing
//! `!`/`?` emphasis. The compound score is the rule-adjusted valence sum put
//! through `x / sqrt(x^2 + 15)`, so it stays in [-1, 1].
//!
//! The analyzer is built explicitly once at startup; a broken lexicon asset
//! is a startup error, not a runtime surprise.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
const NORM_ALPHA: f64 = 15.0;

/// Labels derive from compound with strict inequalities; exactly ±0.2 is
/// neutral.
const LABEL_THRESHOLD: f64 = 0.2;

/// Four-axis polarity: neg/neu/pos are proportions in [0,1] summing to ~1,
/// compound is the normalized overall valence in [-1,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityScore {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub text: String,
    pub scores: PolarityScore,
    pub label: i32,
    pub word_count: usize,
}

/// Map a compound score onto the discrete label {-1, 0, 1}.
pub fn label_for(compound: f64) -> i32 {
    if compound > LABEL_THRESHOLD {
        1
    } else if compound < -LABEL_THRESHOLD {
        -1
    } else {
        0
    }
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: HashMap<String, f64>,
}

impl SentimentAnalyzer {
    /// Build the analyzer from the lexicon shipped with the binary.
    pub fn from_embedded_lexicon() -> Result<Self> {
        let raw = include_str!("../vader_lexicon.json");
        let lexicon: HashMap<String, f64> =
            serde_json::from_str(raw).context("parsing embedded sentiment lexicon")?;
        Ok(Self { lexicon })
    }

    /// Score a single text. Pure function of the input; never fails.
    pub fn score(&self, text: &str) -> SentimentResult {
        let scores = self.polarity_scores(text);
        SentimentResult {
            text: text.to_string(),
            scores,
            label: label_for(scores.compound),
            word_count: text.split_whitespace().count(),
        }
    }

    /// Batch scoring, order-preserving: output[i] corresponds to input[i].
    pub fn score_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SentimentResult> {
        texts.iter().map(|t| self.score(t.as_ref())).collect()
    }

    pub fn polarity_scores(&self, text: &str) -> PolarityScore {
        let tokens = words(text);
        if tokens.is_empty() {
            return PolarityScore {
                neg: 0.0,
                neu: 0.0,
                pos: 0.0,
                compound: 0.0,
            };
        }

        let cap_diff = allcap_differential(&tokens);
        let mut sentiments: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, tok) in tokens.iter().enumerate() {
            let lower = tok.to_lowercase();
            if booster_value(&lower).is_some() {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.token_valence(&tokens, i, &lower, cap_diff));
        }

        but_pivot(&tokens, &mut sentiments);
        score_valence(&sentiments, punctuation_emphasis(text))
    }

    fn token_valence(&self, tokens: &[String], i: usize, lower: &str, cap_diff: bool) -> f64 {
        let Some(&base) = self.lexicon.get(lower) else {
            return 0.0;
        };
        let mut valence = base;
        if cap_diff && is_all_caps(&tokens[i]) {
            valence += C_INCR * valence.signum();
        }

        // Look back up to three tokens for boosters and negators.
        for dist in 1..=3usize {
            if i < dist {
                break;
            }
            let prior = &tokens[i - dist];
            let prior_lower = prior.to_lowercase();
            if self.lexicon.contains_key(&prior_lower) {
                continue;
            }
            let decay = match dist {
                1 => 1.0,
                2 => 0.95,
                _ => 0.9,
            };
            if let Some(b) = booster_value(&prior_lower) {
                let mut scalar = b * valence.signum();
                if cap_diff && is_all_caps(prior) {
                    scalar += C_INCR * valence.signum();
                }
                valence += scalar * decay;
            }
            if is_negator(&prior_lower) {
                valence *= N_SCALAR;
            }
        }
        valence
    }
}

/// Whitespace-split tokens with surrounding punctuation trimmed,
/// original casing preserved.
fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

fn is_all_caps(tok: &str) -> bool {
    let mut has_alpha = false;
    for c in tok.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    has_alpha
}

/// Caps emphasis only applies when the text mixes cased and ALL-CAPS words.
fn allcap_differential(tokens: &[String]) -> bool {
    let caps = tokens.iter().filter(|t| is_all_caps(t)).count();
    caps > 0 && caps < tokens.len()
}

fn is_negator(lower: &str) -> bool {
    lower.contains("n't")
        || matches!(
            lower,
            "aint" | "arent" | "cannot" | "cant" | "couldnt" | "didnt" | "doesnt" | "dont"
                | "hadnt" | "hasnt" | "havent" | "isnt" | "mightnt" | "mustnt" | "neither"
                | "never" | "none" | "nope" | "nor" | "not" | "nothing" | "nowhere"
                | "shouldnt" | "wasnt" | "werent" | "without" | "wont" | "wouldnt" | "rarely"
                | "seldom" | "despite"
        )
}

fn booster_value(lower: &str) -> Option<f64> {
    let incr = matches!(
        lower,
        "absolutely" | "amazingly" | "awfully" | "completely" | "considerably" | "decidedly"
            | "deeply" | "enormously" | "entirely" | "especially" | "exceptionally"
            | "extremely" | "fabulously" | "fully" | "greatly" | "highly" | "hugely"
            | "incredibly" | "intensely" | "majorly" | "more" | "most" | "particularly"
            | "purely" | "quite" | "really" | "remarkably" | "so" | "substantially"
            | "thoroughly" | "totally" | "tremendously" | "unbelievably" | "unusually"
            | "utterly" | "very"
    );
    if incr {
        return Some(B_INCR);
    }
    let decr = matches!(
        lower,
        "almost" | "barely" | "hardly" | "kinda" | "less" | "little" | "marginally"
            | "occasionally" | "partly" | "scarcely" | "slightly" | "somewhat" | "sorta"
    );
    if decr {
        return Some(B_DECR);
    }
    None
}

/// Sentiment before a "but" is discounted, after it amplified.
fn but_pivot(tokens: &[String], sentiments: &mut [f64]) {
    let Some(bi) = tokens.iter().position(|t| t.eq_ignore_ascii_case("but")) else {
        return;
    };
    for (i, s) in sentiments.iter_mut().enumerate() {
        if i < bi {
            *s *= 0.5;
        } else if i > bi {
            *s *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let ep = (text.matches('!').count().min(4)) as f64 * 0.292;
    let qm = text.matches('?').count();
    let qm_amp = match qm {
        0 | 1 => 0.0,
        2..=3 => qm as f64 * 0.18,
        _ => 0.96,
    };
    ep + qm_amp
}

fn score_valence(sentiments: &[f64], punct_emph: f64) -> PolarityScore {
    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += punct_emph;
    } else if sum < 0.0 {
        sum -= punct_emph;
    }
    let compound = (sum / (sum * sum + NORM_ALPHA).sqrt()).clamp(-1.0, 1.0);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += punct_emph;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= punct_emph;
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    let (neg, neu, pos) = if total > 0.0 {
        (
            (neg_sum / total).abs(),
            (neu_count / total).abs(),
            (pos_sum / total).abs(),
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    PolarityScore {
        neg: round3(neg),
        neu: round3(neu),
        pos: round3(pos),
        compound: round4(compound),
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::from_embedded_lexicon().expect("embedded lexicon parses")
    }

    #[test]
    fn empty_text_is_neutral_and_never_errors() {
        let r = analyzer().score("");
        assert_eq!(r.scores.compound, 0.0);
        assert_eq!(r.label, 0);
        assert_eq!(r.word_count, 0);
    }

    #[test]
    fn batch_preserves_order_and_covers_both_polarities() {
        let results = analyzer().score_batch(&["I love this", "This is terrible"]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "I love this");
        assert_eq!(results[0].label, 1);
        assert_eq!(results[1].label, -1);
    }

    #[test]
    fn label_thresholds_are_strict() {
        assert_eq!(label_for(0.2), 0);
        assert_eq!(label_for(-0.2), 0);
        assert_eq!(label_for(0.200001), 1);
        assert_eq!(label_for(-0.200001), -1);
        assert_eq!(label_for(0.0), 0);
        assert_eq!(label_for(1.0), 1);
        assert_eq!(label_for(-1.0), -1);
    }

    #[test]
    fn label_always_derives_from_compound() {
        let a = analyzer();
        for text in [
            "markets rally on strong growth",
            "the crisis deepens amid violence",
            "the quarterly report was published",
            "good news but a terrible outlook",
            "NOT good at all",
        ] {
            let r = a.score(text);
            assert_eq!(r.label, label_for(r.scores.compound), "text: {text}");
        }
    }

    #[test]
    fn proportions_sum_to_one_for_nonempty_text() {
        let s = analyzer().polarity_scores("great results, terrible guidance, flat revenue");
        let total = s.neg + s.neu + s.pos;
        assert!((total - 1.0).abs() < 0.01, "total was {total}");
    }

    #[test]
    fn word_count_counts_raw_whitespace_words() {
        let r = analyzer().score("one two  three");
        assert_eq!(r.word_count, 3);
    }

    #[test]
    fn negation_flips_polarity() {
        let a = analyzer();
        let plain = a.polarity_scores("this is good");
        let negated = a.polarity_scores("this is not good");
        assert!(plain.compound > 0.2);
        assert!(negated.compound < 0.0);
    }

    #[test]
    fn boosters_intensify() {
        let a = analyzer();
        let plain = a.polarity_scores("the results were good");
        let boosted = a.polarity_scores("the results were very good");
        assert!(boosted.compound > plain.compound);
    }

    #[test]
    fn exclamation_amplifies() {
        let a = analyzer();
        let plain = a.polarity_scores("what a great win");
        let loud = a.polarity_scores("what a great win!!!");
        assert!(loud.compound > plain.compound);
    }

    #[test]
    fn allcaps_emphasis_applies_on_mixed_case() {
        let a = analyzer();
        let plain = a.polarity_scores("this deal is great news");
        let caps = a.polarity_scores("this deal is GREAT news");
        assert!(caps.compound > plain.compound);
    }

    #[test]
    fn scoring_is_pure_across_calls() {
        let a = analyzer();
        let first = a.polarity_scores("terrible losses everywhere");
        let _ = a.polarity_scores("wonderful profitable quarter");
        let again = a.polarity_scores("terrible losses everywhere");
        assert_eq!(first, again);
    }
}
