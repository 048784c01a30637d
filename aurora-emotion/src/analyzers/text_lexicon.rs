//! Lexicon Text Analyzer
//!
//! Keyword-based emotion estimate for English and Chinese text.
//!
//! - ASCII cue words are matched against word tokens; a negation word up to
//!   three tokens before the cue flips or drops it.
//! - CJK cue words are matched as substrings; a directly preceding 不/没 negates.
//! - An intensifier directly before a cue adds half a hit.
//!
//! Intensity grows with hit count, intensifiers and exclamation marks.
//! Confidence grows with hit count and with how dominant the winning category is.

use crate::types::{
    AnalysisContext, EmotionCategory, Modality, ModalityAnalyzer, ModalityError, ModalityEstimate,
};
use async_trait::async_trait;
use std::collections::HashMap;

const LEXICON: &[(EmotionCategory, &[&str])] = &[
    (
        EmotionCategory::Joy,
        &["happy", "glad", "joy", "joyful", "delighted", "great", "wonderful", "awesome", "开心", "快乐", "高兴"],
    ),
    (
        EmotionCategory::Sadness,
        &["sad", "unhappy", "depressed", "down", "miserable", "cry", "crying", "heartbroken", "难过", "伤心", "悲伤"],
    ),
    (
        EmotionCategory::Anger,
        &["angry", "furious", "mad", "hate", "rage", "annoyed", "愤怒", "生气", "气死"],
    ),
    (
        EmotionCategory::Fear,
        &["afraid", "scared", "terrified", "fear", "frightened", "害怕", "恐惧"],
    ),
    (
        EmotionCategory::Surprise,
        &["surprised", "shocked", "unexpected", "wow", "amazed", "惊讶", "没想到"],
    ),
    (
        EmotionCategory::Disgust,
        &["disgusted", "gross", "disgusting", "sick", "恶心", "厌恶"],
    ),
    (
        EmotionCategory::Anxiety,
        &["anxious", "worried", "nervous", "stressed", "uneasy", "panic", "焦虑", "担心", "紧张"],
    ),
    (
        EmotionCategory::Calm,
        &["calm", "peaceful", "relaxed", "serene", "quiet", "平静", "放松", "安心"],
    ),
    (
        EmotionCategory::Excitement,
        &["excited", "thrilled", "cant", "pumped", "eager", "兴奋", "激动"],
    ),
    (
        EmotionCategory::Frustration,
        &["frustrated", "stuck", "fed", "irritated", "annoying", "沮丧", "烦", "郁闷"],
    ),
    (
        EmotionCategory::Contentment,
        &["content", "satisfied", "fulfilled", "grateful", "thankful", "满足", "满意", "感恩"],
    ),
    (
        EmotionCategory::Loneliness,
        &["lonely", "alone", "isolated", "abandoned", "孤独", "寂寞"],
    ),
    (
        EmotionCategory::Love,
        &["love", "adore", "cherish", "darling", "爱", "喜欢"],
    ),
    (
        EmotionCategory::Hope,
        &["hope", "hopeful", "optimistic", "looking", "wish", "希望", "期待"],
    ),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "dont", "don't", "isn't", "isnt", "wasn't", "wasnt", "without"];
const INTENSIFIERS: &[&str] = &["very", "so", "really", "extremely", "totally", "incredibly", "非常", "很", "太", "特别"];
const CJK_NEGATIONS: &[char] = &['不', '没'];

/// Window (in tokens) scanned backwards for a negation word
const NEGATION_WINDOW: usize = 3;

/// Category a negated cue counts toward, if any
fn negated_counterpart(emotion: EmotionCategory) -> Option<EmotionCategory> {
    match emotion {
        EmotionCategory::Joy | EmotionCategory::Hope => Some(EmotionCategory::Sadness),
        EmotionCategory::Contentment => Some(EmotionCategory::Frustration),
        EmotionCategory::Calm => Some(EmotionCategory::Anxiety),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct CueTally {
    hits: HashMap<EmotionCategory, f32>,
    words: HashMap<EmotionCategory, Vec<String>>,
    intensifiers: usize,
    negations: usize,
}

impl CueTally {
    fn record(&mut self, emotion: EmotionCategory, word: &str, negated: bool, intensified: bool) {
        let target = if negated {
            self.negations += 1;
            match negated_counterpart(emotion) {
                Some(flipped) => flipped,
                None => return,
            }
        } else {
            emotion
        };

        let weight = if intensified {
            self.intensifiers += 1;
            1.5
        } else {
            1.0
        };

        *self.hits.entry(target).or_insert(0.0) += weight;
        self.words.entry(target).or_default().push(word.to_string());
    }
}

/// Keyword lexicon text analyzer
#[derive(Debug, Default)]
pub struct LexiconTextAnalyzer;

impl LexiconTextAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn tally(text: &str) -> CueTally {
        let lowered = text.to_lowercase();
        let tokens: Vec<String> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty() && t.is_ascii())
            .map(|t| t.to_string())
            .collect();

        let mut tally = CueTally::default();

        for (emotion, words) in LEXICON {
            for &word in words.iter() {
                if word.is_ascii() {
                    for (i, token) in tokens.iter().enumerate() {
                        if token != word {
                            continue;
                        }
                        let window_start = i.saturating_sub(NEGATION_WINDOW);
                        let negated = tokens[window_start..i]
                            .iter()
                            .any(|t| NEGATIONS.contains(&t.as_str()));
                        let intensified = i > 0 && INTENSIFIERS.contains(&tokens[i - 1].as_str());
                        tally.record(*emotion, word, negated, intensified);
                    }
                } else {
                    for (idx, _) in lowered.match_indices(word) {
                        let before = &lowered[..idx];
                        let negated = before
                            .chars()
                            .last()
                            .map(|c| CJK_NEGATIONS.contains(&c))
                            .unwrap_or(false);
                        let intensified = INTENSIFIERS
                            .iter()
                            .filter(|w| !w.is_ascii())
                            .any(|w| before.ends_with(*w));
                        tally.record(*emotion, word, negated, intensified);
                    }
                }
            }
        }

        tally
    }
}

#[async_trait]
impl ModalityAnalyzer for LexiconTextAnalyzer {
    fn modality(&self) -> Modality {
        Modality::Text
    }

    fn name(&self) -> &'static str {
        "LexiconText"
    }

    async fn analyze(
        &self,
        input: &str,
        _context: Option<&AnalysisContext>,
    ) -> Result<ModalityEstimate, ModalityError> {
        if input.trim().is_empty() {
            return Err(ModalityError::InvalidInput("empty text".to_string()));
        }

        let tally = Self::tally(input);
        let exclamations = input.chars().filter(|c| *c == '!' || *c == '！').count().min(3);

        // Lexicon order breaks ties between equally-hit categories
        let winner = LEXICON
            .iter()
            .filter_map(|(emotion, _)| tally.hits.get(emotion).map(|h| (*emotion, *h)))
            .fold(None::<(EmotionCategory, f32)>, |best, (emotion, hits)| match best {
                Some((_, best_hits)) if best_hits >= hits => best,
                _ => Some((emotion, hits)),
            });

        let Some((emotion, hits)) = winner else {
            return Ok(ModalityEstimate::new(
                EmotionCategory::Neutral,
                0.3 + 0.05 * exclamations as f32,
                0.4,
                "no emotional cues detected",
            ));
        };

        let total_hits: f32 = tally.hits.values().sum();
        let dominance = hits / total_hits;

        let intensity = 0.4
            + 0.15 * (hits - 1.0).max(0.0)
            + 0.1 * tally.intensifiers as f32
            + 0.05 * exclamations as f32;
        let confidence = (0.5 + 0.1 * hits).min(0.9) * (0.6 + 0.4 * dominance);

        let cues = tally.words.get(&emotion).cloned().unwrap_or_default();
        let mut reasoning = format!("{} cue(s) for {}: {}", cues.len(), emotion, cues.join(", "));
        if tally.negations > 0 {
            reasoning.push_str(&format!(" ({} negated cue(s) adjusted)", tally.negations));
        }

        Ok(ModalityEstimate::new(emotion, intensity, confidence, reasoning))
    }
}
