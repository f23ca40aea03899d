//! Question records as served by the question source, and the immutable
//! `Question` the game consumes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::QuizError;
use crate::assets::{self, AssetKey};
use crate::consts::{DEFAULT_QUESTION_SCORE, DEFAULT_QUESTION_SECS};

/// Which side of the road the sign stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignSide {
    Left,
    #[default]
    Right,
}

impl SignSide {
    pub fn from_hint(hint: &str) -> Self {
        match hint.trim().to_ascii_uppercase().as_str() {
            "LEFT" => SignSide::Left,
            _ => SignSide::Right,
        }
    }
}

/// The source sends some numbers as strings and some as numbers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

impl NumberOrText {
    fn as_u32(&self) -> Option<u32> {
        match self {
            NumberOrText::Number(n) => u32::try_from(*n).ok(),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionRecord {
    id: u64,
    #[serde(default)]
    tool_tip: String,
    sequence: u32,
    #[serde(default)]
    weightage: Option<f32>,
    #[serde(default)]
    allow_comment: bool,
    #[serde(default)]
    selection_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataRecord {
    ans: NumberOrText,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    duration: Option<NumberOrText>,
    #[serde(default)]
    score: Option<NumberOrText>,
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    id: u64,
    name: String,
    metadata: MetadataRecord,
    options: Vec<OptionRecord>,
    #[serde(default)]
    sequence: Option<u32>,
}

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: u64,
    /// Text shown on the answer button
    pub label: String,
    pub sequence: u32,
    pub tooltip: String,
    pub weightage: Option<f32>,
    pub allow_comment: bool,
}

/// A quiz question, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub prompt: String,
    /// Options ordered by sequence
    pub options: Vec<AnswerOption>,
    /// Sequence number of the correct option
    pub correct_sequence: u32,
    /// Raw image filename from the source
    pub image: Option<String>,
    pub side: SignSide,
    /// Seconds allowed to answer (source default when absent)
    pub duration_secs: Option<u32>,
    /// Points for a correct answer
    pub score: Option<u32>,
    #[serde(skip)]
    order: (u32, u64),
}

impl Question {
    /// True when `selected` is the correct option's sequence
    pub fn is_correct(&self, selected: u32) -> bool {
        selected == self.correct_sequence
    }

    /// Option picked on timeout: the first one that is not the correct answer
    pub fn fallback_option(&self) -> Option<&AnswerOption> {
        self.options
            .iter()
            .find(|o| o.sequence != self.correct_sequence)
    }

    pub fn option(&self, sequence: u32) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.sequence == sequence)
    }

    /// Countdown length, falling back to `default_secs`
    pub fn duration_or(&self, default_secs: u32) -> u32 {
        self.duration_secs.filter(|d| *d > 0).unwrap_or(default_secs)
    }

    pub fn score_value(&self) -> u32 {
        self.score.unwrap_or(DEFAULT_QUESTION_SCORE)
    }

    /// Bundled image for the sign inset, if the filename is known
    pub fn asset(&self) -> Option<AssetKey> {
        self.image.as_deref().and_then(assets::lookup)
    }

    fn from_record(record: QuestionRecord) -> Result<Self, QuizError> {
        let QuestionRecord {
            id,
            name,
            metadata,
            options,
            sequence,
        } = record;

        let correct_sequence =
            metadata
                .ans
                .as_u32()
                .ok_or_else(|| QuizError::InvalidAnswer {
                    question_id: id,
                    value: metadata.ans.raw(),
                })?;

        let mut options: Vec<AnswerOption> = options
            .into_iter()
            .map(|o| {
                let label = o
                    .selection_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| o.tool_tip.clone());
                AnswerOption {
                    id: o.id,
                    label,
                    sequence: o.sequence,
                    tooltip: o.tool_tip,
                    weightage: o.weightage,
                    allow_comment: o.allow_comment,
                }
            })
            .collect();
        options.sort_by_key(|o| o.sequence);

        let duration_secs = metadata.duration.as_ref().and_then(|d| {
            let parsed = d.as_u32();
            if parsed.is_none() {
                log::warn!("question {}: ignoring duration {:?}", id, d.raw());
            }
            parsed
        });
        let score = metadata.score.as_ref().and_then(|s| {
            let parsed = s.as_u32();
            if parsed.is_none() {
                log::warn!("question {}: ignoring score {:?}", id, s.raw());
            }
            parsed
        });

        Ok(Self {
            id,
            prompt: name,
            options,
            correct_sequence,
            image: metadata.image.filter(|i| !i.is_empty()),
            side: metadata
                .position
                .as_deref()
                .map(SignSide::from_hint)
                .unwrap_or_default(),
            duration_secs,
            score,
            order: (sequence.unwrap_or(u32::MAX), id),
        })
    }
}

/// Decode the question source payload: an object of question records keyed
/// by arbitrary strings. Questions come back ordered by `(sequence, id)`.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, QuizError> {
    let records: BTreeMap<String, QuestionRecord> = serde_json::from_str(json)?;

    let mut questions = records
        .into_values()
        .map(Question::from_record)
        .collect::<Result<Vec<_>, _>>()?;
    if questions.is_empty() {
        return Err(QuizError::Empty);
    }
    questions.sort_by_key(|q| q.order);

    log::info!("Loaded {} questions", questions.len());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "b": {
            "id": 7,
            "name": "What does a red octagon mean?",
            "sequence": 2,
            "metadata": { "ans": "2", "image": "stop.png", "position": "LEFT", "duration": "25", "score": "15" },
            "options": [
                { "id": 71, "toolTip": "Slow down", "sequence": 3 },
                { "id": 70, "toolTip": "Give way", "sequence": 1 },
                { "id": 72, "toolTip": "Stop", "sequence": 2, "selectionMessage": "Stop completely" }
            ]
        },
        "a": {
            "id": 3,
            "name": "Speed limit in a school zone?",
            "sequence": 1,
            "metadata": { "ans": 1, "image": "", "position": "RIGHT" },
            "options": [
                { "id": 30, "toolTip": "25 km/h", "sequence": 1, "weightage": 1.0, "allowComment": false },
                { "id": 31, "toolTip": "60 km/h", "sequence": 2 }
            ]
        }
    }"#;

    #[test]
    fn test_parse_orders_questions_and_options() {
        let questions = parse_questions(PAYLOAD).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, 3);
        assert_eq!(questions[1].id, 7);

        let stop = &questions[1];
        let seqs: Vec<u32> = stop.options.iter().map(|o| o.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(stop.correct_sequence, 2);
        assert_eq!(stop.side, SignSide::Left);
        assert_eq!(stop.duration_or(20), 25);
        assert_eq!(stop.score_value(), 15);
        assert_eq!(stop.options[1].label, "Stop completely");
        assert_eq!(stop.options[0].label, "Give way");
    }

    #[test]
    fn test_defaults_when_metadata_is_sparse() {
        let questions = parse_questions(PAYLOAD).unwrap();
        let school = &questions[0];
        assert_eq!(school.image, None);
        assert_eq!(school.duration_or(20), 20);
        assert_eq!(school.score_value(), DEFAULT_QUESTION_SCORE);
    }

    #[test]
    fn test_fallback_is_first_wrong_option() {
        let questions = parse_questions(PAYLOAD).unwrap();
        let stop = &questions[1];
        assert_eq!(stop.fallback_option().map(|o| o.sequence), Some(1));
        assert!(stop.is_correct(2));
        assert!(!stop.is_correct(1));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(matches!(parse_questions("{}"), Err(QuizError::Empty)));
    }

    #[test]
    fn test_unreadable_answer_is_rejected() {
        let json = r#"{"q": {"id": 1, "name": "x", "metadata": {"ans": "two"}, "options": []}}"#;
        assert!(matches!(
            parse_questions(json),
            Err(QuizError::InvalidAnswer { question_id: 1, .. })
        ));
    }

    #[test]
    fn test_missing_required_field_is_a_decode_error() {
        let json = r#"{"q": {"id": 1, "metadata": {"ans": 1}, "options": []}}"#;
        assert!(matches!(parse_questions(json), Err(QuizError::Decode(_))));
    }
}
