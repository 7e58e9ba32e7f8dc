//! crates/study_content_core/src/domain.rs
//!
//! Defines the generated study-content entities handed to the UI layer.
//! Every entity is built once per generation action and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Generation Parameters
//=========================================================================================

/// The four kinds of content the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Notes,
    Slides,
    MindMap,
    Quiz,
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationKind::Notes => "notes",
            GenerationKind::Slides => "slides",
            GenerationKind::MindMap => "mindmap",
            GenerationKind::Quiz => "quiz",
        };
        f.write_str(name)
    }
}

/// Quiz difficulty tier. Each tier fixes the point value of its questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn points(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a difficulty string is not one of `easy`, `medium` or `hard`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown difficulty '{0}', expected easy, medium or hard")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Accepts the same spellings as `FromStr`, so `"Easy"` and `"easy"` both parse.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single user-triggered generation action and its kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationRequest {
    #[serde(rename_all = "camelCase")]
    Notes { file_name: String, transcript: String },
    Slides { content: String },
    #[serde(rename = "mindmap")]
    MindMap { outline: String },
    Quiz {
        material: String,
        difficulty: Difficulty,
        count: u32,
    },
}

impl GenerationRequest {
    pub fn kind(&self) -> GenerationKind {
        match self {
            GenerationRequest::Notes { .. } => GenerationKind::Notes,
            GenerationRequest::Slides { .. } => GenerationKind::Slides,
            GenerationRequest::MindMap { .. } => GenerationKind::MindMap,
            GenerationRequest::Quiz { .. } => GenerationKind::Quiz,
        }
    }
}

//=========================================================================================
// Lecture Notes
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LectureNotes {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    /// Markdown body.
    pub detailed_notes: String,
    pub generated_at: DateTime<Utc>,
    pub word_count: usize,
    pub is_fallback: bool,
}

/// Counts the space-delimited tokens of a notes body. Line breaks do not split words.
pub fn word_count(text: &str) -> usize {
    text.split(' ').filter(|token| !token.is_empty()).count()
}

//=========================================================================================
// Slide Deck
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// 1-based position within the deck.
    pub slide_number: u32,
    pub title: String,
    pub content: Vec<String>,
    pub speaker_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SlideDeck {
    pub title: String,
    pub total_slides: usize,
    pub slides: Vec<Slide>,
    pub theme: String,
    pub generated_at: DateTime<Utc>,
    pub is_fallback: bool,
}

//=========================================================================================
// Mind Map
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    pub id: String,
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub topic: String,
    pub subtopics: Vec<Subtopic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub central_topic: String,
    pub branches: Vec<Branch>,
    /// Advisory only; taken from the model when it supplies one.
    pub total_nodes: usize,
    pub generated_at: DateTime<Utc>,
    pub is_fallback: bool,
}

/// Counts the central node plus every branch, subtopic and leaf item.
pub fn count_nodes(branches: &[Branch]) -> usize {
    1 + branches
        .iter()
        .map(|branch| {
            1 + branch
                .subtopics
                .iter()
                .map(|subtopic| 1 + subtopic.items.len())
                .sum::<usize>()
        })
        .sum::<usize>()
}

//=========================================================================================
// Quiz
//=========================================================================================

/// Only multiple-choice questions are ever handed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum QuestionType {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub options: [String; 4],
    /// Index into `options`, always within `0..=3`.
    pub correct_answer: usize,
    pub points: u32,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub total_questions: usize,
    pub questions: Vec<Question>,
    /// Minutes.
    pub time_limit: u32,
    /// Percentage required to pass.
    pub passing_score: u8,
    pub adaptive: bool,
    pub created_at: DateTime<Utc>,
    pub is_fallback: bool,
}

//=========================================================================================
// Generation Result
//=========================================================================================

/// The entity produced for a `GenerationRequest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum GeneratedContent {
    Notes(LectureNotes),
    Slides(SlideDeck),
    #[serde(rename = "mindmap")]
    MindMap(MindMap),
    Quiz(Quiz),
}

impl GeneratedContent {
    pub fn kind(&self) -> GenerationKind {
        match self {
            GeneratedContent::Notes(_) => GenerationKind::Notes,
            GeneratedContent::Slides(_) => GenerationKind::Slides,
            GeneratedContent::MindMap(_) => GenerationKind::MindMap,
            GeneratedContent::Quiz(_) => GenerationKind::Quiz,
        }
    }

    pub fn is_fallback(&self) -> bool {
        match self {
            GeneratedContent::Notes(notes) => notes.is_fallback,
            GeneratedContent::Slides(deck) => deck.is_fallback,
            GeneratedContent::MindMap(map) => map.is_fallback,
            GeneratedContent::Quiz(quiz) => quiz.is_fallback,
        }
    }
}
