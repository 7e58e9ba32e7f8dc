//! crates/study_content_core/src/schema.rs
//!
//! The JSON shapes the prompts ask the model to return. These are parsed straight from
//! completion text and then annotated into the domain entities.

use serde::{Deserialize, Deserializer};

/// Models return identifiers as either numbers or strings; both become strings.
fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

//=========================================================================================
// Lecture Notes
//=========================================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureNotesDraft {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub detailed_notes: String,
}

//=========================================================================================
// Slides
//=========================================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDraft {
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub speaker_notes: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDeckDraft {
    pub title: String,
    pub slides: Vec<SlideDraft>,
    #[serde(default)]
    pub theme: Option<String>,
}

//=========================================================================================
// Mind Map
//=========================================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtopicDraft {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDraft {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub topic: String,
    #[serde(default)]
    pub subtopics: Vec<SubtopicDraft>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapDraft {
    pub central_topic: String,
    pub branches: Vec<BranchDraft>,
    #[serde(default)]
    pub total_nodes: Option<usize>,
}

//=========================================================================================
// Quiz
//=========================================================================================

/// Deliberately loose: type and option count are checked after parsing so that
/// drift is detected rather than rejected as unparseable.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionDraft>,
}
