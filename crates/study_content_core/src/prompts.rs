//! crates/study_content_core/src/prompts.rs
//!
//! Prompt templates for each content kind. Every builder is a pure function: the same
//! inputs always produce the same prompt.
//!
//! Placeholders are filled in a single left-to-right pass over the template, so text
//! inside a substituted value is never mistaken for a placeholder.

use crate::domain::Difficulty;

const LECTURE_NOTES_TEMPLATE: &str = r#"You are an expert academic note-taker who turns lecture recordings into clear, well-structured study notes.

LECTURE FILE: {file_name}

TRANSCRIPT:
---
{transcript}
---

If the transcript is empty, infer the most likely lecture topic from the file name and write notes a student would find useful for that topic.

Return a JSON object with exactly this structure:
{
  "title": "Lecture title",
  "summary": "Two or three sentence overview of the lecture",
  "keyPoints": ["Key point 1", "Key point 2", "Key point 3"],
  "detailedNotes": "Full notes in markdown, using headings and bullet lists"
}

Required fields: title, summary, keyPoints, detailedNotes.
Return ONLY valid JSON, no markdown formatting."#;

const SLIDES_TEMPLATE: &str = r#"You are an expert instructional designer who builds concise, engaging presentation slides for courses.

COURSE CONTENT:
---
{content}
---

Create a slide deck that teaches this content in a logical order. Keep each slide focused on one idea with three to five short bullet points, and give the presenter speaker notes for every slide.

Return a JSON object with exactly this structure:
{
  "title": "Presentation title",
  "totalSlides": 8,
  "slides": [
    {
      "slideNumber": 1,
      "title": "Slide title",
      "content": ["Bullet point 1", "Bullet point 2", "Bullet point 3"],
      "speakerNotes": "What the presenter should say for this slide"
    }
  ],
  "theme": "professional"
}

Required fields: title, totalSlides, slides (each with slideNumber, title, content, speakerNotes), theme.
Slide numbers start at 1 and increase by one.
Return ONLY valid JSON, no markdown formatting."#;

const MIND_MAP_TEMPLATE: &str = r#"You are an expert educator who organizes course material into hierarchical mind maps.

COURSE OUTLINE:
---
{outline}
---

Identify the central topic, group the material into main branches, and break each branch into subtopics with a few short items each.

Return a JSON object with exactly this structure:
{
  "centralTopic": "Main course topic",
  "branches": [
    {
      "id": "branch-1",
      "topic": "Branch topic",
      "subtopics": [
        {
          "id": "branch-1-sub-1",
          "name": "Subtopic name",
          "items": ["Item 1", "Item 2"]
        }
      ]
    }
  ],
  "totalNodes": 12
}

Required fields: centralTopic, branches (each with id, topic, subtopics), subtopics (each with id, name, items), totalNodes.
Every id must be unique.
Return ONLY valid JSON, no markdown formatting."#;

const QUIZ_TEMPLATE: &str = r#"You are an expert assessment designer who writes fair, accurate multiple-choice quizzes from study material.

STUDY MATERIAL:
---
{material}
---

DIFFICULTY: {difficulty}

Rules you MUST follow:
- Generate EXACTLY {count} questions.
- Every question MUST have "type": "multiple-choice". Do NOT generate true/false, short-answer, fill-in-the-blank or any other question type.
- Every question MUST have EXACTLY 4 options.
- Exactly ONE option is correct. "correctAnswer" is the 0-based index of that option (0, 1, 2 or 3).
- Every question is worth {points} points (easy = 10, medium = 15, hard = 20).
- Every question includes a short explanation of why the correct answer is right.

Return a JSON object with exactly this structure:
{
  "title": "Quiz title",
  "description": "One sentence describing what the quiz covers",
  "difficulty": "{difficulty}",
  "totalQuestions": {count},
  "questions": [
    {
      "id": 1,
      "type": "multiple-choice",
      "question": "Question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0,
      "points": {points},
      "explanation": "Why the correct answer is right"
    }
  ]
}

Required fields: title, description, difficulty, totalQuestions, questions (each with id, type, question, options, correctAnswer, points, explanation).
Return ONLY valid JSON, no markdown formatting."#;

/// Replaces every `{name}` in `template` with its value. Substituted text is not rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        let hit = values.iter().find_map(|(name, value)| {
            after_brace
                .strip_prefix(name)?
                .strip_prefix('}')
                .map(|remaining| (*value, remaining))
        });
        match hit {
            Some((value, remaining)) => {
                out.push_str(value);
                rest = remaining;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn lecture_notes_prompt(file_name: &str, transcript: &str) -> String {
    fill(
        LECTURE_NOTES_TEMPLATE,
        &[("file_name", file_name), ("transcript", transcript)],
    )
}

pub fn slides_prompt(course_content: &str) -> String {
    fill(SLIDES_TEMPLATE, &[("content", course_content)])
}

pub fn mind_map_prompt(course_outline: &str) -> String {
    fill(MIND_MAP_TEMPLATE, &[("outline", course_outline)])
}

pub fn quiz_prompt(material: &str, difficulty: Difficulty, count: u32) -> String {
    let count = count.to_string();
    let points = difficulty.points().to_string();
    fill(
        QUIZ_TEMPLATE,
        &[
            ("material", material),
            ("difficulty", difficulty.as_str()),
            ("count", &count),
            ("points", &points),
        ],
    )
}
