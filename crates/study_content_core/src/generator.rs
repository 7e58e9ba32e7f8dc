//! crates/study_content_core/src/generator.rs
//!
//! The content generator pairs each prompt template with the completion port and the
//! response parser. Every operation walks the same pipeline:
//!
//! build prompt -> one completion call -> parse JSON -> annotate (or fall back)
//!
//! The generator never returns an error. Configuration, provider, timeout, cancellation
//! and parsing failures all resolve to a schema-valid placeholder with `is_fallback` set,
//! so callers can render the result unconditionally.

use crate::domain::{
    count_nodes, word_count, Branch, Difficulty, GeneratedContent, GenerationKind,
    GenerationRequest, LectureNotes, MindMap, Question, QuestionType, Quiz, Slide, SlideDeck,
    Subtopic,
};
use crate::ports::{CompletionOptions, CompletionService, PortError, PortResult};
use crate::prompts;
use crate::response;
use crate::schema::{LectureNotesDraft, MindMapDraft, QuestionDraft, QuizDraft, SlideDeckDraft};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upper bound on a single completion round trip unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const PASSING_SCORE: u8 = 70;
const MINUTES_PER_QUESTION: u32 = 2;
const DEFAULT_THEME: &str = "professional";
const FALLBACK_TOPIC: &str = "Course Overview";
const HEADLINE_MAX_CHARS: usize = 80;

//=========================================================================================
// The Generator
//=========================================================================================

#[derive(Clone)]
pub struct ContentGenerator {
    completion: Arc<dyn CompletionService>,
    options: CompletionOptions,
    timeout: Duration,
}

impl ContentGenerator {
    /// Creates a generator with default completion options and a 30 second timeout.
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            options: CompletionOptions::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the generation described by `request`.
    pub async fn generate(&self, request: &GenerationRequest) -> GeneratedContent {
        self.generate_cancellable(request, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), but resolves to a fallback as soon as `cancel` fires.
    pub async fn generate_cancellable(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> GeneratedContent {
        match request {
            GenerationRequest::Notes {
                file_name,
                transcript,
            } => GeneratedContent::Notes(
                self.lecture_notes_cancellable(file_name, transcript, cancel)
                    .await,
            ),
            GenerationRequest::Slides { content } => {
                GeneratedContent::Slides(self.slides_cancellable(content, cancel).await)
            }
            GenerationRequest::MindMap { outline } => {
                GeneratedContent::MindMap(self.mind_map_cancellable(outline, cancel).await)
            }
            GenerationRequest::Quiz {
                material,
                difficulty,
                count,
            } => GeneratedContent::Quiz(
                self.quiz_cancellable(material, *difficulty, *count, cancel)
                    .await,
            ),
        }
    }

    pub async fn lecture_notes(&self, file_name: &str, transcript: &str) -> LectureNotes {
        self.lecture_notes_cancellable(file_name, transcript, &CancellationToken::new())
            .await
    }

    pub async fn slides(&self, course_content: &str) -> SlideDeck {
        self.slides_cancellable(course_content, &CancellationToken::new())
            .await
    }

    pub async fn mind_map(&self, course_outline: &str) -> MindMap {
        self.mind_map_cancellable(course_outline, &CancellationToken::new())
            .await
    }

    /// Generates a multiple-choice quiz. A `count` below one is treated as one.
    pub async fn quiz(&self, material: &str, difficulty: Difficulty, count: u32) -> Quiz {
        self.quiz_cancellable(material, difficulty, count, &CancellationToken::new())
            .await
    }

    //=====================================================================================
    // Cancellable Assemblers
    //=====================================================================================

    pub async fn lecture_notes_cancellable(
        &self,
        file_name: &str,
        transcript: &str,
        cancel: &CancellationToken,
    ) -> LectureNotes {
        let prompt = prompts::lecture_notes_prompt(file_name, transcript);
        let result = self
            .request_draft::<LectureNotesDraft>(GenerationKind::Notes, &prompt, cancel)
            .await
            .map(annotate_notes);
        recover(GenerationKind::Notes, result, || fallback_notes(file_name))
    }

    pub async fn slides_cancellable(
        &self,
        course_content: &str,
        cancel: &CancellationToken,
    ) -> SlideDeck {
        let prompt = prompts::slides_prompt(course_content);
        let result = self
            .request_draft::<SlideDeckDraft>(GenerationKind::Slides, &prompt, cancel)
            .await
            .map(annotate_slides);
        recover(GenerationKind::Slides, result, || {
            fallback_slides(course_content)
        })
    }

    pub async fn mind_map_cancellable(
        &self,
        course_outline: &str,
        cancel: &CancellationToken,
    ) -> MindMap {
        let prompt = prompts::mind_map_prompt(course_outline);
        let result = self
            .request_draft::<MindMapDraft>(GenerationKind::MindMap, &prompt, cancel)
            .await
            .map(annotate_mind_map);
        recover(GenerationKind::MindMap, result, || {
            fallback_mind_map(course_outline)
        })
    }

    pub async fn quiz_cancellable(
        &self,
        material: &str,
        difficulty: Difficulty,
        count: u32,
        cancel: &CancellationToken,
    ) -> Quiz {
        let count = count.max(1);
        let prompt = prompts::quiz_prompt(material, difficulty, count);
        let result = self
            .request_draft::<QuizDraft>(GenerationKind::Quiz, &prompt, cancel)
            .await
            .and_then(|draft| annotate_quiz(draft, difficulty, count));
        recover(GenerationKind::Quiz, result, || {
            fallback_quiz(material, difficulty)
        })
    }

    /// Makes the single completion call for one generation and parses its JSON payload.
    async fn request_draft<T: DeserializeOwned>(
        &self,
        kind: GenerationKind,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> PortResult<T> {
        debug!(%kind, prompt_chars = prompt.len(), "Requesting completion");

        let call = self.completion.complete(prompt, &self.options);
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PortError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, call) => {
                outcome.map_err(|_| PortError::Timeout(self.timeout))??
            }
        };

        debug!(%kind, response_chars = raw.len(), "Completion received");
        Ok(response::parse_json_object(&raw)?)
    }
}

/// Returns the generated value, or logs the failure and builds the fallback.
fn recover<T>(kind: GenerationKind, result: PortResult<T>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => {
            info!(%kind, "Content generated");
            value
        }
        Err(err) => {
            warn!(%kind, error = %err, "Generation failed, returning fallback content");
            fallback()
        }
    }
}

//=========================================================================================
// Annotation
//=========================================================================================

fn annotate_notes(draft: LectureNotesDraft) -> LectureNotes {
    let words = word_count(&draft.detailed_notes);
    LectureNotes {
        title: draft.title,
        summary: draft.summary,
        key_points: draft.key_points,
        detailed_notes: draft.detailed_notes,
        generated_at: Utc::now(),
        word_count: words,
        is_fallback: false,
    }
}

fn annotate_slides(draft: SlideDeckDraft) -> SlideDeck {
    // Numbering is positional; whatever the model numbered is discarded.
    let slides: Vec<Slide> = draft
        .slides
        .into_iter()
        .zip(1u32..)
        .map(|(slide, slide_number)| Slide {
            slide_number,
            title: slide.title,
            content: slide.content,
            speaker_notes: slide.speaker_notes,
        })
        .collect();

    SlideDeck {
        title: draft.title,
        total_slides: slides.len(),
        slides,
        theme: draft.theme.unwrap_or_else(|| DEFAULT_THEME.to_string()),
        generated_at: Utc::now(),
        is_fallback: false,
    }
}

fn annotate_mind_map(draft: MindMapDraft) -> MindMap {
    let mut branches: Vec<Branch> = draft
        .branches
        .into_iter()
        .map(|branch| Branch {
            id: branch.id,
            topic: branch.topic,
            subtopics: branch
                .subtopics
                .into_iter()
                .map(|subtopic| Subtopic {
                    id: subtopic.id,
                    name: subtopic.name,
                    items: subtopic.items,
                })
                .collect(),
        })
        .collect();
    ensure_unique_ids(&mut branches);

    MindMap {
        central_topic: draft.central_topic,
        total_nodes: draft.total_nodes.unwrap_or_else(|| count_nodes(&branches)),
        branches,
        generated_at: Utc::now(),
        is_fallback: false,
    }
}

fn has_duplicate_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen = HashSet::new();
    ids.into_iter().any(|id| id.trim().is_empty() || !seen.insert(id))
}

/// Branch ids must be unique among branches and subtopic ids among all subtopics.
/// A scope with a blank or repeated id is renumbered positionally as a whole.
fn ensure_unique_ids(branches: &mut [Branch]) {
    if has_duplicate_ids(branches.iter().map(|branch| branch.id.as_str())) {
        debug!("Renumbering mind map branch ids");
        for (branch, n) in branches.iter_mut().zip(1..) {
            branch.id = format!("branch-{n}");
        }
    }

    let subtopic_ids = branches
        .iter()
        .flat_map(|branch| branch.subtopics.iter().map(|subtopic| subtopic.id.as_str()));
    if has_duplicate_ids(subtopic_ids) {
        debug!("Renumbering mind map subtopic ids");
        for branch in branches.iter_mut() {
            for (subtopic, m) in branch.subtopics.iter_mut().zip(1..) {
                subtopic.id = format!("{}-sub-{m}", branch.id);
            }
        }
    }
}

/// Validates the quiz draft and annotates it. Any shape violation is treated as drift.
fn annotate_quiz(draft: QuizDraft, difficulty: Difficulty, count: u32) -> PortResult<Quiz> {
    if draft.questions.len() != count as usize {
        return Err(PortError::MalformedResponse(format!(
            "expected {} questions, model returned {}",
            count,
            draft.questions.len()
        )));
    }

    let questions = draft
        .questions
        .into_iter()
        .map(|question| validate_question(question, difficulty))
        .collect::<PortResult<Vec<_>>>()?;

    Ok(Quiz {
        id: Uuid::now_v7(),
        title: draft.title,
        description: draft.description,
        difficulty,
        total_questions: questions.len(),
        questions,
        time_limit: MINUTES_PER_QUESTION * count,
        passing_score: PASSING_SCORE,
        adaptive: true,
        created_at: Utc::now(),
        is_fallback: false,
    })
}

fn validate_question(draft: QuestionDraft, difficulty: Difficulty) -> PortResult<Question> {
    if draft.question_type != "multiple-choice" {
        return Err(PortError::MalformedResponse(format!(
            "question {} has type '{}', expected multiple-choice",
            draft.id, draft.question_type
        )));
    }

    let option_count = draft.options.len();
    let options: [String; 4] = draft.options.try_into().map_err(|_| {
        PortError::MalformedResponse(format!(
            "question {} has {} options, expected 4",
            draft.id, option_count
        ))
    })?;

    let correct_answer = usize::try_from(draft.correct_answer)
        .ok()
        .filter(|index| *index < options.len())
        .ok_or_else(|| {
            PortError::MalformedResponse(format!(
                "question {} has correct answer index {} outside 0..=3",
                draft.id, draft.correct_answer
            ))
        })?;

    Ok(Question {
        id: draft.id,
        question_type: QuestionType::MultipleChoice,
        question: draft.question,
        options,
        correct_answer,
        // The tier fixes the value; whatever the model put here is ignored.
        points: difficulty.points(),
        explanation: draft.explanation,
    })
}

//=========================================================================================
// Fallbacks
//=========================================================================================

/// The first non-blank line of `text`, shortened for use as a title.
fn headline(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(HEADLINE_MAX_CHARS).collect())
        .unwrap_or_else(|| FALLBACK_TOPIC.to_string())
}

fn fallback_notes(file_name: &str) -> LectureNotes {
    let title = match file_name.trim() {
        "" => "Lecture Notes".to_string(),
        name => format!("Lecture Notes: {name}"),
    };
    let detailed_notes = format!(
        "# {title}\n\nNotes for this lecture could not be generated. Review the recording and try again later."
    );

    LectureNotes {
        summary: "Automatic note generation is unavailable right now.".to_string(),
        key_points: vec!["Review the lecture recording for the main concepts.".to_string()],
        word_count: word_count(&detailed_notes),
        title,
        detailed_notes,
        generated_at: Utc::now(),
        is_fallback: true,
    }
}

fn fallback_slides(course_content: &str) -> SlideDeck {
    let topic = headline(course_content);
    SlideDeck {
        title: topic.clone(),
        total_slides: 1,
        slides: vec![Slide {
            slide_number: 1,
            title: topic,
            content: vec![
                "Slide generation is unavailable right now.".to_string(),
                "Refer to the course content directly.".to_string(),
            ],
            speaker_notes: "Placeholder slide shown because the deck could not be generated."
                .to_string(),
        }],
        theme: DEFAULT_THEME.to_string(),
        generated_at: Utc::now(),
        is_fallback: true,
    }
}

fn fallback_mind_map(course_outline: &str) -> MindMap {
    let central_topic = headline(course_outline);
    let branches = vec![Branch {
        id: "branch-1".to_string(),
        topic: "Key Concepts".to_string(),
        subtopics: vec![Subtopic {
            id: "branch-1-sub-1".to_string(),
            name: "Overview".to_string(),
            items: vec![central_topic.clone()],
        }],
    }];

    MindMap {
        central_topic,
        total_nodes: count_nodes(&branches),
        branches,
        generated_at: Utc::now(),
        is_fallback: true,
    }
}

fn fallback_quiz(material: &str, difficulty: Difficulty) -> Quiz {
    let question = Question {
        id: "1".to_string(),
        question_type: QuestionType::MultipleChoice,
        question: "Quiz generation is unavailable right now. What is the best next step?"
            .to_string(),
        options: [
            "Review the study material and try again".to_string(),
            "Skip the material".to_string(),
            "Guess every answer".to_string(),
            "None of the above".to_string(),
        ],
        correct_answer: 0,
        points: difficulty.points(),
        explanation: "Placeholder question shown because the quiz could not be generated."
            .to_string(),
    };

    Quiz {
        id: Uuid::now_v7(),
        title: "Quiz (Fallback Mode)".to_string(),
        description: format!("Placeholder quiz for: {}", headline(material)),
        difficulty,
        total_questions: 1,
        questions: vec![question],
        time_limit: MINUTES_PER_QUESTION,
        passing_score: PASSING_SCORE,
        adaptive: true,
        created_at: Utc::now(),
        is_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Reply {
        Text(String),
        ProviderFailure,
        MissingCredential,
        Hang,
    }

    /// Completion stub that records every prompt it receives.
    struct StubCompletion {
        reply: Reply,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl StubCompletion {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionService for StubCompletion {
        async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Reply::Text(text) => Ok(text.clone()),
                Reply::ProviderFailure => Err(PortError::Provider("503 Service Unavailable".into())),
                Reply::MissingCredential => {
                    Err(PortError::Configuration("OPENAI_API_KEY is not set".into()))
                }
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    fn generator(reply: Reply) -> (ContentGenerator, Arc<StubCompletion>) {
        let stub = Arc::new(StubCompletion {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        });
        (ContentGenerator::new(stub.clone()), stub)
    }

    fn text(value: serde_json::Value) -> Reply {
        Reply::Text(value.to_string())
    }

    fn quiz_json(count: usize, points: u32) -> serde_json::Value {
        let questions: Vec<_> = (1..=count)
            .map(|id| {
                json!({
                    "id": id,
                    "type": "multiple-choice",
                    "question": format!("Question {id}?"),
                    "options": ["A", "B", "C", "D"],
                    "correctAnswer": id % 4,
                    "points": points,
                    "explanation": "Because."
                })
            })
            .collect();
        json!({
            "title": "Loops Quiz",
            "description": "Covers loops",
            "difficulty": "easy",
            "totalQuestions": count,
            "questions": questions
        })
    }

    fn mind_map_json() -> serde_json::Value {
        json!({
            "centralTopic": "Rust",
            "branches": [{
                "id": "branch-1",
                "topic": "Ownership",
                "subtopics": [{"id": "branch-1-sub-1", "name": "Moves", "items": ["a", "b"]}]
            }],
            "totalNodes": 9
        })
    }

    fn slides_json() -> serde_json::Value {
        json!({
            "title": "Borrowing",
            "totalSlides": 2,
            "slides": [
                {"slideNumber": 1, "title": "Intro", "content": ["x"], "speakerNotes": "hi"},
                {"slideNumber": 2, "title": "Rules", "content": ["y", "z"], "speakerNotes": "go"}
            ],
            "theme": "dark"
        })
    }

    //-------------------------------------------------------------------------------------
    // Genuine generations
    //-------------------------------------------------------------------------------------

    #[tokio::test]
    async fn lecture_notes_scenario_counts_words() {
        let (generator, stub) = generator(Reply::Text(
            r##"{"title":"Intro","summary":"S","keyPoints":["a"],"detailedNotes":"# Intro\n\nbody text here"}"##
                .to_string(),
        ));

        let notes = generator.lecture_notes("intro.mp4", "").await;

        assert_eq!(notes.title, "Intro");
        assert_eq!(notes.summary, "S");
        assert_eq!(notes.key_points, vec!["a".to_string()]);
        assert_eq!(notes.detailed_notes, "# Intro\n\nbody text here");
        assert_eq!(notes.word_count, 4);
        assert!(!notes.generated_at.to_rfc3339().is_empty());
        assert!(!notes.is_fallback);
        assert_eq!(stub.calls(), 1);
        assert!(stub.last_prompt().contains("intro.mp4"));
    }

    #[tokio::test]
    async fn lecture_notes_tolerate_surrounding_prose() {
        let (generator, _) = generator(Reply::Text(
            "Sure! ```json\n{\"title\":\"T\",\"summary\":\"S\",\"keyPoints\":[],\"detailedNotes\":\"one two\"}\n``` Let me know {if} you need more."
                .to_string(),
        ));

        let notes = generator.lecture_notes("a.mp4", "transcript").await;

        assert!(!notes.is_fallback);
        assert_eq!(notes.word_count, 2);
    }

    #[tokio::test]
    async fn slides_keep_model_content_and_theme() {
        let (generator, _) = generator(text(slides_json()));

        let deck = generator.slides("Borrowing rules").await;

        assert!(!deck.is_fallback);
        assert_eq!(deck.title, "Borrowing");
        assert_eq!(deck.theme, "dark");
        assert_eq!(deck.total_slides, 2);
        assert_eq!(deck.slides[1].title, "Rules");
        assert_eq!(deck.slides[1].content, vec!["y".to_string(), "z".to_string()]);
        assert_eq!(deck.slides[1].speaker_notes, "go");
    }

    #[tokio::test]
    async fn slides_are_renumbered_contiguously() {
        let (generator, _) = generator(text(json!({
            "title": "Deck",
            "totalSlides": 7,
            "slides": [
                {"slideNumber": 4, "title": "A"},
                {"slideNumber": 4, "title": "B"},
                {"slideNumber": 9, "title": "C"}
            ]
        })));

        let deck = generator.slides("content").await;

        let numbers: Vec<u32> = deck.slides.iter().map(|slide| slide.slide_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(deck.total_slides, 3);
        assert_eq!(deck.theme, "professional");
    }

    #[tokio::test]
    async fn mind_map_keeps_advisory_node_count() {
        let (generator, _) = generator(text(mind_map_json()));

        let map = generator.mind_map("Rust outline").await;

        assert!(!map.is_fallback);
        assert_eq!(map.central_topic, "Rust");
        assert_eq!(map.total_nodes, 9);
        assert_eq!(map.branches[0].subtopics[0].items.len(), 2);
    }

    #[tokio::test]
    async fn mind_map_counts_nodes_when_model_omits_them() {
        let mut value = mind_map_json();
        value.as_object_mut().unwrap().remove("totalNodes");
        let (generator, _) = generator(text(value));

        let map = generator.mind_map("Rust outline").await;

        assert_eq!(map.total_nodes, 5);
    }

    #[tokio::test]
    async fn mind_map_keeps_unique_model_ids() {
        let (generator, _) = generator(text(mind_map_json()));

        let map = generator.mind_map("Rust outline").await;

        assert_eq!(map.branches[0].id, "branch-1");
        assert_eq!(map.branches[0].subtopics[0].id, "branch-1-sub-1");
    }

    #[tokio::test]
    async fn duplicate_branch_ids_are_renumbered() {
        let (generator, _) = generator(text(json!({
            "centralTopic": "Rust",
            "branches": [
                {"id": "b", "topic": "Ownership", "subtopics": [{"id": "s1", "name": "Moves"}]},
                {"id": "b", "topic": "Traits", "subtopics": [{"id": "s2", "name": "Bounds"}]}
            ]
        })));

        let map = generator.mind_map("Rust outline").await;

        assert!(!map.is_fallback);
        let branch_ids: Vec<&str> = map.branches.iter().map(|branch| branch.id.as_str()).collect();
        assert_eq!(branch_ids, vec!["branch-1", "branch-2"]);
        assert_eq!(map.branches[0].subtopics[0].id, "s1");
        assert_eq!(map.branches[1].subtopics[0].id, "s2");
    }

    #[tokio::test]
    async fn duplicate_subtopic_ids_are_renumbered() {
        let (generator, _) = generator(text(json!({
            "centralTopic": "Rust",
            "branches": [
                {"id": "own", "topic": "Ownership", "subtopics": [
                    {"id": "s", "name": "Moves"},
                    {"id": "s", "name": "Borrows"}
                ]},
                {"id": "tr", "topic": "Traits", "subtopics": [{"id": "s", "name": "Bounds"}]}
            ]
        })));

        let map = generator.mind_map("Rust outline").await;

        assert!(!map.is_fallback);
        let branch_ids: Vec<&str> = map.branches.iter().map(|branch| branch.id.as_str()).collect();
        assert_eq!(branch_ids, vec!["own", "tr"]);
        let subtopic_ids: Vec<&str> = map
            .branches
            .iter()
            .flat_map(|branch| branch.subtopics.iter().map(|subtopic| subtopic.id.as_str()))
            .collect();
        assert_eq!(subtopic_ids, vec!["own-sub-1", "own-sub-2", "tr-sub-1"]);
    }

    #[tokio::test]
    async fn quiz_scenario_annotates_limits() {
        let (generator, stub) = generator(text(quiz_json(3, 10)));

        let quiz = generator.quiz("Loops", Difficulty::Easy, 3).await;

        assert!(!quiz.is_fallback);
        assert_eq!(quiz.total_questions, 3);
        assert_eq!(quiz.time_limit, 6);
        assert_eq!(quiz.passing_score, 70);
        assert!(quiz.adaptive);
        assert_eq!(quiz.difficulty, Difficulty::Easy);
        assert_eq!(quiz.title, "Loops Quiz");
        assert_eq!(stub.calls(), 1);
        assert!(stub.last_prompt().contains("Generate EXACTLY 3 questions."));
    }

    #[tokio::test]
    async fn genuine_quizzes_match_requested_shape() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for count in 1..=5u32 {
                let (generator, _) =
                    generator(text(quiz_json(count as usize, difficulty.points())));

                let quiz = generator.quiz("Loops", difficulty, count).await;

                assert!(!quiz.is_fallback, "{difficulty} x {count} fell back");
                assert_eq!(quiz.questions.len(), count as usize);
                assert_eq!(quiz.total_questions, count as usize);
                for question in &quiz.questions {
                    assert_eq!(question.question_type, QuestionType::MultipleChoice);
                    assert_eq!(question.options.len(), 4);
                    assert!(question.correct_answer <= 3);
                    assert_eq!(question.points, difficulty.points());
                }
            }
        }
    }

    #[tokio::test]
    async fn quiz_points_always_follow_difficulty_tier() {
        let mut value = quiz_json(2, 999);
        value["questions"][0].as_object_mut().unwrap().remove("points");
        let (generator, _) = generator(text(value));

        let quiz = generator.quiz("Loops", Difficulty::Hard, 2).await;

        assert!(!quiz.is_fallback);
        let points: Vec<u32> = quiz.questions.iter().map(|question| question.points).collect();
        assert_eq!(points, vec![20, 20]);
    }

    #[tokio::test]
    async fn zero_count_is_raised_to_one() {
        let (generator, stub) = generator(text(quiz_json(1, 10)));

        let quiz = generator.quiz("Loops", Difficulty::Easy, 0).await;

        assert!(!quiz.is_fallback);
        assert_eq!(quiz.total_questions, 1);
        assert!(stub.last_prompt().contains("Generate EXACTLY 1 questions."));
    }

    #[tokio::test]
    async fn generate_dispatches_on_request_kind() {
        let (generator, _) = generator(text(mind_map_json()));

        let content = generator
            .generate(&GenerationRequest::MindMap {
                outline: "Rust".to_string(),
            })
            .await;

        assert_eq!(content.kind(), GenerationKind::MindMap);
        assert!(!content.is_fallback());
    }

    //-------------------------------------------------------------------------------------
    // Fallbacks
    //-------------------------------------------------------------------------------------

    fn all_requests() -> Vec<GenerationRequest> {
        vec![
            GenerationRequest::Notes {
                file_name: "intro.mp4".to_string(),
                transcript: "text".to_string(),
            },
            GenerationRequest::Slides {
                content: "Ownership\nMoves and borrows".to_string(),
            },
            GenerationRequest::MindMap {
                outline: "Week 1: Ownership".to_string(),
            },
            GenerationRequest::Quiz {
                material: "Loops".to_string(),
                difficulty: Difficulty::Medium,
                count: 3,
            },
        ]
    }

    #[tokio::test]
    async fn text_without_json_falls_back_for_every_kind() {
        for request in all_requests() {
            let (generator, stub) =
                generator(Reply::Text("I cannot help with that right now.".to_string()));

            let content = generator.generate(&request).await;

            assert_eq!(content.kind(), request.kind());
            assert!(content.is_fallback(), "{} did not fall back", request.kind());
            assert_eq!(stub.calls(), 1);
        }
    }

    #[tokio::test]
    async fn provider_errors_fall_back_without_retry() {
        for request in all_requests() {
            let (generator, stub) = generator(Reply::ProviderFailure);

            let content = generator.generate(&request).await;

            assert!(content.is_fallback());
            assert_eq!(stub.calls(), 1, "{} retried", request.kind());
        }
    }

    #[tokio::test]
    async fn missing_credentials_fall_back() {
        for request in all_requests() {
            let (generator, _) = generator(Reply::MissingCredential);
            assert!(generator.generate(&request).await.is_fallback());
        }
    }

    #[tokio::test]
    async fn empty_completion_falls_back() {
        let (generator, _) = generator(Reply::Text(String::new()));
        let deck = generator.slides("Ownership").await;
        assert!(deck.is_fallback);
    }

    #[tokio::test]
    async fn fallback_shapes_are_schema_valid() {
        let (generator, _) = generator(Reply::ProviderFailure);

        let notes = generator.lecture_notes("intro.mp4", "").await;
        assert_eq!(notes.title, "Lecture Notes: intro.mp4");
        assert_eq!(notes.word_count, word_count(&notes.detailed_notes));
        assert!(!notes.key_points.is_empty());

        let deck = generator.slides("Ownership\nMoves").await;
        assert_eq!(deck.total_slides, 1);
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].slide_number, 1);
        assert_eq!(deck.slides[0].title, "Ownership");

        let map = generator.mind_map("").await;
        assert_eq!(map.central_topic, "Course Overview");
        assert_eq!(map.total_nodes, count_nodes(&map.branches));

        let quiz = generator.quiz("Loops", Difficulty::Hard, 5).await;
        assert_eq!(quiz.title, "Quiz (Fallback Mode)");
        assert_eq!(quiz.total_questions, 1);
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.time_limit, 2);
        assert_eq!(quiz.passing_score, 70);
        assert_eq!(quiz.questions[0].points, 20);
        assert_eq!(quiz.questions[0].correct_answer, 0);
    }

    #[tokio::test]
    async fn quiz_with_other_question_type_falls_back() {
        let mut value = quiz_json(2, 15);
        value["questions"][1]["type"] = json!("true-false");
        let (generator, _) = generator(text(value));

        let quiz = generator.quiz("Loops", Difficulty::Medium, 2).await;

        assert!(quiz.is_fallback);
        assert_eq!(quiz.title, "Quiz (Fallback Mode)");
    }

    #[tokio::test]
    async fn quiz_with_three_options_falls_back() {
        let mut value = quiz_json(2, 15);
        value["questions"][0]["options"] = json!(["A", "B", "C"]);
        let (generator, _) = generator(text(value));

        assert!(generator.quiz("Loops", Difficulty::Medium, 2).await.is_fallback);
    }

    #[tokio::test]
    async fn quiz_with_out_of_range_answer_falls_back() {
        for index in [json!(4), json!(-1)] {
            let mut value = quiz_json(1, 10);
            value["questions"][0]["correctAnswer"] = index;
            let (generator, _) = generator(text(value));

            assert!(generator.quiz("Loops", Difficulty::Easy, 1).await.is_fallback);
        }
    }

    #[tokio::test]
    async fn quiz_with_wrong_question_count_falls_back() {
        let (generator, _) = generator(text(quiz_json(2, 10)));

        assert!(generator.quiz("Loops", Difficulty::Easy, 3).await.is_fallback);
    }

    #[tokio::test]
    async fn hung_completion_times_out_to_fallback() {
        let (generator, stub) = generator(Reply::Hang);
        let generator = generator.with_timeout(Duration::from_millis(20));

        let map = generator.mind_map("Rust").await;

        assert!(map.is_fallback);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn cancellation_resolves_to_fallback() {
        let (generator, _) = generator(Reply::Hang);
        let cancel = CancellationToken::new();
        let request = GenerationRequest::Quiz {
            material: "Loops".to_string(),
            difficulty: Difficulty::Easy,
            count: 2,
        };

        let pending = generator.generate_cancellable(&request, &cancel);
        cancel.cancel();
        let content = pending.await;

        assert!(content.is_fallback());
    }
}
