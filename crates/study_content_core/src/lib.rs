pub mod domain;
pub mod generator;
pub mod ports;
pub mod prompts;
pub mod response;
pub mod schema;

pub use domain::{
    Branch, Difficulty, GeneratedContent, GenerationKind, GenerationRequest, LectureNotes,
    MindMap, Question, QuestionType, Quiz, Slide, SlideDeck, Subtopic, UnknownDifficulty,
};
pub use generator::ContentGenerator;
pub use ports::{CompletionOptions, CompletionService, PortError, PortResult};
pub use response::ResponseError;
