mod section_answers;
mod share_awards;
mod solo_attempts;

pub use section_answers::SectionAnswerCollector;
pub use share_awards::ShareAwardCollector;
pub use solo_attempts::SoloAttemptCollector;
