use serde::Serialize;

use super::generate::{GenerationRequest, TextGenerator};
use super::normalize::Normalizer;
use super::responder::{resolve, ResponseTable};
use super::translate::Translator;
use crate::config;
use crate::models::{ConversationTurn, MatchKind};

/// Reply to blank input. No collaborator is invoked and history is untouched.
pub const EMPTY_INPUT_PROMPT: &str = "Please enter a valid question.";

/// Reply when generation fails.
pub const GENERATION_FALLBACK: &str =
    "I am still learning. Please check with a doctor for accurate information.";

/// Where the final response text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "match", rename_all = "snake_case")]
pub enum ResponseSource {
    EmptyInput,
    Canned(MatchKind),
    Generated,
    Fallback,
}

/// A collaborator failure that was absorbed instead of surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Degradation {
    /// Untranslated input was used instead.
    TranslationFailed(String),
    /// The fixed fallback reply was used instead.
    GenerationFailed(String),
}

/// Result of one request/response cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub history: Vec<ConversationTurn>,
    pub source: ResponseSource,
    pub degradations: Vec<Degradation>,
}

/// One conversation step.
///
/// Coordinates: translate → normalize → resolve → (generate) → history.
/// Collaborators are long-lived services borrowed for the call; failures
/// degrade to fixed values and are reported in `ChatOutcome::degradations`.
pub struct ChatPipeline<'a, T: Translator + ?Sized, G: TextGenerator + ?Sized> {
    translator: &'a T,
    generator: &'a G,
    normalizer: &'a Normalizer,
    table: &'a ResponseTable,
    max_generation_length: u32,
}

impl<'a, T: Translator + ?Sized, G: TextGenerator + ?Sized> ChatPipeline<'a, T, G> {
    pub fn new(
        translator: &'a T,
        generator: &'a G,
        normalizer: &'a Normalizer,
        table: &'a ResponseTable,
    ) -> Self {
        Self {
            translator,
            generator,
            normalizer,
            table,
            max_generation_length: config::MAX_GENERATION_LENGTH,
        }
    }

    pub fn with_max_generation_length(mut self, max_length: u32) -> Self {
        self.max_generation_length = max_length;
        self
    }

    pub fn handle(&self, user_input: &str, mut history: Vec<ConversationTurn>) -> ChatOutcome {
        // Step 1: Reject blank input
        if user_input.trim().is_empty() {
            return ChatOutcome {
                response: EMPTY_INPUT_PROMPT.to_string(),
                history,
                source: ResponseSource::EmptyInput,
                degradations: Vec::new(),
            };
        }

        let mut degradations = Vec::new();

        // Step 2: Translate to the working language
        let translated = match self.translator.translate(
            user_input,
            config::SOURCE_LANGUAGE,
            config::WORKING_LANGUAGE,
        ) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Translation error, using original text");
                degradations.push(Degradation::TranslationFailed(e.to_string()));
                user_input.to_string()
            }
        };

        // Step 3: Normalize
        let normalized = self.normalizer.normalize(&translated);

        // Step 4: Record the user turn
        history.push(ConversationTurn::user(normalized.clone()));

        // Steps 5-7: Canned answer, else generation
        let (response, source) = match resolve(self.table, &normalized) {
            Some(hit) => {
                tracing::info!(key = hit.key, kind = hit.kind.as_str(), "Canned answer");
                (hit.answer.to_string(), ResponseSource::Canned(hit.kind))
            }
            None => self.generate(&normalized, &mut degradations),
        };

        // Step 8: Record the assistant turn
        history.push(ConversationTurn::assistant(response.clone()));

        ChatOutcome {
            response,
            history,
            source,
            degradations,
        }
    }

    fn generate(
        &self,
        prompt: &str,
        degradations: &mut Vec<Degradation>,
    ) -> (String, ResponseSource) {
        let request = GenerationRequest::new(prompt).with_max_length(self.max_generation_length);
        let result = self
            .generator
            .generate(&request)
            .and_then(|candidates| {
                candidates
                    .into_iter()
                    .next()
                    .ok_or(super::generate::GenerateError::EmptyOutput)
            });

        match result {
            Ok(text) => (text, ResponseSource::Generated),
            Err(e) => {
                tracing::error!(error = %e, "Model generation error, using fallback reply");
                degradations.push(Degradation::GenerationFailed(e.to_string()));
                (GENERATION_FALLBACK.to_string(), ResponseSource::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;
    use crate::pipeline::generate::MockGenerator;
    use crate::pipeline::translate::{FailingTranslator, MockTranslator};

    fn fever_table() -> ResponseTable {
        ResponseTable::from_pairs([("fever", "Stay hydrated and rest.")])
    }

    #[test]
    fn empty_input_returns_prompt_and_leaves_history() {
        let table = fever_table();
        let normalizer = Normalizer::english();
        let generator = MockGenerator::failing();
        let pipeline = ChatPipeline::new(&FailingTranslator, &generator, &normalizer, &table);
        let history = vec![
            ConversationTurn::user("cough"),
            ConversationTurn::assistant("Warm fluids."),
        ];

        let outcome = pipeline.handle("   ", history.clone());
        assert_eq!(outcome.response, EMPTY_INPUT_PROMPT);
        assert_eq!(outcome.history, history);
        assert_eq!(outcome.source, ResponseSource::EmptyInput);
        // Neither collaborator was called, so nothing degraded.
        assert!(outcome.degradations.is_empty());
    }

    #[test]
    fn fever_with_failing_translation_uses_canned_answer() {
        let table = fever_table();
        let normalizer = Normalizer::english();
        let generator = MockGenerator::failing();
        let pipeline = ChatPipeline::new(&FailingTranslator, &generator, &normalizer, &table);

        let outcome = pipeline.handle("fever", Vec::new());
        assert_eq!(outcome.response, "Stay hydrated and rest.");
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.history[0], ConversationTurn::user("fever"));
        assert_eq!(
            outcome.history[1],
            ConversationTurn::assistant("Stay hydrated and rest.")
        );
        assert_eq!(outcome.source, ResponseSource::Canned(MatchKind::Exact));
        assert!(matches!(
            outcome.degradations.as_slice(),
            [Degradation::TranslationFailed(_)]
        ));
    }

    #[test]
    fn translated_text_is_normalized_before_matching() {
        let table = fever_table();
        let normalizer = Normalizer::english();
        let translator = MockTranslator::identity().with_mapping("mujhe bukhar hai", "I have a fever");
        let generator = MockGenerator::failing();
        let pipeline = ChatPipeline::new(&translator, &generator, &normalizer, &table);

        let outcome = pipeline.handle("mujhe bukhar hai", Vec::new());
        assert_eq!(outcome.response, "Stay hydrated and rest.");
        assert_eq!(outcome.history[0].content, "fever");
        assert!(outcome.degradations.is_empty());
    }

    #[test]
    fn no_match_uses_generator() {
        let table = fever_table();
        let normalizer = Normalizer::english();
        let translator = MockTranslator::identity();
        let generator = MockGenerator::new("Ice the knee and keep it raised.");
        let pipeline = ChatPipeline::new(&translator, &generator, &normalizer, &table);

        let outcome = pipeline.handle("Knee sprain", Vec::new());
        assert_eq!(outcome.response, "Ice the knee and keep it raised.");
        assert_eq!(outcome.source, ResponseSource::Generated);
        assert_eq!(outcome.history[0].content, "knee sprain");
        assert_eq!(outcome.history[1].role, MessageRole::Assistant);
    }

    #[test]
    fn generation_failure_degrades_to_fallback() {
        let table = fever_table();
        let normalizer = Normalizer::english();
        let translator = MockTranslator::identity();
        let generator = MockGenerator::failing();
        let pipeline = ChatPipeline::new(&translator, &generator, &normalizer, &table);

        let outcome = pipeline.handle("knee sprain", Vec::new());
        assert_eq!(outcome.response, GENERATION_FALLBACK);
        assert_eq!(outcome.source, ResponseSource::Fallback);
        assert!(matches!(
            outcome.degradations.as_slice(),
            [Degradation::GenerationFailed(_)]
        ));
        assert_eq!(outcome.history.len(), 2);
    }

    #[test]
    fn stopword_only_input_gets_first_canned_answer() {
        let table = ResponseTable::from_pairs([
            ("fever", "Stay hydrated and rest."),
            ("cough", "Warm fluids."),
        ]);
        let normalizer = Normalizer::english();
        let translator = MockTranslator::identity();
        let generator = MockGenerator::new("GENERATED");
        let pipeline = ChatPipeline::new(&translator, &generator, &normalizer, &table);

        let outcome = pipeline.handle("what is it", Vec::new());
        assert_eq!(outcome.history[0].content, "");
        assert_eq!(outcome.response, "Stay hydrated and rest.");
        assert_eq!(outcome.source, ResponseSource::Canned(MatchKind::InputWithinKey));
    }

    #[test]
    fn history_is_appended_not_replaced() {
        let table = fever_table();
        let normalizer = Normalizer::english();
        let translator = MockTranslator::identity();
        let generator = MockGenerator::new("unused");
        let pipeline = ChatPipeline::new(&translator, &generator, &normalizer, &table);

        let first = pipeline.handle("fever", Vec::new());
        let second = pipeline.handle("my fever", first.history);
        assert_eq!(second.history.len(), 4);
        assert_eq!(second.history[2].content, "fever");
    }

    #[test]
    fn works_through_trait_objects() {
        let table = fever_table();
        let normalizer = Normalizer::english();
        let translator: Box<dyn Translator> = Box::new(MockTranslator::identity());
        let generator: Box<dyn TextGenerator> = Box::new(MockGenerator::new("ok"));
        let pipeline = ChatPipeline::new(translator.as_ref(), generator.as_ref(), &normalizer, &table);

        assert_eq!(pipeline.handle("fever", Vec::new()).response, "Stay hydrated and rest.");
    }

    #[test]
    fn outcome_serializes_source_and_degradations() {
        let outcome = ChatOutcome {
            response: "r".into(),
            history: Vec::new(),
            source: ResponseSource::Canned(MatchKind::KeyWithinInput),
            degradations: vec![Degradation::TranslationFailed("down".into())],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["source"]["type"], "canned");
        assert_eq!(json["source"]["match"], "key_within_input");
        assert_eq!(json["degradations"][0]["kind"], "translation_failed");
    }
}
