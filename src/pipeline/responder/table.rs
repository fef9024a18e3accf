use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use super::ResponseTableError;

/// Bundled canned answers, in matching order.
const BUILTIN_RESPONSES: &[(&str, &str)] = &[
    (
        "fever",
        "For a fever, rest and drink plenty of fluids. Paracetamol can lower the temperature. See a doctor if it stays above 39°C (102°F) or lasts more than three days.",
    ),
    (
        "headache",
        "Rest in a quiet, dark room, stay hydrated and consider a mild pain reliever. Seek care for a sudden severe headache or one with stiff neck, confusion or vision changes.",
    ),
    (
        "cold",
        "A common cold usually clears within a week. Rest, warm fluids and saline nasal spray help with symptoms.",
    ),
    (
        "cough",
        "Warm fluids and honey can soothe a cough. See a doctor if it lasts over three weeks, brings up blood or comes with breathlessness.",
    ),
    (
        "sore throat",
        "Gargle with warm salt water, drink warm fluids and rest your voice. See a doctor if swallowing becomes difficult or a high fever develops.",
    ),
    (
        "stomach ache",
        "Eat light, bland food and sip water. Seek care for severe or persistent pain, vomiting blood or pain in the lower right abdomen.",
    ),
    (
        "diarrhea",
        "Replace lost fluids with oral rehydration solution and eat bland food. See a doctor if it lasts more than two days or you notice blood.",
    ),
    (
        "vomiting",
        "Take small sips of water or oral rehydration solution. Seek care if you cannot keep fluids down for a day or notice signs of dehydration.",
    ),
    (
        "high blood pressure",
        "Reduce salt, stay active, limit alcohol and take prescribed medication regularly. Check your blood pressure often and keep your follow-up appointments.",
    ),
    (
        "diabetes",
        "Monitor your blood sugar, follow a balanced diet, exercise regularly and take your medication as prescribed. Regular check-ups help prevent complications.",
    ),
    (
        "chest pain",
        "Chest pain can be serious. If it is severe, spreads to the arm or jaw, or comes with sweating or breathlessness, call emergency services immediately.",
    ),
    (
        "allergy",
        "Avoid known triggers. Antihistamines can relieve mild symptoms. Swelling of the face or difficulty breathing needs emergency care.",
    ),
    (
        "back pain",
        "Stay gently active, apply heat or cold and keep good posture. See a doctor if the pain follows an injury or comes with numbness or weakness.",
    ),
    (
        "insomnia",
        "Keep a regular sleep schedule, avoid screens and caffeine before bed and keep your bedroom dark and quiet.",
    ),
    (
        "dehydration",
        "Drink water or oral rehydration solution in small, frequent amounts. Dizziness, confusion or very little urine need medical attention.",
    ),
    (
        "minor cut",
        "Clean the wound with water, apply gentle pressure to stop bleeding and cover it with a clean dressing. Deep or dirty wounds need medical care.",
    ),
    (
        "burn",
        "Cool the burn under running water for 20 minutes and cover it loosely. Do not apply ice or butter. Large or deep burns need urgent care.",
    ),
    (
        "anxiety",
        "Slow breathing, regular exercise and talking to someone you trust can help. If anxiety affects daily life, consult a healthcare professional.",
    ),
];

/// Ordered mapping from canonical question to canned answer.
///
/// Iteration order is insertion order and is part of the matching contract:
/// the first qualifying key wins the fuzzy scan.
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    entries: Vec<(String, String)>,
    /// Verbatim key → entry position.
    by_key: HashMap<String, usize>,
    /// Lower-cased key → position of the first entry with that form.
    by_lower: HashMap<String, usize>,
}

impl ResponseTable {
    /// Build from ordered pairs. A repeated key replaces the earlier answer
    /// but keeps the earlier position.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut table = Self::default();
        for (key, answer) in pairs {
            table.insert(key.into(), answer.into());
        }
        table
    }

    /// The bundled medical answers.
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_RESPONSES.iter().copied())
    }

    /// Parse a JSON object of `question: answer` strings, keeping key order.
    pub fn from_json_str(json: &str) -> Result<Self, ResponseTableError> {
        let object: Map<String, Value> = serde_json::from_str(json)?;
        let mut table = Self::default();
        for (key, value) in object {
            let answer = match value {
                Value::String(s) => s,
                other => {
                    return Err(ResponseTableError::Parse(serde::de::Error::custom(format!(
                        "answer for {key:?} is not a string: {other}"
                    ))))
                }
            };
            table.insert(key, answer);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, ResponseTableError> {
        let data = std::fs::read_to_string(path).map_err(|source| ResponseTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&data)?;
        tracing::info!(path = %path.display(), entries = table.len(), "Response table loaded");
        Ok(table)
    }

    fn insert(&mut self, key: String, answer: String) {
        if let Some(&idx) = self.by_key.get(&key) {
            self.entries[idx].1 = answer;
            return;
        }
        let idx = self.entries.len();
        self.by_lower.entry(key.to_lowercase()).or_insert(idx);
        self.by_key.insert(key.clone(), idx);
        self.entries.push((key, answer));
    }

    /// Entry whose key equals `input` verbatim, else whose lower-cased key
    /// equals the lower-cased input.
    pub fn get_exact(&self, input: &str) -> Option<(&str, &str)> {
        let idx = self
            .by_key
            .get(input)
            .or_else(|| self.by_lower.get(&input.to_lowercase()))?;
        let (key, answer) = &self.entries[*idx];
        Some((key.as_str(), answer.as_str()))
    }

    /// Entries in matching order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
