use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerResult {
    Correct,
    Incorrect,
}

impl AnswerResult {
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerResult::Correct)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerResult::Correct => "Correct",
            AnswerResult::Incorrect => "Incorrect",
        }
    }
}

/// Outcome of one answered question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Result")]
    pub result: AnswerResult,
    /// Category of the answered word, when the dataset has one
    #[serde(rename = "Day", skip_serializing_if = "Option::is_none", default)]
    pub day: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization_uses_column_names() {
        let record = AnswerRecord {
            word: "Run".to_string(),
            result: AnswerResult::Incorrect,
            day: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Word":"Run","Result":"Incorrect"}"#);
    }
}
