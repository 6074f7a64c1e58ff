use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Reserved key sent as-is instead of under `entry.`.
pub const EMAIL_KEY: &str = "emailAddress";

/// One answer: a single value, or several for checkbox-style questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

/// Answers keyed by entry id (plus the optional `emailAddress`).
pub type Answers = BTreeMap<String, AnswerValue>;

/// Fields for the `formResponse` endpoint, in send order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub email_address: Option<String>,
    pub entries: Vec<(String, String)>,
}

impl SubmissionPayload {
    /// Flat `(name, value)` pairs, email first. Multi-valued answers repeat
    /// the same name.
    pub fn fields(&self) -> Vec<(String, String)> {
        self.email_address
            .iter()
            .map(|email| (EMAIL_KEY.to_string(), email.clone()))
            .chain(self.entries.iter().cloned())
            .collect()
    }
}

pub fn encode(answers: &Answers) -> Result<SubmissionPayload, FormError> {
    let email_address = match answers.get(EMAIL_KEY) {
        Some(AnswerValue::Multiple(_)) => {
            return Err(FormError::InvalidAnswerShape(
                "Email address cannot be an array".to_string(),
            ));
        }
        Some(AnswerValue::Single(email)) if !email.is_empty() => Some(email.clone()),
        _ => None,
    };

    let mut keyed: Vec<_> = answers.iter().filter(|(k, _)| k.as_str() != EMAIL_KEY).collect();
    keyed.sort_by(|(a, _), (b, _)| entry_order(a, b));

    let mut entries = Vec::new();
    for (key, value) in keyed {
        let name = format!("entry.{}", key);
        match value {
            AnswerValue::Single(v) => entries.push((name, v.clone())),
            AnswerValue::Multiple(vs) => {
                entries.extend(vs.iter().map(|v| (name.clone(), v.clone())));
            }
        }
    }

    Ok(SubmissionPayload {
        email_address,
        entries,
    })
}

/// Numeric entry ids in numeric order, then any other keys lexically.
fn entry_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
