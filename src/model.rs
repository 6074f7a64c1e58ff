use serde::{Deserialize, Serialize};

/// A decoded form, in the shape served to clients and cached by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    pub title: String,
    pub description: Option<String>,
    pub email_collection_policy: EmailCollection,
    pub sections: Vec<Section>,
    /// Every question across `sections`, in document order.
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailCollection {
    #[default]
    None,
    Verified,
    Input,
}

impl EmailCollection {
    /// Upstream codes: 1 none, 2 verified, 3 respondent input.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(2) => EmailCollection::Verified,
            Some(3) => EmailCollection::Input,
            _ => EmailCollection::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// `None` only for the implicit section before the first page break.
    pub id: Option<String>,
    pub title: Option<String>,
    pub questions: Vec<Question>,
}

impl Section {
    pub fn untitled() -> Self {
        Section {
            id: None,
            title: None,
            questions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<FormOption>,
    pub required: bool,
    /// Entry id used as `entry.<id>` on submission.
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Text,
    ParagraphText,
    MultipleChoice,
    Checkboxes,
    Dropdown,
    Date,
    Time,
    Scale,
    Grid,
    FileUpload,
}

/// A choice. Plain when no choice of the question branches, otherwise
/// every choice carries its navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormOption {
    Plain(String),
    Branching {
        value: String,
        #[serde(rename = "goToSection")]
        go_to_section: Option<NextSection>,
    },
}

#[cfg(test)]
impl FormOption {
    pub fn value(&self) -> &str {
        match self {
            FormOption::Plain(v) => v,
            FormOption::Branching { value, .. } => value,
        }
    }
}

/// Where a branching choice leads. A missing target (`None` around this)
/// means "continue with the next section".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NextSection {
    Submit,
    Section(String),
}

const SUBMIT: &str = "SUBMIT";

impl From<NextSection> for String {
    fn from(next: NextSection) -> String {
        match next {
            NextSection::Submit => SUBMIT.to_string(),
            NextSection::Section(id) => id,
        }
    }
}

impl From<String> for NextSection {
    fn from(s: String) -> Self {
        if s == SUBMIT {
            NextSection::Submit
        } else {
            NextSection::Section(s)
        }
    }
}
