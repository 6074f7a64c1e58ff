//! Positional layout of `FB_PUBLIC_LOAD_DATA_`.
//!
//! The upstream array has no field names. Every index the decoder reads
//! lives here so a format revision touches this file only.

use serde_json::Value;

use crate::model::QuestionType;

/// `top[..]`
pub const TOP_FORM: usize = 1;
pub const TOP_TITLE: usize = 3;

/// `top[TOP_FORM][..]`
pub const FORM_DESCRIPTION: usize = 0;
pub const FORM_FIELDS: usize = 1;
pub const FORM_SETTINGS: usize = 10;
/// `top[TOP_FORM][FORM_SETTINGS][..]`
pub const SETTINGS_EMAIL: usize = 6;

/// `field[..]`
pub const FIELD_ID: usize = 0;
pub const FIELD_TITLE: usize = 1;
pub const FIELD_DESCRIPTION: usize = 2;
pub const FIELD_TYPE: usize = 3;
pub const FIELD_ANSWERS: usize = 4;

/// `field[FIELD_ANSWERS][0][..]`
pub const ANSWER_ENTRY_ID: usize = 0;
pub const ANSWER_OPTIONS: usize = 1;
pub const ANSWER_REQUIRED: usize = 2;

/// `option[..]`
pub const OPTION_TEXT: usize = 0;
pub const OPTION_NAVIGATION: usize = 2;

/// Navigation value meaning "submit the form now".
pub const NAVIGATE_SUBMIT: i64 = -1;

/// Shared by file upload questions and page breaks.
pub const CODE_FILE_UPLOAD_OR_SECTION: i64 = 8;

/// Follow a path of array indices, yielding `None` on any missing step.
pub fn at<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, &i| v.as_array()?.get(i))
}

/// Non-null value at `path`.
pub fn present<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    at(value, path).filter(|v| !v.is_null())
}

pub fn str_at(value: &Value, path: &[usize]) -> Option<String> {
    present(value, path).and_then(|v| v.as_str()).map(str::to_string)
}

/// Ids arrive as numbers or strings depending on the page vintage.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// What a field's type code means once the answer config is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Question(QuestionType),
    SectionHeader,
    Unsupported,
}

/// Resolve a type code. Code 8 is a page break unless the field has
/// something to answer.
pub fn field_kind(code: Option<i64>, has_answers: bool) -> FieldKind {
    let Some(code) = code else {
        return FieldKind::Unsupported;
    };
    if code == CODE_FILE_UPLOAD_OR_SECTION && !has_answers {
        return FieldKind::SectionHeader;
    }
    let kind = match code {
        0 => QuestionType::Text,
        1 => QuestionType::ParagraphText,
        2 => QuestionType::MultipleChoice,
        3 => QuestionType::Dropdown,
        4 => QuestionType::Checkboxes,
        5 => QuestionType::Scale,
        7 => QuestionType::Grid,
        CODE_FILE_UPLOAD_OR_SECTION => QuestionType::FileUpload,
        9 => QuestionType::Date,
        10 => QuestionType::Time,
        _ => return FieldKind::Unsupported,
    };
    FieldKind::Question(kind)
}
