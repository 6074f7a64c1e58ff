use serde_json::Value;
use tracing::warn;

use super::schema::{self, FieldKind};
use crate::error::FormError;
use crate::model::{EmailCollection, FormDocument, FormOption, NextSection, Question, Section};

/// Turn the parsed `FB_PUBLIC_LOAD_DATA_` array into a form document.
///
/// Missing or short arrays at any depth fall back to defaults; only a
/// top-level value that is not an array is rejected.
pub fn decode(data: &Value) -> Result<FormDocument, FormError> {
    if !data.is_array() {
        return Err(FormError::MalformedLiteral(
            "The script data is not a JSON array".to_string(),
        ));
    }

    let title = schema::str_at(data, &[schema::TOP_TITLE]).unwrap_or_default();
    let description = schema::str_at(data, &[schema::TOP_FORM, schema::FORM_DESCRIPTION]);
    let email_code = schema::present(
        data,
        &[schema::TOP_FORM, schema::FORM_SETTINGS, schema::SETTINGS_EMAIL],
    )
    .and_then(Value::as_i64);

    let fields: &[Value] = schema::present(data, &[schema::TOP_FORM, schema::FORM_FIELDS])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let (sections, questions) = assign_sections(fields);

    Ok(FormDocument {
        title,
        description,
        email_collection_policy: EmailCollection::from_code(email_code),
        sections,
        questions,
    })
}

enum Field {
    Header { id: String, title: Option<String> },
    Question(Question),
    Skip,
}

/// Two passes over the flat field list: register every page break, then
/// attribute each question to the most recent one.
fn assign_sections(fields: &[Value]) -> (Vec<Section>, Vec<Question>) {
    let decoded: Vec<Field> = fields.iter().map(decode_field).collect();

    let mut sections = vec![Section::untitled()];
    for field in &decoded {
        if let Field::Header { id, title } = field {
            sections.push(Section {
                id: Some(id.clone()),
                title: title.clone(),
                questions: Vec::new(),
            });
        }
    }

    let mut questions = Vec::new();
    let mut current = 0;
    for field in decoded {
        match field {
            Field::Header { .. } => current += 1,
            Field::Question(q) => {
                sections[current].questions.push(q.clone());
                questions.push(q);
            }
            Field::Skip => {}
        }
    }

    sections.retain(|s| !s.questions.is_empty());
    if sections.is_empty() {
        sections.push(Section {
            questions: questions.clone(),
            ..Section::untitled()
        });
    }

    (sections, questions)
}

fn decode_field(field: &Value) -> Field {
    let answers = schema::present(field, &[schema::FIELD_ANSWERS])
        .and_then(Value::as_array)
        .filter(|a| !a.is_empty());
    let code = schema::present(field, &[schema::FIELD_TYPE]).and_then(Value::as_i64);

    match schema::field_kind(code, answers.is_some()) {
        FieldKind::SectionHeader => Field::Header {
            id: schema::present(field, &[schema::FIELD_ID])
                .and_then(schema::id_string)
                .unwrap_or_default(),
            title: schema::str_at(field, &[schema::FIELD_TITLE]),
        },
        FieldKind::Question(kind) => match answers.and_then(|a| a.first()) {
            Some(answer) => Field::Question(Question {
                title: schema::str_at(field, &[schema::FIELD_TITLE]).unwrap_or_default(),
                description: schema::str_at(field, &[schema::FIELD_DESCRIPTION]),
                kind,
                options: decode_options(answer),
                required: is_required(answer),
                id: schema::present(answer, &[schema::ANSWER_ENTRY_ID])
                    .and_then(schema::id_string)
                    .unwrap_or_default(),
            }),
            None => Field::Skip,
        },
        FieldKind::Unsupported => {
            if answers.is_some() {
                warn!(?code, "skipping answerable field with unknown type code");
            }
            Field::Skip
        }
    }
}

fn is_required(answer: &Value) -> bool {
    match schema::present(answer, &[schema::ANSWER_REQUIRED]) {
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

fn decode_options(answer: &Value) -> Vec<FormOption> {
    let raw: &[Value] = schema::present(answer, &[schema::ANSWER_OPTIONS])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let branching = raw
        .iter()
        .any(|opt| schema::present(opt, &[schema::OPTION_NAVIGATION]).is_some());

    raw.iter()
        .filter_map(|opt| {
            let value = schema::present(opt, &[schema::OPTION_TEXT]).and_then(option_text)?;
            if !branching {
                return Some(FormOption::Plain(value));
            }
            let go_to_section = schema::present(opt, &[schema::OPTION_NAVIGATION]).map(next_section);
            Some(FormOption::Branching { value, go_to_section })
        })
        .collect()
}

/// Choice label; scale and grid choices sometimes arrive as numbers.
fn option_text(v: &Value) -> Option<String> {
    let text = match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn next_section(target: &Value) -> NextSection {
    match target {
        Value::Number(n) if n.as_i64() == Some(schema::NAVIGATE_SUBMIT) => NextSection::Submit,
        Value::String(s) => NextSection::Section(s.clone()),
        other => NextSection::Section(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;
    use serde_json::json;

    fn form(fields: Value) -> Value {
        json!([null, ["Form description", fields, null, null, null, null, null, null, null, null, [null, null, null, null, null, null, 3]], null, "Form title"])
    }

    fn flatten(doc: &FormDocument) -> Vec<Question> {
        doc.sections.iter().flat_map(|s| s.questions.clone()).collect()
    }

    #[test]
    fn top_level_metadata() {
        let doc = decode(&form(json!([]))).unwrap();
        assert_eq!(doc.title, "Form title");
        assert_eq!(doc.description.as_deref(), Some("Form description"));
        assert_eq!(doc.email_collection_policy, EmailCollection::Input);
    }

    #[test]
    fn missing_everything_defaults() {
        let doc = decode(&json!([])).unwrap();
        assert_eq!(doc.title, "");
        assert_eq!(doc.description, None);
        assert_eq!(doc.email_collection_policy, EmailCollection::None);
        assert!(doc.questions.is_empty());
        assert_eq!(doc.sections, vec![Section::untitled()]);
    }

    #[test]
    fn non_array_rejected() {
        let err = decode(&json!({ "a": 1 })).unwrap_err();
        assert!(matches!(err, FormError::MalformedLiteral(_)));
    }

    #[test]
    fn text_question() {
        let doc = decode(&form(json!([
            [111, "Name", "Your name", 0, [[1001, null, 1]]]
        ])))
        .unwrap();
        let q = &doc.questions[0];
        assert_eq!(q.title, "Name");
        assert_eq!(q.description.as_deref(), Some("Your name"));
        assert_eq!(q.kind, QuestionType::Text);
        assert!(q.options.is_empty());
        assert!(q.required);
        assert_eq!(q.id, "1001");
    }

    #[test]
    fn required_only_for_literal_one() {
        let doc = decode(&form(json!([
            [1, "a", null, 0, [[10, null, 0]]],
            [2, "b", null, 0, [[11, null, "1"]]],
            [3, "c", null, 0, [[12]]],
            [4, "d", null, 0, [[13, null, 2]]],
        ])))
        .unwrap();
        assert!(doc.questions.iter().all(|q| !q.required));
    }

    #[test]
    fn fields_without_answers_are_not_questions() {
        let doc = decode(&form(json!([
            [1, "Just text", null, 6],
            [2, "Image", null, 11, null],
            [3, "Empty", null, 0, []],
            [4],
            "garbage",
            [5, "Real", null, 1, [[20]]],
        ])))
        .unwrap();
        assert_eq!(doc.questions.len(), 1);
        assert_eq!(doc.questions[0].title, "Real");
        assert_eq!(doc.questions[0].kind, QuestionType::ParagraphText);
    }

    #[test]
    fn missing_entry_id_is_empty() {
        let doc = decode(&form(json!([[1, "No id", null, 0, [[null]]]]))).unwrap();
        assert_eq!(doc.questions[0].id, "");
    }

    #[test]
    fn plain_options_in_order() {
        let doc = decode(&form(json!([
            [1, "Pick", null, 2, [[30, [["Red"], ["Green"], ["Blue"]], 0]]]
        ])))
        .unwrap();
        let values: Vec<_> = doc.questions[0].options.clone();
        assert_eq!(
            values,
            vec![
                FormOption::Plain("Red".into()),
                FormOption::Plain("Green".into()),
                FormOption::Plain("Blue".into()),
            ]
        );
    }

    #[test]
    fn empty_option_text_dropped() {
        let doc = decode(&form(json!([
            [1, "Pick", null, 4, [[30, [["A"], [""], [null], ["B"]]]]]
        ])))
        .unwrap();
        let values: Vec<_> = doc.questions[0].options.iter().map(|o| o.value().to_string()).collect();
        assert_eq!(values, vec!["A", "B"]);
    }

    #[test]
    fn numeric_scale_options() {
        let doc = decode(&form(json!([
            [1, "Rate", null, 5, [[40, [["1"], [2], ["3"]]]]]
        ])))
        .unwrap();
        let values: Vec<_> = doc.questions[0].options.iter().map(|o| o.value().to_string()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn branching_options() {
        let doc = decode(&form(json!([
            [1, "Go", null, 2, [[50, [["Stop", null, -1], ["Next", null, null]]]]]
        ])))
        .unwrap();
        assert_eq!(
            doc.questions[0].options,
            vec![
                FormOption::Branching { value: "Stop".into(), go_to_section: Some(NextSection::Submit) },
                FormOption::Branching { value: "Next".into(), go_to_section: None },
            ]
        );
    }

    #[test]
    fn one_branching_option_makes_all_records() {
        let doc = decode(&form(json!([
            [1, "Go", null, 3, [[50, [["A"], ["B", null, 777], ["C", null, 0]]]]]
        ])))
        .unwrap();
        assert_eq!(
            doc.questions[0].options,
            vec![
                FormOption::Branching { value: "A".into(), go_to_section: None },
                FormOption::Branching {
                    value: "B".into(),
                    go_to_section: Some(NextSection::Section("777".into()))
                },
                FormOption::Branching {
                    value: "C".into(),
                    go_to_section: Some(NextSection::Section("0".into()))
                },
            ]
        );
    }

    #[test]
    fn code_eight_header_or_upload() {
        let doc = decode(&form(json!([
            [900, "Page two", null, 8],
            [901, "Upload CV", null, 8, [[60, null, 1]]],
            [902, "Page three", null, 8, null],
            [903, "Page four", null, 8, []],
            [904, "Notes", null, 1, [[61]]],
        ])))
        .unwrap();
        assert_eq!(doc.questions.len(), 2);
        assert_eq!(doc.questions[0].kind, QuestionType::FileUpload);
        assert_eq!(doc.questions[0].id, "60");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].id.as_deref(), Some("900"));
        assert_eq!(doc.sections[0].questions[0].title, "Upload CV");
        assert_eq!(doc.sections[1].id.as_deref(), Some("903"));
        assert_eq!(doc.sections[1].title.as_deref(), Some("Page four"));
        assert_eq!(doc.sections[1].questions[0].title, "Notes");
    }

    #[test]
    fn default_section_holds_leading_questions() {
        let doc = decode(&form(json!([
            [1, "Intro q", null, 0, [[70]]],
            [2, "Second page", "More", 8],
            [3, "Later q", null, 0, [[71]]],
        ])))
        .unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].id, None);
        assert_eq!(doc.sections[0].title, None);
        assert_eq!(doc.sections[0].questions[0].title, "Intro q");
        assert_eq!(doc.sections[1].id.as_deref(), Some("2"));
        assert_eq!(doc.sections[1].title.as_deref(), Some("Second page"));
        assert_eq!(flatten(&doc), doc.questions);
    }

    #[test]
    fn empty_sections_dropped() {
        let doc = decode(&form(json!([
            [10, "Empty page", null, 8],
            [11, "Full page", null, 8],
            [1, "q", null, 0, [[80]]],
            [12, "Trailing empty", null, 8],
        ])))
        .unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].id.as_deref(), Some("11"));
        assert!(doc.sections.iter().all(|s| s.id.as_deref() != Some("10")));
        assert_eq!(flatten(&doc), doc.questions);
    }

    #[test]
    fn only_headers_yields_one_empty_section() {
        let doc = decode(&form(json!([[10, "A", null, 8], [11, "B", null, 8]]))).unwrap();
        assert_eq!(doc.sections, vec![Section::untitled()]);
        assert!(doc.questions.is_empty());
    }

    #[test]
    fn unknown_type_code_skipped() {
        let doc = decode(&form(json!([
            [1, "Future widget", null, 42, [[90]]],
            [2, "Known", null, 9, [[91]]],
        ])))
        .unwrap();
        assert_eq!(doc.questions.len(), 1);
        assert_eq!(doc.questions[0].kind, QuestionType::Date);
    }

    #[test]
    fn null_navigation_slots_stay_plain() {
        let doc = decode(&form(json!([
            [1, "Attend?", null, 2, [[30, [["Yes", null, null, null, 0], ["No", null, null, null, 0]], 1]]]
        ])))
        .unwrap();
        assert_eq!(
            doc.questions[0].options,
            vec![FormOption::Plain("Yes".into()), FormOption::Plain("No".into())]
        );
    }

    #[test]
    fn full_width_options_with_one_target() {
        let doc = decode(&form(json!([
            [1, "Go", null, 2, [[31, [["Stop", null, -1, null, 0], ["Next", null, null, null, 0]]]]]
        ])))
        .unwrap();
        assert_eq!(
            doc.questions[0].options,
            vec![
                FormOption::Branching { value: "Stop".into(), go_to_section: Some(NextSection::Submit) },
                FormOption::Branching { value: "Next".into(), go_to_section: None },
            ]
        );
    }

    #[test]
    fn idempotent() {
        let data = form(json!([
            [1, "a", null, 2, [[1, [["x", null, -1], ["y", null, 5]], 1]]],
            [2, "s", null, 8],
            [3, "b", null, 10, [[2]]],
        ]));
        assert_eq!(decode(&data).unwrap(), decode(&data).unwrap());
    }
}
