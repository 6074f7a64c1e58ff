pub mod decode;
pub mod extract;
pub mod schema;

use serde_json::Value;

use crate::error::FormError;
use crate::model::FormDocument;

/// Page → literal → JSON → document.
pub fn parse_form(html: &str) -> Result<FormDocument, FormError> {
    let literal = extract::extract(html)?;
    let data = parse_literal(&literal)?;
    decode::decode(&data)
}

pub fn parse_literal(literal: &str) -> Result<Value, FormError> {
    serde_json::from_str(literal).map_err(|e| {
        tracing::debug!("literal is not JSON: {}", e);
        FormError::MalformedLiteral("The script data could not be parsed as JSON".to_string())
    })
}
