use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::multipart;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::FormError;
use crate::model::FormDocument;
use crate::parser;
use crate::settings::Settings;
use crate::submit::SubmissionPayload;

static FORM_URL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/e/([a-zA-Z0-9_-]+)").unwrap());

const FETCH_FAILED: &str = "Unable to fetch the form. Check your form ID and try again.";
const SUBMIT_FAILED: &str =
    "Unable to submit the form. Check your form ID and email settings, and try again.";

/// Result body for a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub error: bool,
    pub message: String,
}

/// Fetches published forms and posts responses back.
pub struct FormsClient {
    http: reqwest::Client,
    base_url: String,
}

impl FormsClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(FormsClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn form_url(&self, form_id: &str, page: &str) -> String {
        format!("{}/forms/d/e/{}/{}", self.base_url, form_id, page)
    }

    /// Raw `viewform` HTML.
    pub async fn fetch_page(&self, form_id: &str) -> Result<String, FormError> {
        let url = self.form_url(form_id, "viewform");
        info!("Fetching form page: {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!("Fetch failed for {}: {}", form_id, e);
            FormError::UpstreamUnavailable(FETCH_FAILED.to_string())
        })?;

        if !response.status().is_success() {
            warn!("Form {} answered {}", form_id, response.status());
            return Err(FormError::UpstreamUnavailable(FETCH_FAILED.to_string()));
        }

        response.text().await.map_err(|e| {
            warn!("Reading body failed for {}: {}", form_id, e);
            FormError::UpstreamUnavailable(FETCH_FAILED.to_string())
        })
    }

    pub async fn get_form(&self, form_id: &str) -> Result<FormDocument, FormError> {
        let html = self.fetch_page(form_id).await?;
        parser::parse_form(&html)
    }

    /// POST the payload as multipart form data to `formResponse`.
    pub async fn submit(
        &self,
        form_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<SubmitReceipt, FormError> {
        let url = self.form_url(form_id, "formResponse");
        let form = payload
            .fields()
            .into_iter()
            .fold(multipart::Form::new(), |form, (name, value)| form.text(name, value));

        info!("Submitting {} fields to {}", payload.fields().len(), url);
        let response = self.http.post(&url).multipart(form).send().await.map_err(|e| {
            warn!("Submit failed for {}: {}", form_id, e);
            FormError::UpstreamUnavailable(SUBMIT_FAILED.to_string())
        })?;

        if !response.status().is_success() {
            warn!("Submit to {} answered {}", form_id, response.status());
            return Err(FormError::UpstreamUnavailable(SUBMIT_FAILED.to_string()));
        }

        Ok(SubmitReceipt {
            error: false,
            message: "Form submitted successfully.".to_string(),
        })
    }
}

/// Accept a bare form id or any URL containing `/e/<id>`.
pub fn form_id_from_input(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Some(caps) = FORM_URL_ID_RE.captures(input) {
        return Some(caps[1].to_string());
    }
    if input.contains('/') {
        return None;
    }
    Some(input.to_string())
}
