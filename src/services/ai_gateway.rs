use std::time::Duration;

use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::domain::{AiResponse, KanbanError, TaskDraft};

const ENHANCE_SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that improves Jira tickets. Be concise but thorough.";
const BULK_SYSTEM_INSTRUCTION: &str = "You are a project manager converting meeting notes into Jira tickets. Split distinct items into separate tasks.";

pub trait AiGateway: Send + Sync {
    fn enhance_task<'a>(
        &'a self,
        title: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, Result<AiResponse, KanbanError>>;

    fn generate_tasks<'a>(
        &'a self,
        raw_text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TaskDraft>, KanbanError>>;
}

pub fn enhance_prompt(title: &str, description: &str) -> String {
    format!(
        "You are an expert Agile Product Manager. Analyze the following task draft and enhance it.\n\n\
         Current Title: \"{}\"\n\
         Current Description: \"{}\"\n\n\
         Provide a more professional title, a structured description (User Story format), \
         acceptance criteria, relevant tags, and a story point estimation.",
        title, description
    )
}

pub fn bulk_prompt(raw_text: &str) -> String {
    format!(
        "Analyze the following raw text/notes and break them down into individual actionable tasks.\n\
         For each task, provide a title, a brief description, an estimated priority, relevant tags, \
         and story points (Fibonacci).\n\n\
         Raw Input:\n\"{}\"",
        raw_text
    )
}

/// JSON schema sent alongside a prompt, derived from the Rust response type.
pub fn response_schema<T: JsonSchema>() -> Result<Value, KanbanError> {
    let mut schema = serde_json::to_value(schemars::schema_for!(T))?;
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    Ok(schema)
}

/// Concatenated text parts of the first candidate of a `generateContent` reply.
pub fn candidate_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Clone, Debug)]
pub struct GeminiGateway {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiGateway {
    pub fn new(
        http_client: reqwest::Client,
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            api_key,
            base_url,
            model,
            timeout,
        }
    }

    async fn generate_content<T: DeserializeOwned>(
        &self,
        operation: &str,
        prompt: String,
        system_instruction: &str,
        schema: Value,
    ) -> Result<T, KanbanError> {
        if self.api_key.trim().is_empty() {
            return Err(KanbanError::Gateway(
                "AI gateway is not configured (missing GEMINI_API_KEY)".into(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseJsonSchema": schema,
            },
        });

        tracing::debug!(operation, model = self.model.as_str(), "Calling AI gateway");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| KanbanError::Gateway(format!("AI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(operation, %status, detail = detail.as_str(), "AI gateway returned non-success status");
            return Err(KanbanError::Gateway(format!(
                "AI service returned status {}",
                status
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| KanbanError::Gateway(format!("Failed to read AI response: {}", e)))?;

        let text = candidate_text(&payload)
            .ok_or_else(|| KanbanError::Gateway("No response from AI".into()))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(operation, error = %e, "AI response did not match the expected schema");
            KanbanError::Parse(format!("AI response is not valid JSON of the expected shape: {}", e))
        })
    }
}

impl AiGateway for GeminiGateway {
    fn enhance_task<'a>(
        &'a self,
        title: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, Result<AiResponse, KanbanError>> {
        Box::pin(async move {
            let response: AiResponse = self
                .generate_content(
                    "enhance_task",
                    enhance_prompt(title, description),
                    ENHANCE_SYSTEM_INSTRUCTION,
                    response_schema::<AiResponse>()?,
                )
                .await?;
            response.validate()?;
            Ok(response)
        })
    }

    fn generate_tasks<'a>(
        &'a self,
        raw_text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TaskDraft>, KanbanError>> {
        Box::pin(async move {
            let drafts: Vec<TaskDraft> = self
                .generate_content(
                    "generate_tasks",
                    bulk_prompt(raw_text),
                    BULK_SYSTEM_INSTRUCTION,
                    response_schema::<Vec<TaskDraft>>()?,
                )
                .await?;

            if drafts.is_empty() {
                return Err(KanbanError::Parse("AI returned no tasks".into()));
            }
            for draft in &drafts {
                draft.validate()?;
            }
            tracing::info!(count = drafts.len(), "AI generated task drafts");
            Ok(drafts)
        })
    }
}
