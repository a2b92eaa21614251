//! Builtin image-generation capability.

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::tool::Tool;
use super::types::ToolParameters;
use crate::error::{Result, RoundtableError};
use crate::llm::http::shared_client;

/// Default image-generation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://image.pollinations.ai";

/// Build the image URL for a free-text prompt.
///
/// The prompt is percent-encoded into the path, so spaces and non-ASCII
/// characters survive losslessly.
pub fn image_url(endpoint: &str, prompt: &str) -> String {
    format!("{endpoint}/prompt/{}", urlencoding::encode(prompt))
}

/// AI painting tool: turns a text description into an image URL.
///
/// Issues a GET against the generation endpoint to trigger rendering, then
/// returns `{"image_url": <url>}`. The endpoint is injectable for tests.
pub struct ImageGenTool {
    endpoint: String,
    parameters: ToolParameters,
}

impl Default for ImageGenTool {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl ImageGenTool {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            parameters: ToolParameters::object()
                .string(
                    "prompt",
                    "Detailed description of the desired image content, in English",
                    true,
                )
                .build(),
        }
    }
}

#[async_trait]
impl Tool for ImageGenTool {
    fn name(&self) -> &str {
        "image_gen"
    }

    fn description(&self) -> &str {
        "AI painting (image generation) service, input text description, \
         and return the image URL drawn based on text information."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<serde_json::Value> {
        // Argument extraction fails before any request goes out.
        let prompt = args.get_str("prompt")?;
        let url = image_url(&self.endpoint, prompt);

        let resp = shared_client().get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RoundtableError::tool(
                self.name(),
                format!("image endpoint returned status {status}"),
            ));
        }

        Ok(serde_json::json!({ "image_url": url }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_percent_encodes_spaces() {
        let url = image_url(DEFAULT_ENDPOINT, "a red fox");

        assert_eq!(url, "https://image.pollinations.ai/prompt/a%20red%20fox");
    }

    #[test]
    fn image_url_preserves_non_ascii_losslessly() {
        let url = image_url(DEFAULT_ENDPOINT, "一只红色的狐狸");

        // UTF-8 bytes of the prompt, percent-encoded; decoding round-trips.
        assert!(url.starts_with("https://image.pollinations.ai/prompt/%E4%B8%80"));
        let encoded = url.rsplit('/').next().unwrap();
        assert_eq!(urlencoding::decode(encoded).unwrap(), "一只红色的狐狸");
    }

    #[test]
    fn schema_marks_prompt_required() {
        let tool = ImageGenTool::default();

        assert_eq!(tool.parameters().required_fields(), vec!["prompt"]);
    }

    #[tokio::test]
    async fn missing_prompt_fails_before_any_request() {
        let tool = ImageGenTool::new("http://127.0.0.1:1"); // unroutable on purpose

        let result = tool
            .execute(&ToolArguments::new(serde_json::json!({})))
            .await;

        assert!(matches!(result, Err(RoundtableError::InvalidArgument(_))));
    }
}
