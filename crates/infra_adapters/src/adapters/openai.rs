//! OpenAI-compatible chat completion adapter
//!
//! Works with any server exposing `POST /chat/completions` with image_url
//! content parts (vLLM, llama.cpp server, LM Studio, hosted LLaVA).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_claims::{AssessmentRequest, VisionModelPort};

use super::HttpTransport;
use crate::config::ModelClientConfig;

const SERVICE: &str = "openai-compatible";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Vision model reached through an OpenAI-compatible API
pub struct OpenAiVisionAdapter {
    transport: HttpTransport,
}

impl OpenAiVisionAdapter {
    pub fn new(config: ModelClientConfig) -> Result<Self, PortError> {
        Ok(Self {
            transport: HttpTransport::new(config, SERVICE)?,
        })
    }

    fn request_body<'a>(&'a self, request: &'a AssessmentRequest) -> ChatCompletionRequest<'a> {
        let config = self.transport.config();
        ChatCompletionRequest {
            model: &config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: &request.prompt,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{};base64,{}", request.mime_type, request.image_base64),
                        },
                    },
                ],
            }],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Pulls the first choice's message text out of a response body
fn parse_chat_completion(body: &str) -> Result<String, PortError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| PortError::transformation(format!("invalid chat completion response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| PortError::transformation("chat completion response has no choices"))
}

impl DomainPort for OpenAiVisionAdapter {}

#[async_trait]
impl VisionModelPort for OpenAiVisionAdapter {
    fn provider(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.transport.config().model
    }

    async fn complete(&self, request: &AssessmentRequest) -> Result<String, PortError> {
        let body = self.request_body(request);
        debug!(
            image = %request.image,
            model = %body.model,
            payload_bytes = request.image_base64.len(),
            "Sending chat completion request"
        );
        let text = self.transport.post_json("chat/completions", &body).await?;
        parse_chat_completion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelProvider;
    use domain_claims::ImageReference;

    fn request() -> AssessmentRequest {
        AssessmentRequest {
            image: ImageReference {
                index: 1,
                file_name: "rear.png".to_string(),
            },
            mime_type: "image/png",
            image_base64: "iVBORw0KGgo=".to_string(),
            prompt: "Describe the damage".to_string(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let config = ModelClientConfig::new(ModelProvider::OpenAiCompatible, "http://host/v1", "llava-v1.6")
            .max_tokens(1000)
            .temperature(0.2);
        let adapter = OpenAiVisionAdapter::new(config).unwrap();
        let request = request();
        let body = serde_json::to_value(adapter.request_body(&request)).unwrap();

        assert_eq!(body["model"], "llava-v1.6");
        assert_eq!(body["max_tokens"], 1000);
        let content = &body["messages"][0]["content"];
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Describe the damage");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"DAMAGE: dent"}}]}"#;
        assert_eq!(parse_chat_completion(body).unwrap(), "DAMAGE: dent");
    }

    #[test]
    fn test_parse_null_content_is_empty_text() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert_eq!(parse_chat_completion(body).unwrap(), "");
    }

    #[test]
    fn test_parse_rejects_malformed_bodies() {
        assert!(matches!(
            parse_chat_completion(r#"{"choices":[]}"#),
            Err(PortError::Transformation { .. })
        ));
        assert!(matches!(
            parse_chat_completion("<html>bad gateway</html>"),
            Err(PortError::Transformation { .. })
        ));
    }
}
