//! Ollama generate adapter
//!
//! Talks to a local Ollama server through `POST /api/generate`. Requests ask
//! for a single non-streamed answer, but some servers still reply with
//! newline-delimited chunks, so the body parser accepts both.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_claims::{AssessmentRequest, VisionModelPort};

use super::HttpTransport;
use crate::config::ModelClientConfig;

const SERVICE: &str = "ollama";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: [&'a str; 1],
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Vision model served by Ollama
pub struct OllamaVisionAdapter {
    transport: HttpTransport,
}

impl OllamaVisionAdapter {
    pub fn new(config: ModelClientConfig) -> Result<Self, PortError> {
        Ok(Self {
            transport: HttpTransport::new(config, SERVICE)?,
        })
    }

    fn request_body<'a>(&'a self, request: &'a AssessmentRequest) -> GenerateRequest<'a> {
        let config = self.transport.config();
        GenerateRequest {
            model: &config.model,
            prompt: &request.prompt,
            images: [request.image_base64.as_str()],
            stream: false,
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
        }
    }
}

/// Concatenates the `response` field of every JSON line in the body
fn parse_generate_body(body: &str) -> Result<String, PortError> {
    let mut text = String::new();
    let mut chunks = 0usize;

    for line in body.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let chunk: GenerateChunk = serde_json::from_str(line)
            .map_err(|e| PortError::transformation(format!("invalid ollama response line: {}", e)))?;
        if let Some(error) = chunk.error {
            return Err(PortError::internal(format!("ollama reported an error: {}", error)));
        }
        if let Some(part) = chunk.response {
            text.push_str(&part);
        }
        chunks += 1;
    }

    if chunks == 0 {
        return Err(PortError::transformation("empty ollama response"));
    }
    Ok(text)
}

impl DomainPort for OllamaVisionAdapter {}

#[async_trait]
impl VisionModelPort for OllamaVisionAdapter {
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
            "Sending generate request"
        );
        let text = self.transport.post_json("api/generate", &body).await?;
        parse_generate_body(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::ImageReference;

    #[test]
    fn test_request_body_shape() {
        let adapter = OllamaVisionAdapter::new(ModelClientConfig::default()).unwrap();
        let request = AssessmentRequest {
            image: ImageReference {
                index: 2,
                file_name: "side.jpg".to_string(),
            },
            mime_type: "image/jpeg",
            image_base64: "/9j/4AAQ".to_string(),
            prompt: "Assess".to_string(),
        };
        let body = serde_json::to_value(adapter.request_body(&request)).unwrap();

        assert_eq!(body["model"], "llava");
        assert_eq!(body["prompt"], "Assess");
        assert_eq!(body["images"][0], "/9j/4AAQ");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 1000);
        assert_eq!(adapter.model(), "llava");
    }

    #[test]
    fn test_parse_single_object() {
        let body = r#"{"model":"llava","response":"DAMAGE: scratch","done":true}"#;
        assert_eq!(parse_generate_body(body).unwrap(), "DAMAGE: scratch");
    }

    #[test]
    fn test_parse_concatenates_stream_lines() {
        let body = "{\"response\":\"DAMAGE: \",\"done\":false}\n\
                    {\"response\":\"dent\",\"done\":false}\n\
                    \n\
                    {\"response\":\"\",\"done\":true}\n";
        assert_eq!(parse_generate_body(body).unwrap(), "DAMAGE: dent");
    }

    #[test]
    fn test_parse_surfaces_server_error() {
        let body = r#"{"error":"model 'llava' not found"}"#;
        let error = parse_generate_body(body).unwrap_err();
        assert!(error.to_string().contains("not found"));
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert!(matches!(parse_generate_body("  \n"), Err(PortError::Transformation { .. })));
        assert!(matches!(parse_generate_body("not json"), Err(PortError::Transformation { .. })));
    }
}
