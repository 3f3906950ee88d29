//! Responder backends.
//!
//! A responder turns the latest user utterance into a reply string,
//! asynchronously and possibly failing. The chat layer does not retry or
//! interpret a failure: the REPL surfaces it to the user without writing
//! an assistant message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const SYSTEM_PROMPT: &str = "You are helpful assistant to a software engineer";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Produces a reply to a user utterance.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, prompt: &str) -> Result<String>;
}

/// Responder backed by the Gemini `generateContent` HTTP API.
pub struct GeminiResponder {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiResponder {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: String,
}

#[derive(Deserialize)]
struct ReplyContent {
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ReplyContent,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[async_trait]
impl Responder for GeminiResponder {
    async fn respond(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_PROMPT,
                }],
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("Failed to reach the responder backend")?
            .error_for_status()
            .context("Responder backend returned an error status")?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse responder reply")?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .context("Responder returned an empty reply")
    }
}

/// Offline rule-based responder, used when no API key is configured.
///
/// Recognizes a handful of prompts and, for the ones that imply a shell
/// workflow, drops a generated script into the workflows directory.
pub struct RuleBasedResponder {
    workflows_dir: Option<PathBuf>,
}

impl RuleBasedResponder {
    pub fn new(workflows_dir: Option<PathBuf>) -> Self {
        Self { workflows_dir }
    }

    fn write_workflow(&self, script: &str) {
        let Some(dir) = &self.workflows_dir else {
            return;
        };
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::warn!("Failed to create workflows directory {:?}: {}", dir, e);
            return;
        }
        let path = dir.join("current.sh");
        if let Err(e) = fs::write(&path, script) {
            tracing::warn!("Failed to write workflow script {:?}: {}", path, e);
        }
    }
}

#[async_trait]
impl Responder for RuleBasedResponder {
    async fn respond(&self, prompt: &str) -> Result<String> {
        let lower = prompt.to_lowercase();

        if lower.contains("kubernetes") || lower.contains("deploy") {
            self.write_workflow("#!/bin/bash\nkubectl apply -f manifest.yaml\n");
            return Ok("Generated script to deploy manifest.yaml to Kubernetes.".to_string());
        }

        if lower.contains("git") && lower.contains("branch") {
            self.write_workflow(
                "#!/bin/bash\n\
                 git pull origin main\n\
                 git checkout -b new-branch\n\
                 git add .\n\
                 git commit -m \"Your commit message\"\n\
                 git push origin new-branch\n",
            );
            return Ok("Generated git workflow script.".to_string());
        }

        if lower.contains("hello") {
            return Ok("Hello! How can I help you today?".to_string());
        }

        Ok("Sorry, I don't know how to do that yet.".to_string())
    }
}
