//! Gemini `generateContent` client for habit blueprints and coaching.
//!
//! Both calls ask for a JSON reply constrained by a response schema. The reply
//! text is stripped of markdown code fences before it is parsed.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::habits::{recent_completion_rate, AiHabitPlan, AiInsight, Habit, HabitCategory};
use crate::locale::Language;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL:    &str = "gemini-2.5-flash";

// ─── Config ───────────────────────────────────────────────────────────────────

fn default_model()    -> String { DEFAULT_MODEL.to_owned() }
fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_timeout()  -> u64    { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key:         String,
    #[serde(default = "default_model")]
    pub model:           String,
    #[serde(default = "default_base_url")]
    pub base_url:        String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key:         String::new(),
            model:           default_model(),
            base_url:        default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

// ─── Reply types ──────────────────────────────────────────────────────────────

/// Blueprint as returned by the model; the category is free text until parsed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    title:       String,
    description: String,
    micro_step:  String,
    category:    String,
    frequency:   String,
}

impl From<RawPlan> for AiHabitPlan {
    fn from(r: RawPlan) -> Self {
        Self {
            title:       r.title,
            description: r.description,
            micro_step:  r.micro_step,
            category:    HabitCategory::parse(&r.category),
            frequency:   r.frequency,
        }
    }
}

/// Used when the model answers with nothing.
pub fn empty_reply_insight() -> AiInsight {
    AiInsight { message: "Keep going!".into(), actionable_tip: "Consistency is key.".into() }
}

/// Used when the request fails.
pub fn failed_request_insight() -> AiInsight {
    AiInsight {
        message:        "Stay focused.".into(),
        actionable_tip: "Try to do the micro-step today.".into(),
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct GeminiClient {
    http:       Client,
    pub config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent("HabitInception/0.1")
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool { !self.config.api_key.trim().is_empty() }

    /// Turns a free-form goal into a habit plan. Errors propagate so the
    /// wizard can report them.
    pub async fn generate_blueprint(&self, goal: &str, lang: Language) -> Result<AiHabitPlan> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "title":       { "type": "STRING", "description": "A catchy name for the habit" },
                "description": { "type": "STRING", "description": "A 1-sentence description of the full habit" },
                "microStep":   { "type": "STRING", "description": "The tiny, <2 minute version of the habit to start with" },
                "category":    {
                    "type": "STRING",
                    "enum": HabitCategory::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                },
                "frequency":   { "type": "STRING", "description": "Suggested frequency, e.g., Daily" },
            },
            "required": ["title", "description", "microStep", "category", "frequency"],
        });

        let text = self.generate_json(&blueprint_prompt(goal, lang), schema).await
            .map_err(|e| {
                tracing::error!("Gemini blueprint error: {e}");
                e
            })?
            .ok_or_else(|| anyhow!("No response from AI"))?;

        let raw: RawPlan = serde_json::from_str(clean_json(&text))?;
        Ok(raw.into())
    }

    /// Short coaching note for a habit. Never fails: falls back to a canned
    /// insight when the model is silent or unreachable.
    pub async fn habit_coaching(&self, habit: &Habit, lang: Language) -> AiInsight {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "message":       { "type": "STRING" },
                "actionableTip": { "type": "STRING" },
            },
            "required": ["message", "actionableTip"],
        });

        match self.generate_json(&coaching_prompt(habit, lang), schema).await {
            Ok(None) => empty_reply_insight(),
            Ok(Some(text)) => serde_json::from_str(clean_json(&text)).unwrap_or_else(|e| {
                tracing::warn!("Gemini coaching reply was not valid JSON: {e}");
                failed_request_insight()
            }),
            Err(e) => {
                tracing::error!("Gemini coaching error: {e}");
                failed_request_insight()
            }
        }
    }

    /// POSTs a prompt and returns the reply text, `None` when it is empty.
    async fn generate_json(&self, prompt: &str, schema: Value) -> Result<Option<String>> {
        if !self.is_configured() {
            return Err(anyhow!("No Gemini API key configured"));
        }
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
        );
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema":   schema,
            },
        });

        let reply: Value = self.http.post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send().await?.error_for_status()?.json().await?;

        Ok(response_text(&reply))
    }
}

// ─── Prompts ──────────────────────────────────────────────────────────────────

pub fn blueprint_prompt(goal: &str, lang: Language) -> String {
    let lang_name = lang.prompt_name();
    format!(
        "User Goal: \"{goal}\"\n\
         Target Language: {lang_name}\n\
         \n\
         Create a \"Habit Inception\" plan.\n\
         1. Identify the core habit.\n\
         2. Create a \"Micro Step\" (The Seed): This is a version of the habit so easy it's impossible to say no to.\n\
         3. Categorize it.\n\
         \n\
         IMPORTANT: Output 'title', 'description', 'microStep', and 'frequency' in {lang_name}.\n\
         Output 'category' exactly as one of these English strings: \"Health\", \"Productivity\", \
         \"Mindfulness\", \"Learning\", \"Creativity\", \"Other\".\n"
    )
}

pub fn coaching_prompt(habit: &Habit, lang: Language) -> String {
    let rate = recent_completion_rate(&habit.logs, 7) * 100.0;
    format!(
        "Act as a supportive but tactical habit coach.\n\
         Habit: {}\n\
         Micro-Step: {}\n\
         Current Streak: {}\n\
         Recent Completion Rate (last 7 active days): {:.0}%\n\
         \n\
         Provide a brief insight in {}.\n\
         1. A short motivational message or observation.\n\
         2. A specific, actionable tip to maintain or fix the streak.\n",
        habit.title, habit.description, habit.streak, rate, lang.prompt_name(),
    )
}

// ─── Utilities ────────────────────────────────────────────────────────────────

/// Strips ```json fences the model sometimes wraps around its reply.
pub fn clean_json(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix("```json").or_else(|| t.strip_prefix("```")).unwrap_or(t);
    let t = t.strip_suffix("```").unwrap_or(t);
    t.trim()
}

/// Concatenated text parts of the first candidate.
pub fn response_text(reply: &Value) -> Option<String> {
    let parts = reply["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() { None } else { Some(text) }
}
