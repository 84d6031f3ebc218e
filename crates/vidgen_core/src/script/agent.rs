//! Generation through an external agent command.
//!
//! The configured argument list carries a `{prompt}` placeholder that is
//! replaced with the prompt text. Agents that print JSON lines are read
//! through their `payloads[].text` fields; anything else is taken verbatim.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::ScriptSettings;
use crate::process::ToolCommand;

use super::error::{ScriptError, ScriptResult};
use super::ScriptGenerator;

const PROMPT_PLACEHOLDER: &str = "{prompt}";
/// How much of the script the terms prompt quotes.
const SCRIPT_PREVIEW_CHARS: usize = 500;

static JSON_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[.*?\]").expect("json array regex should compile"));

/// Script generator backed by an agent CLI.
#[derive(Debug, Clone)]
pub struct AgentCommandGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    terms_timeout: Duration,
    paragraph_number: u32,
}

impl AgentCommandGenerator {
    pub fn from_settings(settings: &ScriptSettings) -> Self {
        Self {
            program: settings.agent_program.clone(),
            args: settings.agent_args.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            terms_timeout: Duration::from_secs(settings.terms_timeout_secs),
            paragraph_number: settings.paragraph_number.max(1),
        }
    }

    fn command(&self, prompt: &str, timeout: Duration) -> ToolCommand {
        let args = self.args.iter().map(|a| a.replace(PROMPT_PLACEHOLDER, prompt));
        ToolCommand::new(&self.program, timeout).args(args)
    }

    fn ask(&self, prompt: &str, timeout: Duration) -> ScriptResult<String> {
        let command = self.command(prompt, timeout);
        tracing::debug!("$ {} ({} prompt chars)", self.program, prompt.len());

        let output = command.run()?;
        if !output.success() {
            return Err(ScriptError::command_failed(
                &self.program,
                output.code(),
                output.stderr_tail(5),
            ));
        }

        let text = extract_response_text(&output.stdout);
        if text.is_empty() {
            return Err(ScriptError::EmptyResponse);
        }
        Ok(text)
    }
}

impl ScriptGenerator for AgentCommandGenerator {
    fn generate_script(&self, topic: &str, language: &str) -> ScriptResult<String> {
        let prompt = script_prompt(topic, language, self.paragraph_number);
        self.ask(&prompt, self.timeout)
    }

    fn generate_terms(&self, topic: &str, script: &str, count: usize) -> ScriptResult<Vec<String>> {
        let prompt = terms_prompt(topic, script, count);
        let response = self.ask(&prompt, self.terms_timeout)?;
        parse_terms_response(&response, count).ok_or(ScriptError::NoTerms)
    }
}

/// Prompt asking for a plain narration script.
pub fn script_prompt(topic: &str, language: &str, paragraph_number: u32) -> String {
    let language_hint = if language.is_empty() || language == "en" || language.starts_with("en-") {
        String::new()
    } else {
        format!(" in {}", language)
    };

    format!(
        "Write a short video narration script about: {topic}\n\
         \n\
         Requirements:\n\
         - Write exactly {paragraph_number} paragraph(s){language_hint}\n\
         - Get straight to the main content immediately\n\
         - No greetings like \"welcome\" or \"in this video\"\n\
         - No markdown formatting, plain text only\n\
         - No speaker labels like \"voiceover:\" or \"narrator:\"\n\
         - Just the script text, nothing else\n\
         \n\
         Return only the script:"
    )
}

/// Prompt asking for a JSON array of English stock-footage search terms.
pub fn terms_prompt(topic: &str, script: &str, count: usize) -> String {
    let preview: String = if script.trim().is_empty() {
        topic.to_string()
    } else {
        script.chars().take(SCRIPT_PREVIEW_CHARS).collect()
    };

    format!(
        "Generate {count} search terms for stock video footage.\n\
         \n\
         Video topic: {topic}\n\
         \n\
         Script:\n\
         {preview}\n\
         \n\
         Requirements:\n\
         - Return ONLY a JSON array of strings like [\"term1\", \"term2\"]\n\
         - Each term should be 1-3 words\n\
         - Terms must be in English (for stock video APIs)\n\
         - Terms should visually represent the video content\n\
         \n\
         Return the JSON array:"
    )
}

/// Pull the first JSON array out of an agent response.
///
/// Entries are trimmed and stringified; blank entries are dropped and the
/// list is cut to `count`. Returns `None` when no non-empty array is found.
pub fn parse_terms_response(response: &str, count: usize) -> Option<Vec<String>> {
    let found = JSON_ARRAY.find(response)?;
    let values: Vec<Value> = serde_json::from_str(found.as_str()).ok()?;

    let terms: Vec<String> = values
        .into_iter()
        .take(count)
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null | Value::Bool(false) => None,
            other => Some(other.to_string()),
        })
        .filter(|t| !t.is_empty())
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms)
    }
}

/// Text of the first JSON line's payloads, or the raw output.
fn extract_response_text(stdout: &str) -> String {
    let stdout = stdout.trim();

    for line in stdout.lines().map(str::trim) {
        if !line.starts_with('{') {
            continue;
        }
        let Ok(data) = serde_json::from_str::<Value>(line) else {
            return stdout.to_string();
        };
        let texts: Vec<&str> = data
            .get("payloads")
            .and_then(Value::as_array)
            .map(|payloads| {
                payloads
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        return texts.join("\n").trim().to_string();
    }

    stdout.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(program: &str, args: &[&str]) -> ScriptSettings {
        ScriptSettings {
            agent_program: program.to_string(),
            agent_args: args.iter().map(|a| a.to_string()).collect(),
            ..ScriptSettings::default()
        }
    }

    #[test]
    fn substitutes_prompt() {
        let generator = AgentCommandGenerator::from_settings(&settings("pnpm", &["agent", "-m", "{prompt}", "--json"]));
        let cmd = generator.command("say hi", Duration::from_secs(1));
        assert_eq!(cmd.get_args(), &["agent", "-m", "say hi", "--json"]);
    }

    #[test]
    fn terms_from_first_array() {
        let response = "Here you go:\n[\"coral reef\", \" sea turtle \", \"\", 42]\nand [\"ignored\"]";
        assert_eq!(
            parse_terms_response(response, 5),
            Some(vec!["coral reef".to_string(), "sea turtle".to_string(), "42".to_string()])
        );
        assert_eq!(
            parse_terms_response("[\"a\", \"b\", \"c\"]", 2),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn terms_missing_or_malformed() {
        assert_eq!(parse_terms_response("no array here", 5), None);
        assert_eq!(parse_terms_response("[not json]", 5), None);
        assert_eq!(parse_terms_response("[]", 5), None);
    }

    #[test]
    fn reads_json_payloads() {
        let stdout = "building...\n{\"payloads\":[{\"text\":\"Line one.\"},{\"text\":\"Line two.\"}]}\n";
        assert_eq!(extract_response_text(stdout), "Line one.\nLine two.");
        assert_eq!(extract_response_text("  plain answer \n"), "plain answer");
    }

    #[test]
    fn prompts_carry_inputs() {
        let prompt = script_prompt("bees", "de-DE", 2);
        assert!(prompt.contains("about: bees"));
        assert!(prompt.contains("exactly 2 paragraph(s) in de-DE"));
        assert!(!script_prompt("bees", "en-US", 1).contains(" in en-US"));

        let long_script = "x".repeat(800);
        let prompt = terms_prompt("bees", &long_script, 4);
        assert!(prompt.contains("Generate 4 search terms"));
        assert!(prompt.contains(&"x".repeat(500)));
        assert!(!prompt.contains(&"x".repeat(501)));
    }

    #[cfg(unix)]
    #[test]
    fn generates_through_command() {
        let generator = AgentCommandGenerator::from_settings(&settings(
            "sh",
            &["-c", "echo '{\"payloads\":[{\"text\":\"[\\\"kelp\\\", \\\"reef\\\"]\"}]}'", "{prompt}"],
        ));
        let terms = generator.generate_terms("ocean", "", 5).unwrap();
        assert_eq!(terms, vec!["kelp", "reef"]);
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_error() {
        let generator = AgentCommandGenerator::from_settings(&settings("sh", &["-c", "exit 2"]));
        let err = generator.generate_script("ocean", "en").unwrap_err();
        assert!(matches!(err, ScriptError::CommandFailed { exit_code: 2, .. }));
    }
}
