//! Transcript printer
//!
//! Prints each role's contribution as the router applies it.

use crate::agent::{RunObserver, RunReport, GENERATOR, LIBRARIAN};
use crate::core::Message;

/// Writes updates to stdout
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    /// Print human messages too (they were not typed at the terminal)
    echo_input: bool,
}

impl Transcript {
    pub fn new(echo_input: bool) -> Self {
        Self { echo_input }
    }

    /// Render one update as display text
    pub fn render(&self, node: &str, update: &[Message]) -> String {
        let mut output = String::new();

        for message in update {
            match message {
                Message::System { .. } => {}
                Message::Human { content } => {
                    if self.echo_input {
                        output.push_str(&format!("\nYou: {}\n", content));
                    }
                }
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    if !content.is_empty() {
                        output.push_str(&format!("\n🤖 {} response:\n{}\n", label(node), content));
                    }
                    for call in tool_calls {
                        output.push_str(&format!("  → {} {} ({})\n", call.name, call.arguments, call.id));
                    }
                }
                Message::Tool { content, call_id } => {
                    output.push_str(&format!("  ← {}: {}\n", call_id, content));
                }
            }
        }

        output
    }

    /// Closing summary line
    pub fn summary(&self, report: &RunReport) -> String {
        let mut line = format!(
            "\n[Worldsmith] Complete ({} steps, {} messages",
            report.steps,
            report.state.len()
        );
        if !report.failures.is_empty() {
            line.push_str(&format!(", {} degraded", report.failures.len()));
        }
        line.push(')');
        if report.hit_step_limit {
            line.push_str(" - stopped at step limit");
        }
        line
    }
}

impl RunObserver for Transcript {
    fn on_update(&self, node: &str, update: &[Message]) {
        print!("{}", self.render(node, update));
    }
}

fn label(node: &str) -> &str {
    match node {
        GENERATOR => "Generator",
        LIBRARIAN => "Librarian",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ConversationState;
    use crate::core::{FailureKind, ToolCall};
    use serde_json::json;

    #[test]
    fn test_render_skips_contracts() {
        let text = Transcript::new(false).render(
            GENERATOR,
            &[Message::system("secret rules"), Message::assistant("A city.")],
        );
        assert!(!text.contains("secret rules"));
        assert!(text.contains("🤖 Generator response:\nA city."));
    }

    #[test]
    fn test_render_tool_exchange_and_echo() {
        let text = Transcript::new(true).render(
            LIBRARIAN,
            &[
                Message::human("how many?"),
                Message::assistant_with_tools(
                    "",
                    vec![ToolCall::new("c1", "calculator", json!({"expression": "2+2"}))],
                ),
                Message::tool("c1", "4"),
            ],
        );
        assert!(text.contains("You: how many?"));
        assert!(text.contains("→ calculator"));
        assert!(text.contains("← c1: 4"));
    }

    #[test]
    fn test_summary_mentions_degraded_steps() {
        let report = RunReport {
            state: ConversationState::new(vec![Message::human("x")]),
            steps: 2,
            failures: vec![(GENERATOR.to_string(), FailureKind::ModelUnavailable)],
            hit_step_limit: false,
        };
        let line = Transcript::default().summary(&report);
        assert!(line.contains("2 steps, 1 messages, 1 degraded"));
    }
}
