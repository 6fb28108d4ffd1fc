//! The two world-building roles
//!
//! The generator drafts the world and hands it to the librarian, injecting
//! the librarian's contract ahead of its own output. The librarian asks the
//! outside world for a question and answers it.

use async_trait::async_trait;
use tracing::debug;

use crate::agent::conversation::ConversationState;
use crate::agent::directive::{Directive, Goto, RoleNode};
use crate::agent::step::RoleStep;
use crate::core::Message;

/// Node name of the generator
pub const GENERATOR: &str = "generator";
/// Node name of the librarian
pub const LIBRARIAN: &str = "librarian";

/// Command that ends a follow-up session
pub const FINISH_COMMAND: &str = "/finish";

/// Drafts the world, then always hands over to the librarian
pub struct GeneratorNode {
    step: RoleStep,
    handoff_prompt: String,
    next: String,
}

impl GeneratorNode {
    /// `handoff_prompt` is the contract of the role that runs next
    pub fn new(step: RoleStep, handoff_prompt: impl Into<String>) -> Self {
        Self {
            step,
            handoff_prompt: handoff_prompt.into(),
            next: LIBRARIAN.to_string(),
        }
    }

    /// Hand over to a node other than the librarian
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = next.into();
        self
    }
}

#[async_trait]
impl RoleNode for GeneratorNode {
    fn name(&self) -> &str {
        GENERATOR
    }

    fn targets(&self) -> Vec<Goto> {
        vec![Goto::node(&self.next)]
    }

    async fn run(&self, state: &ConversationState, _resume: Option<String>) -> Directive {
        let outcome = self.step.run(GENERATOR, state.messages()).await;
        Directive::from_outcome(
            vec![Message::system(&self.handoff_prompt)],
            outcome,
            Goto::node(&self.next),
        )
    }
}

/// Answers one outside question, or keeps answering until `/finish`
pub struct LibrarianNode {
    step: RoleStep,
    input_prompt: String,
    follow_up: bool,
}

impl LibrarianNode {
    pub fn new(step: RoleStep, input_prompt: impl Into<String>) -> Self {
        Self {
            step,
            input_prompt: input_prompt.into(),
            follow_up: false,
        }
    }

    /// Route back to the librarian after each answer until `/finish`
    pub fn with_follow_up(mut self, follow_up: bool) -> Self {
        self.follow_up = follow_up;
        self
    }

    /// Pick the next node from the question just asked
    fn route(&self, question: &str) -> Goto {
        if self.follow_up && !question.trim_start().starts_with(FINISH_COMMAND) {
            Goto::node(LIBRARIAN)
        } else {
            Goto::Terminate
        }
    }
}

#[async_trait]
impl RoleNode for LibrarianNode {
    fn name(&self) -> &str {
        LIBRARIAN
    }

    fn targets(&self) -> Vec<Goto> {
        if self.follow_up {
            vec![Goto::node(LIBRARIAN), Goto::Terminate]
        } else {
            vec![Goto::Terminate]
        }
    }

    async fn run(&self, state: &ConversationState, resume: Option<String>) -> Directive {
        let question = match resume {
            Some(line) if !line.trim().is_empty() => line,
            Some(_) => {
                debug!("blank input, asking again");
                return Directive::suspend(&self.input_prompt);
            }
            None => return Directive::suspend(&self.input_prompt),
        };

        let goto = self.route(&question);
        let human = Message::human(question);

        let mut messages = state.messages().to_vec();
        messages.push(human.clone());

        let outcome = self.step.run(LIBRARIAN, &messages).await;
        Directive::from_outcome(vec![human], outcome, goto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FailureKind, Result, Role, ToolDefinition, WorldsmithError};
    use crate::llm::LLMProvider;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl LLMProvider for Echo {
        async fn chat(&self, messages: &[Message], _tools: &[ToolDefinition]) -> Result<Message> {
            let last = messages.last().map(|m| m.content()).unwrap_or_default();
            Ok(Message::assistant(format!("re: {}", last)))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct Down;

    #[async_trait]
    impl LLMProvider for Down {
        async fn chat(&self, _messages: &[Message], _tools: &[ToolDefinition]) -> Result<Message> {
            Err(WorldsmithError::model_unavailable("endpoint offline"))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn step(model: impl LLMProvider + 'static) -> RoleStep {
        RoleStep::new(Arc::new(model), Arc::new(ToolRegistry::empty()))
    }

    fn seed() -> ConversationState {
        ConversationState::new(vec![
            Message::system("You are a generator"),
            Message::human("Describe a city"),
        ])
    }

    #[tokio::test]
    async fn test_generator_injects_handoff_contract() {
        let node = GeneratorNode::new(step(Echo), "You are the librarian");
        let directive = node.run(&seed(), None).await;

        assert_eq!(directive.goto(), Some(&Goto::node(LIBRARIAN)));
        assert_eq!(
            directive.update(),
            &[
                Message::system("You are the librarian"),
                Message::assistant("re: Describe a city"),
            ]
        );
    }

    #[tokio::test]
    async fn test_generator_failure_still_routes() {
        let node = GeneratorNode::new(step(Down), "contract");
        let directive = node.run(&seed(), None).await;

        assert_eq!(directive.goto(), Some(&Goto::node(LIBRARIAN)));
        assert_eq!(directive.update().len(), 2);
        assert!(matches!(
            directive,
            Directive::Transition {
                failure: Some(FailureKind::ModelUnavailable),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_librarian_suspends_then_answers() {
        let node = LibrarianNode::new(step(Echo), "Ask: ");
        assert_eq!(node.run(&seed(), None).await, Directive::suspend("Ask: "));
        assert_eq!(
            node.run(&seed(), Some("   ".to_string())).await,
            Directive::suspend("Ask: ")
        );

        let directive = node
            .run(&seed(), Some("What is the population?".to_string()))
            .await;
        assert_eq!(directive.goto(), Some(&Goto::Terminate));
        let roles: Vec<_> = directive.update().iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::Human, Role::Assistant]);
        assert_eq!(
            directive.update()[1].content(),
            "re: What is the population?"
        );
    }

    #[tokio::test]
    async fn test_follow_up_routes_on_finish() {
        let node = LibrarianNode::new(step(Echo), "Ask: ").with_follow_up(true);
        assert_eq!(node.targets().len(), 2);

        let query = node.run(&seed(), Some("/set rivers run north".into())).await;
        assert_eq!(query.goto(), Some(&Goto::node(LIBRARIAN)));

        let finish = node.run(&seed(), Some("  /finish".into())).await;
        assert_eq!(finish.goto(), Some(&Goto::Terminate));
    }
}
