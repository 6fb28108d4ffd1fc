//! Default wiring: generator -> librarian -> TERMINATE
//!
//! With `router.follow_up` on, the librarian loops on itself until the
//! human sends `/finish`.

use std::sync::Arc;

use crate::agent::roles::{GeneratorNode, LibrarianNode, GENERATOR};
use crate::agent::router::Router;
use crate::agent::step::RoleStep;
use crate::core::{Config, Message, Result};
use crate::llm::LLMProvider;
use crate::tools::ToolRegistry;

/// Build the world-building router from configuration
pub fn build_router(
    config: &Config,
    model: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
) -> Result<Router> {
    let step = RoleStep::new(model, tools);

    Router::builder()
        .entry(GENERATOR)
        .node(GeneratorNode::new(
            step.clone(),
            &config.roles.librarian.system_prompt,
        ))
        .node(
            LibrarianNode::new(step, &config.roles.librarian.input_prompt)
                .with_follow_up(config.router.follow_up),
        )
        .max_steps(config.router.max_steps)
        .build()
}

/// Seed messages for a run: the generator contract and the premise
pub fn seed_messages(config: &Config, premise: &str) -> Vec<Message> {
    vec![
        Message::system(&config.roles.generator.system_prompt),
        Message::human(premise),
    ]
}
