//! Routing primitives
//!
//! A role node looks at the conversation and answers with a directive:
//! either "append this and go there" or "I need outside input first".

use std::fmt;

use async_trait::async_trait;

use crate::agent::conversation::ConversationState;
use crate::agent::step::StepOutcome;
use crate::core::{FailureKind, Message};

/// Where the router goes next
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Goto {
    Node(String),
    Terminate,
}

impl Goto {
    pub fn node(name: impl Into<String>) -> Self {
        Goto::Node(name.into())
    }
}

impl fmt::Display for Goto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goto::Node(name) => write!(f, "{}", name),
            Goto::Terminate => write!(f, "TERMINATE"),
        }
    }
}

/// A node's instruction to the router
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Append `update` to the conversation and move to `goto`
    Transition {
        update: Vec<Message>,
        goto: Goto,
        /// Set when the update carries an in-band diagnostic
        failure: Option<FailureKind>,
    },
    /// Ask the outside world for one line, then re-run this node with it
    Suspend { prompt: String },
}

impl Directive {
    pub fn transition(update: Vec<Message>, goto: Goto) -> Self {
        Directive::Transition {
            update,
            goto,
            failure: None,
        }
    }

    /// Build a transition from `prefix` followed by a step's delta
    pub fn from_outcome(prefix: Vec<Message>, outcome: StepOutcome, goto: Goto) -> Self {
        let failure = outcome.failure();
        let mut update = prefix;
        update.extend(outcome.into_delta());
        Directive::Transition {
            update,
            goto,
            failure,
        }
    }

    pub fn suspend(prompt: impl Into<String>) -> Self {
        Directive::Suspend {
            prompt: prompt.into(),
        }
    }

    /// Target of a transition, `None` for a suspension
    pub fn goto(&self) -> Option<&Goto> {
        match self {
            Directive::Transition { goto, .. } => Some(goto),
            Directive::Suspend { .. } => None,
        }
    }

    /// Messages a transition appends (empty for a suspension)
    pub fn update(&self) -> &[Message] {
        match self {
            Directive::Transition { update, .. } => update,
            Directive::Suspend { .. } => &[],
        }
    }
}

/// A named step in the routing graph
#[async_trait]
pub trait RoleNode: Send + Sync {
    /// Unique node name
    fn name(&self) -> &str;

    /// Every goto this node may return. Checked when the graph is built and
    /// again on each transition.
    fn targets(&self) -> Vec<Goto>;

    /// Decide what happens next. `resume` holds the external input when the
    /// node is re-run after a [`Directive::Suspend`].
    async fn run(&self, state: &ConversationState, resume: Option<String>) -> Directive;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_outcome_keeps_prefix_first() {
        let outcome = StepOutcome::Failed {
            delta: vec![Message::assistant("[model_unavailable] down")],
            kind: FailureKind::ModelUnavailable,
        };
        let directive = Directive::from_outcome(
            vec![Message::system("contract")],
            outcome,
            Goto::node("librarian"),
        );

        assert_eq!(directive.goto(), Some(&Goto::node("librarian")));
        assert_eq!(directive.update()[0], Message::system("contract"));
        assert_eq!(directive.update().len(), 2);
        assert!(matches!(
            directive,
            Directive::Transition {
                failure: Some(FailureKind::ModelUnavailable),
                ..
            }
        ));
    }

    #[test]
    fn test_suspend_has_no_update() {
        let directive = Directive::suspend("Ask something: ");
        assert!(directive.goto().is_none());
        assert!(directive.update().is_empty());
        assert_eq!(Goto::Terminate.to_string(), "TERMINATE");
    }
}
