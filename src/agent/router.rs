//! Router
//!
//! Drives role nodes one at a time over a single conversation. The graph is
//! checked once when built; a bad graph never starts a run.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::agent::conversation::ConversationState;
use crate::agent::directive::{Directive, Goto, RoleNode};
use crate::agent::input::InputSource;
use crate::core::{FailureKind, Message, Result, WorldsmithError};

/// Default bound on completed node steps per run
pub const DEFAULT_MAX_STEPS: usize = 32;

/// Receives each update as the router applies it
pub trait RunObserver: Send + Sync {
    fn on_update(&self, _node: &str, _update: &[Message]) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Record of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Final conversation
    pub state: ConversationState,
    /// Node steps completed
    pub steps: usize,
    /// Nodes whose update carried a diagnostic
    pub failures: Vec<(String, FailureKind)>,
    /// Stopped by `max_steps` instead of TERMINATE
    pub hit_step_limit: bool,
}

/// A validated routing graph
pub struct Router {
    entry: String,
    nodes: HashMap<String, Arc<dyn RoleNode>>,
    max_steps: usize,
}

/// Collects nodes before validation
pub struct RouterBuilder {
    entry: Option<String>,
    nodes: Vec<Arc<dyn RoleNode>>,
    max_steps: usize,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self {
            entry: None,
            nodes: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl RouterBuilder {
    /// Set the entry node
    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Add a node
    pub fn node(mut self, node: impl RoleNode + 'static) -> Self {
        self.nodes.push(Arc::new(node));
        self
    }

    /// Add a shared node
    pub fn shared_node(mut self, node: Arc<dyn RoleNode>) -> Self {
        self.nodes.push(node);
        self
    }

    /// Bound the number of completed node steps per run
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Validate the graph and build the router
    pub fn build(self) -> Result<Router> {
        let entry = self
            .entry
            .ok_or_else(|| WorldsmithError::config("routing graph has no entry node"))?;

        if self.max_steps == 0 {
            return Err(WorldsmithError::config("max_steps must be at least 1"));
        }

        let mut nodes: HashMap<String, Arc<dyn RoleNode>> = HashMap::new();
        for node in self.nodes {
            let name = node.name().to_string();
            if nodes.insert(name.clone(), node).is_some() {
                return Err(WorldsmithError::config(format!(
                    "node '{}' is defined twice",
                    name
                )));
            }
        }

        if !nodes.contains_key(&entry) {
            return Err(WorldsmithError::config(format!(
                "entry node '{}' is not defined",
                entry
            )));
        }

        let mut edges: HashMap<&str, Vec<Goto>> = HashMap::new();
        for (name, node) in &nodes {
            let targets = node.targets();
            if targets.is_empty() {
                return Err(WorldsmithError::config(format!(
                    "node '{}' declares no targets",
                    name
                )));
            }
            for target in &targets {
                if let Goto::Node(next) = target {
                    if !nodes.contains_key(next) {
                        return Err(WorldsmithError::config(format!(
                            "node '{}' targets undefined node '{}'",
                            name, next
                        )));
                    }
                }
            }
            edges.insert(name.as_str(), targets);
        }

        // Breadth-first walk from the entry
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut terminates = false;
        let mut queue: VecDeque<&str> = VecDeque::from([entry.as_str()]);
        while let Some(current) = queue.pop_front() {
            if !reachable.insert(current) {
                continue;
            }
            for target in edges.get(current).map(Vec::as_slice).unwrap_or_default() {
                match target {
                    Goto::Terminate => terminates = true,
                    Goto::Node(next) => queue.push_back(next.as_str()),
                }
            }
        }

        let mut unreachable: Vec<&str> = nodes
            .keys()
            .map(String::as_str)
            .filter(|name| !reachable.contains(name))
            .collect();
        if !unreachable.is_empty() {
            unreachable.sort_unstable();
            return Err(WorldsmithError::config(format!(
                "unreachable nodes: {}",
                unreachable.join(", ")
            )));
        }

        if !terminates {
            return Err(WorldsmithError::config(
                "no path from the entry node reaches TERMINATE",
            ));
        }

        Ok(Router {
            entry,
            nodes,
            max_steps: self.max_steps,
        })
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Run from the entry node until TERMINATE and return the final state
    pub async fn run(
        &self,
        initial_messages: Vec<Message>,
        input: &dyn InputSource,
    ) -> Result<ConversationState> {
        self.run_with(initial_messages, input, &NoopObserver)
            .await
            .map(|report| report.state)
    }

    /// Run and report progress to `observer`.
    ///
    /// Only completed transitions count towards `max_steps`; a suspension
    /// waits on external input and is not a step. Reaching the limit stops
    /// the run as if TERMINATE had been chosen.
    pub async fn run_with(
        &self,
        initial_messages: Vec<Message>,
        input: &dyn InputSource,
        observer: &dyn RunObserver,
    ) -> Result<RunReport> {
        let mut state = ConversationState::new(initial_messages);
        let mut current = self.entry.clone();
        let mut resume: Option<String> = None;
        let mut steps = 0;
        let mut failures = Vec::new();

        info!(entry = %self.entry, seed = state.len(), "run started");

        loop {
            if steps >= self.max_steps {
                warn!(max_steps = self.max_steps, node = %current, "step limit reached, halting");
                return Ok(RunReport {
                    state,
                    steps,
                    failures,
                    hit_step_limit: true,
                });
            }

            let node = self.nodes.get(&current).ok_or_else(|| {
                WorldsmithError::config(format!("node '{}' is not defined", current))
            })?;

            let directive = node
                .run(&state, resume.take())
                .instrument(info_span!("node", name = %current))
                .await;

            match directive {
                Directive::Suspend { prompt } => {
                    debug!(node = %current, "waiting for input");
                    resume = Some(input.read_line(&prompt).await?);
                }
                Directive::Transition {
                    update,
                    goto,
                    failure,
                } => {
                    if !node.targets().contains(&goto) {
                        return Err(WorldsmithError::config(format!(
                            "node '{}' chose undeclared target '{}'",
                            current, goto
                        )));
                    }

                    steps += 1;
                    if let Some(kind) = failure {
                        failures.push((current.clone(), kind));
                    }

                    observer.on_update(&current, &update);
                    let appended = update.len();
                    state = state.append(update);
                    debug!(node = %current, appended, total = state.len(), next = %goto, "transition");

                    match goto {
                        Goto::Terminate => {
                            info!(steps, messages = state.len(), "run complete");
                            return Ok(RunReport {
                                state,
                                steps,
                                failures,
                                hit_step_limit: false,
                            });
                        }
                        Goto::Node(next) => current = next,
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.nodes.keys().collect();
        names.sort();
        f.debug_struct("Router")
            .field("entry", &self.entry)
            .field("nodes", &names)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::input::ScriptedInput;
    use async_trait::async_trait;

    /// Appends a fixed message and moves on
    struct Fixed {
        name: &'static str,
        goto: Goto,
        targets: Vec<Goto>,
    }

    impl Fixed {
        fn new(name: &'static str, goto: Goto) -> Self {
            Self {
                name,
                targets: vec![goto.clone()],
                goto,
            }
        }
    }

    #[async_trait]
    impl RoleNode for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn targets(&self) -> Vec<Goto> {
            self.targets.clone()
        }

        async fn run(&self, _state: &ConversationState, _resume: Option<String>) -> Directive {
            Directive::transition(vec![Message::assistant(self.name)], self.goto.clone())
        }
    }

    /// Counts human messages and stops after `limit`
    struct Looper {
        limit: usize,
    }

    #[async_trait]
    impl RoleNode for Looper {
        fn name(&self) -> &str {
            "loop"
        }

        fn targets(&self) -> Vec<Goto> {
            vec![Goto::node("loop"), Goto::Terminate]
        }

        async fn run(&self, state: &ConversationState, resume: Option<String>) -> Directive {
            let Some(line) = resume else {
                return Directive::suspend("next? ");
            };
            let seen = state.iter().filter(|m| m.content() == "again").count() + 1;
            let goto = if line == "again" && seen < self.limit {
                Goto::node("loop")
            } else {
                Goto::Terminate
            };
            Directive::transition(vec![Message::human(line)], goto)
        }
    }

    #[test]
    fn test_missing_entry_is_rejected() {
        let err = Router::builder()
            .node(Fixed::new("a", Goto::Terminate))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("no entry node"));
    }

    #[test]
    fn test_undefined_target_is_rejected() {
        let err = Router::builder()
            .entry("a")
            .node(Fixed::new("a", Goto::node("ghost")))
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_unreachable_node_is_rejected() {
        let err = Router::builder()
            .entry("a")
            .node(Fixed::new("a", Goto::Terminate))
            .node(Fixed::new("island", Goto::Terminate))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("island"));
    }

    #[test]
    fn test_graph_without_exit_is_rejected() {
        let err = Router::builder()
            .entry("a")
            .node(Fixed::new("a", Goto::node("b")))
            .node(Fixed::new("b", Goto::node("a")))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("TERMINATE"));
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let err = Router::builder()
            .entry("a")
            .node(Fixed::new("a", Goto::Terminate))
            .node(Fixed::new("a", Goto::Terminate))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[tokio::test]
    async fn test_linear_run() {
        let router = Router::builder()
            .entry("a")
            .node(Fixed::new("a", Goto::node("b")))
            .node(Fixed::new("b", Goto::Terminate))
            .build()
            .unwrap();

        let state = router
            .run(vec![Message::human("start")], &ScriptedInput::default())
            .await
            .unwrap();
        let contents: Vec<_> = state.iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["start", "a", "b"]);
    }

    #[tokio::test]
    async fn test_dynamic_goto_from_input() {
        let router = Router::builder()
            .entry("loop")
            .node(Looper { limit: 10 })
            .build()
            .unwrap();

        let input = ScriptedInput::new(["again", "again", "stop"]);
        let report = router.run_with(vec![], &input, &NoopObserver).await.unwrap();
        assert_eq!(report.steps, 3);
        assert!(!report.hit_step_limit);
        assert_eq!(report.state.last().unwrap().content(), "stop");
    }

    #[tokio::test]
    async fn test_step_limit_halts_cycle() {
        let router = Router::builder()
            .entry("loop")
            .node(Looper { limit: usize::MAX })
            .max_steps(2)
            .build()
            .unwrap();

        let input = ScriptedInput::new(["again", "again", "again"]);
        let report = router.run_with(vec![], &input, &NoopObserver).await.unwrap();
        assert!(report.hit_step_limit);
        assert_eq!(report.steps, 2);
        assert_eq!(report.state.len(), 2);
        assert_eq!(input.remaining(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_input_is_an_error() {
        let router = Router::builder()
            .entry("loop")
            .node(Looper { limit: 10 })
            .build()
            .unwrap();

        let err = router
            .run(vec![], &ScriptedInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Input);
    }
}
