//! Agent module - routing and role orchestration
//!
//! Contains the conversation state, the shared role step, the routing
//! primitives, the router itself and the two world-building roles.

pub mod conversation;
pub mod directive;
pub mod input;
pub mod prompts;
pub mod roles;
pub mod router;
pub mod step;
pub mod world;

pub use conversation::ConversationState;
pub use directive::{Directive, Goto, RoleNode};
pub use input::{InputSource, ScriptedInput};
pub use roles::{GeneratorNode, LibrarianNode, GENERATOR, LIBRARIAN};
pub use router::{NoopObserver, Router, RouterBuilder, RunObserver, RunReport};
pub use step::{RoleStep, StepOutcome};
pub use world::{build_router, seed_messages};
