//! The conversational agent: intent classification, response composition,
//! and the workflow gluing them together.
//!
//! Every public entry point returns a well-formed [`AgentResponse`]; no
//! failure in this layer propagates to the caller. When the external
//! language model is unavailable or returns garbage, handlers degrade to
//! documented fallback values instead.

pub mod charts;
pub mod compose;
pub mod intent;
mod markdown;
pub mod response;
pub mod workflow;

pub use intent::{classify_intent, Intent, IntentEntities, IntentResult};
pub use response::{AgentResponse, ChatMessage};
pub use workflow::{run_workflow, AgentContext};
