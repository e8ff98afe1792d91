//! Chat core: the retrieval-augmented responder and its helpers.
//!
//! - `history`: session-keyed conversation buffers
//! - `categorizer`: keyword labels for analytics
//! - `postprocess`: answer cleanup
//! - `responder`: one question in, one answer (or apology) out

pub mod categorizer;
pub mod history;
pub mod postprocess;
pub mod responder;

pub use categorizer::{classify, Category};
pub use history::{ConversationHistory, ConversationTurn, Role, SessionManager};
pub use responder::{ChatExchange, ChatOutcome, Responder};

/// Reply sent to the user whenever answering fails
pub const FALLBACK_REPLY: &str = "Omlouvám se, ale při zpracování vaší otázky došlo k chybě.";

/// Category recorded for failed interactions
pub const ERROR_CATEGORY: &str = "error";
