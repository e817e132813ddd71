pub mod advice;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod models;
pub mod personalize;
pub mod responder;

pub use advice::{format_dollars, AdviceSelector, PARAGRAPH_BREAK};
pub use error::AdviceError;
pub use intent::{classify_intent, INTENT_TAXONOMY};
pub use knowledge::{quick_tips, Category, KnowledgeBase, QuickResponse};
pub use models::*;
pub use personalize::{personalize, Personalization};
pub use responder::compose_response;
