use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("unknown advice category: {0}")]
    UnknownCategory(String),
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error("invalid knowledge base: {0}")]
    InvalidKnowledgeBase(String),
    #[error("failed to read knowledge base: {0}")]
    Io(#[from] std::io::Error),
}
