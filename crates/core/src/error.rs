#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation() {
        let err = CoreError::Validation("bad skill level".to_string());
        assert_eq!(err.to_string(), "Validation failed: bad skill level");
    }

    #[test]
    fn display_knowledge_base() {
        let err = CoreError::KnowledgeBase("missing file".to_string());
        assert_eq!(err.to_string(), "Knowledge base error: missing file");
    }
}
