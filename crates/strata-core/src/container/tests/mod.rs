
#[cfg(test)]
mod tests {
    use crate::container::{ContainerError, ServiceId, Token};

    #[test]
    fn test_service_id_display() {
        assert_eq!(ServiceId::of::<String>().to_string(), "String");
        assert_eq!(ServiceId::parameter("debug").to_string(), "%debug%");
    }

    #[test]
    fn test_tokens_are_unique_per_creation() {
        let first: Token<u32> = Token::new("port");
        let second: Token<u32> = Token::new("port");
        assert_ne!(first, second);
        assert_ne!(first.service_id(), second.service_id());
        assert_eq!(first, first.clone());
    }

    #[test]
    fn test_container_error_codes() {
        let err = ContainerError::CircularDependency { path: vec!["A".into(), "B".into(), "A".into()] };
        assert_eq!(err.code(), "SERVICE_CIRCULAR_DEPENDENCY");
        assert!(err.to_string().contains("A -> B -> A"));
        let err = ContainerError::ServiceNotFound { service: "Mailer".into() };
        assert_eq!(err.code(), "SERVICE_NOT_FOUND");
    }
}
