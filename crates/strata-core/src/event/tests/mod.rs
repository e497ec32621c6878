#[cfg(test)]
mod error_tests;

#[cfg(test)]
mod tests {
    use crate::event::{Event, ListenerOptions};

    #[derive(Debug)]
    struct PingEvent;
    impl Event for PingEvent {}

    #[test]
    fn test_event_name_is_short_type_name() {
        assert_eq!(PingEvent.name(), "PingEvent");
    }

    #[test]
    fn test_listener_options_default_order() {
        let options: ListenerOptions<PingEvent> = ListenerOptions::default();
        assert_eq!(options.get_order(), 0);
        assert_eq!(ListenerOptions::<PingEvent>::new().order(-3).get_order(), -3);
    }

    #[tokio::test]
    async fn test_default_validate_accepts() {
        assert!(PingEvent.validate().await.is_ok());
    }
}
