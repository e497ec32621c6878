
#[cfg(test)]
mod tests {
    use crate::utils::short_type_name;

    #[test]
    fn test_short_type_name_strips_path() {
        assert_eq!(short_type_name("my_app::bundles::SecurityBundle"), "SecurityBundle");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_short_type_name_strips_generics() {
        assert_eq!(
            short_type_name("strata_core::event::Wrapper<alloc::string::String>"),
            "Wrapper"
        );
    }

    #[test]
    fn test_as_any_downcast() {
        use crate::utils::AsAny;

        let boxed: Box<dyn AsAny> = Box::new(42u32);
        // Deref first: the Box itself also implements AsAny.
        let value: &dyn AsAny = &*boxed;
        assert_eq!(value.as_any().downcast_ref::<u32>(), Some(&42));
        assert!(value.as_any().downcast_ref::<i64>().is_none());
    }
}
