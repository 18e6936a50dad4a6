//! Configuration access port trait.

/// Section/key lookup over whatever holds the run configuration.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
