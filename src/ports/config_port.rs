//! Configuration access port trait.

/// Section/key lookups over an INI-style configuration.
///
/// Numeric keys are read as strings and parsed by the validator so a
/// malformed value is reported rather than silently replaced.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `true/yes/1/on` and `false/no/0/off`, case-insensitive; anything
    /// else yields `default`.
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get_string(section, key) {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => true,
                "false" | "no" | "0" | "off" => false,
                _ => default,
            },
            None => default,
        }
    }
}
