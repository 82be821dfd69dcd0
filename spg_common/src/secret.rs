use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A wrapper that keeps configuration secrets (hash keys, API tokens) out of log output.
///
/// `Debug` and `Display` never print the wrapped value. Use [`Secret::reveal`] at the point of use.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The number of bytes in the secret. Handy for validating key sizes without revealing the key.
    pub fn len(&self) -> usize {
        self.value.len()
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn secrets_are_masked() {
        let secret = Secret::from("Fs5cX1TGqYM2PpdbE14a9H83YQSQF5jn");
        assert_eq!(format!("{secret}"), "****");
        assert_eq!(format!("{secret:?}"), "****");
        assert_eq!(secret.reveal(), "Fs5cX1TGqYM2PpdbE14a9H83YQSQF5jn");
        assert_eq!(secret.len(), 32);
        assert!(!secret.is_empty());
        assert!(Secret::<String>::default().is_empty());
    }
}
