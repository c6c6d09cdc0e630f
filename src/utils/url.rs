/// Thin wrapper around an URL as a `String`, so that attachment-related code can
/// compare and store them without re-validating anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Url {
    inner: String,
}

impl Url {
    pub fn new(url: String) -> Self {
        Self { inner: url }
    }

    pub fn get_ref(&self) -> &str {
        self.inner.as_str()
    }
}

impl std::fmt::Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
