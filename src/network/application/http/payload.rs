//! Request body rendering.

use url::form_urlencoded::byte_serialize;

/// What gets posted: a single value or an ordered list of key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Scalar(String),
    Pairs(Vec<(String, String)>),
}

/// A request body plus the choice of whether to URL-escape it.
///
/// ```
/// use rawpost::Payload;
///
/// let form = Payload::pairs([("name", "Jo Doe"), ("n", "1&2")]);
/// assert_eq!(form.encode(), "name=Jo+Doe&n=1%262");
/// assert_eq!(form.raw().encode(), "name=Jo Doe&n=1&2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    content: Content,
    raw: bool,
}

impl Payload {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self {
            content: Content::Scalar(value.into()),
            raw: false,
        }
    }

    /// Pairs are rendered in iteration order.
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            content: Content::Pairs(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            raw: false,
        }
    }

    /// Send keys and values exactly as given.
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Renders the body string that goes on the wire.
    pub fn encode(&self) -> String {
        match &self.content {
            Content::Scalar(value) => self.escape(value),
            Content::Pairs(pairs) => {
                let mut out = String::new();
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push('&');
                    }
                    out.push_str(&self.escape(key));
                    out.push('=');
                    out.push_str(&self.escape(value));
                }
                out
            }
        }
    }

    fn escape(&self, s: &str) -> String {
        if self.raw {
            s.to_string()
        } else {
            byte_serialize(s.as_bytes()).collect()
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::scalar(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::scalar(value)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Payload {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Payload::pairs(pairs)
    }
}
