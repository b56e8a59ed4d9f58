//! Order specification parsed from `-`-prefixed field tokens.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

/// Ordered list of sort keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct OrderBy(pub Vec<OrderKey>);

impl OrderBy {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse order tokens: a leading `-` marks descending, anything else is
    /// ascending. Empty tokens are dropped. Parsing never fails; whether a
    /// token names a real field is decided by the consumer.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut keys = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            let (dir, name) = match token.strip_prefix('-') {
                Some(rest) => (SortDir::Desc, rest),
                None => (SortDir::Asc, token),
            };
            if name.is_empty() {
                continue;
            }
            keys.push(OrderKey {
                field: name.to_owned(),
                dir,
            });
        }
        Self(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minus_prefix_means_descending() {
        // Arrange / Act
        let order = OrderBy::parse(&["-created_at", "name"]);

        // Assert
        assert_eq!(order.0.len(), 2);
        assert_eq!(order.0[0].field, "created_at");
        assert_eq!(order.0[0].dir, SortDir::Desc);
        assert_eq!(order.0[1].field, "name");
        assert_eq!(order.0[1].dir, SortDir::Asc);
    }

    #[test]
    fn blank_tokens_are_dropped() {
        let order = OrderBy::parse(&["", "  ", "-"]);
        assert!(order.is_empty());
    }
}
