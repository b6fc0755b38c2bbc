//! HTTP header types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single HTTP header with name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub name: String,
    /// The header value (e.g., "application/json")
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses a `Name: value` line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidHeader` if there is no colon or the name is blank.
    pub fn parse(line: &str) -> DomainResult<Self> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidHeader(line.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidHeader(line.to_string()));
        }
        Ok(Self::new(name, value.trim()))
    }

    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// An ordered collection of HTTP headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a header.
    pub fn add(&mut self, header: Header) {
        self.items.push(header);
    }

    /// Replaces every header with the same name (case-insensitive) by `header`.
    pub fn set(&mut self, header: Header) {
        self.items.retain(|h| !h.is(&header.name));
        self.items.push(header);
    }

    /// Removes every header with the given name and returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|h| !h.is(name));
        before - self.items.len()
    }

    /// Returns the first value for `name` (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.is(name))
            .map(|h| h.value.as_str())
    }

    /// Returns an iterator over all headers.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
