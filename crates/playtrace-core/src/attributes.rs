//! Caller-supplied custom attributes
//!
//! Attributes can be registered for every event, or for the subset of
//! events whose action name matches a regex filter. Buckets are applied
//! during attribute assembly, before derived attributes, so the engine's
//! own attributes always win on key collisions.

use crate::error::{Error, Result};
use crate::types::{AttributeValue, Attributes};
use regex::Regex;

struct FilterBucket {
    pattern: String,
    filter: Regex,
    values: Attributes,
}

/// Store of global and action-filtered attributes
#[derive(Default)]
pub struct CustomAttributes {
    global: Attributes,
    buckets: Vec<FilterBucket>,
}

impl CustomAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute attached to every event.
    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) {
        self.global.insert(key.to_string(), value.into());
    }

    /// Set an attribute attached to events whose action name matches
    /// `filter`. If the same attribute is registered under overlapping
    /// filters, which bucket wins for a doubly-matched action is
    /// unspecified; filters are expected to be selective.
    pub fn set_filtered(
        &mut self,
        key: &str,
        value: impl Into<AttributeValue>,
        filter: &str,
    ) -> Result<()> {
        if let Some(bucket) = self.buckets.iter_mut().find(|b| b.pattern == filter) {
            bucket.values.insert(key.to_string(), value.into());
            return Ok(());
        }
        let compiled = Regex::new(filter).map_err(|source| Error::InvalidFilter {
            pattern: filter.to_string(),
            source,
        })?;
        let mut values = Attributes::new();
        values.insert(key.to_string(), value.into());
        self.buckets.push(FilterBucket {
            pattern: filter.to_string(),
            filter: compiled,
            values,
        });
        Ok(())
    }

    /// Merge every applicable attribute into `attributes`.
    pub fn apply(&self, action: &str, attributes: &mut Attributes) {
        for (key, value) in &self.global {
            attributes.insert(key.clone(), value.clone());
        }
        for bucket in &self.buckets {
            if bucket.filter.is_match(action) {
                for (key, value) in &bucket.values {
                    attributes.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl std::fmt::Debug for CustomAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomAttributes")
            .field("global", &self.global.len())
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_attribute_on_every_action() {
        let mut custom = CustomAttributes::new();
        custom.set("contentTitle", "Big Buck Bunny");

        let mut attrs = Attributes::new();
        custom.apply("CONTENT_START", &mut attrs);
        assert_eq!(attrs["contentTitle"].as_str(), Some("Big Buck Bunny"));

        let mut attrs = Attributes::new();
        custom.apply("anything", &mut attrs);
        assert!(attrs.contains_key("contentTitle"));
    }

    #[test]
    fn test_filtered_attribute_matches_subset() {
        let mut custom = CustomAttributes::new();
        custom
            .set_filtered("isLive", true, "^CONTENT_[A-Z_]+$")
            .unwrap();

        let mut attrs = Attributes::new();
        custom.apply("CONTENT_HEARTBEAT", &mut attrs);
        assert_eq!(attrs["isLive"].as_boolean(), Some(true));

        let mut attrs = Attributes::new();
        custom.apply("AD_HEARTBEAT", &mut attrs);
        assert!(!attrs.contains_key("isLive"));
    }

    #[test]
    fn test_same_filter_extends_bucket() {
        let mut custom = CustomAttributes::new();
        custom.set_filtered("a", 1i64, "^X$").unwrap();
        custom.set_filtered("b", 2i64, "^X$").unwrap();

        let mut attrs = Attributes::new();
        custom.apply("X", &mut attrs);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let mut custom = CustomAttributes::new();
        let err = custom.set_filtered("a", 1i64, "(").unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { .. }));
    }
}
