//! Topology descriptions and their canonicalization.
//!
//! The external format is JSON:
//!
//! ```json
//! {
//!   "links": [
//!     { "source": "a", "target": "b", "source_tc": "netem delay 20ms" },
//!     { "source": "b", "target": "c" }
//!   ]
//! }
//! ```
//!
//! Identifiers may also be JSON numbers. Unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

use super::types::{Link, NodeName, ShapingSpec, Topology};
use crate::error::{Error, Result};

/// A topology as described by the user, before canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDescription {
    /// Link entries in input order.
    pub links: Vec<LinkDescription>,
}

/// One link entry of a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    /// First endpoint.
    #[serde(deserialize_with = "identifier")]
    pub source: String,
    /// Second endpoint.
    #[serde(deserialize_with = "identifier")]
    pub target: String,
    /// Shaping of traffic from `source` to `target`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tc: Option<String>,
    /// Shaping of traffic from `target` to `source`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_tc: Option<String>,
}

impl LinkDescription {
    /// Create an unshaped link entry.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_tc: None,
            target_tc: None,
        }
    }

    /// Shape traffic from source to target.
    pub fn source_tc(mut self, spec: impl Into<String>) -> Self {
        self.source_tc = Some(spec.into());
        self
    }

    /// Shape traffic from target to source.
    pub fn target_tc(mut self, spec: impl Into<String>) -> Self {
        self.target_tc = Some(spec.into());
        self
    }

    /// Validate and canonicalize this entry.
    pub fn canonicalize(&self) -> Result<Link> {
        Link::new(
            NodeName::new(self.source.as_str())?,
            NodeName::new(self.target.as_str())?,
            self.source_tc.clone().map(ShapingSpec::new).transpose()?,
            self.target_tc.clone().map(ShapingSpec::new).transpose()?,
        )
    }
}

impl TopologyDescription {
    /// Create an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link entry.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let topology = TopologyDescription::new()
    ///     .link("b", "a", |l| l.source_tc("netem delay 20ms"))
    ///     .link("b", "c", |l| l)
    ///     .build()?;
    /// ```
    pub fn link(
        mut self,
        source: &str,
        target: &str,
        f: impl FnOnce(LinkDescription) -> LinkDescription,
    ) -> Self {
        self.links.push(f(LinkDescription::new(source, target)));
        self
    }

    /// Parse a JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Parse a JSON description from raw bytes.
    ///
    /// Bytes that are not UTF-8 are reported like any other malformed input.
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|e| Error::invalid_topology(e.to_string()))
    }

    /// Canonicalize into a [`Topology`].
    pub fn build(&self) -> Result<Topology> {
        let links = self
            .links
            .iter()
            .map(LinkDescription::canonicalize)
            .collect::<Result<Vec<_>>>()?;
        Topology::from_links(links)
    }
}

impl Topology {
    /// Parse and canonicalize a JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        TopologyDescription::from_json(json)?.build()
    }

    /// Parse and canonicalize a JSON description from raw bytes.
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        TopologyDescription::from_slice(json)?.build()
    }
}

/// Accept identifiers written as JSON strings or numbers.
fn identifier<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Identifier {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Identifier::deserialize(deserializer)? {
        Identifier::Text(s) => s,
        Identifier::Number(n) => n.to_string(),
    })
}
