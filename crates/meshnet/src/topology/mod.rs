//! Topology model and canonicalizer.
//!
//! A [`Topology`] is a set of undirected links keyed by their sorted endpoint
//! pair. Nodes are derived from the links; a description of a link from `b`
//! to `a` and one from `a` to `b` with swapped shaping fields produce the same
//! canonical [`Link`].
//!
//! # Example
//!
//! ```ignore
//! use meshnet::topology::{Topology, TopologySource};
//!
//! let old = TopologySource::parse("none").load().await?;
//! let new = Topology::from_json(r#"{"links": [{"source": "b", "target": "a"}]}"#)?;
//! assert!(old.is_empty());
//! assert_eq!(new.nodes().len(), 2);
//! ```

mod parse;
mod types;

pub use parse::{LinkDescription, TopologyDescription};
pub use types::*;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Where a topology comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
    /// No topology: zero links.
    None,
    /// A JSON description file.
    File(PathBuf),
}

impl TopologySource {
    /// Keyword standing for the empty topology.
    pub const NONE: &'static str = "none";

    /// Interpret a command-line argument.
    pub fn parse(arg: &str) -> Self {
        if arg == Self::NONE {
            Self::None
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Check if this is the empty topology.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Read and canonicalize the topology.
    pub async fn load(&self) -> Result<Topology> {
        match self {
            Self::None => Ok(Topology::new()),
            Self::File(path) => load_file(path).await,
        }
    }
}

impl From<&str> for TopologySource {
    fn from(arg: &str) -> Self {
        Self::parse(arg)
    }
}

impl fmt::Display for TopologySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str(Self::NONE),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

async fn load_file(path: &Path) -> Result<Topology> {
    let bytes = tokio::fs::read(path).await?;
    Topology::from_slice(&bytes).map_err(|e| match e {
        Error::InvalidTopology(message) => {
            Error::InvalidTopology(format!("{}: {}", path.display(), message))
        }
        other => other,
    })
}
