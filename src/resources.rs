//! Resource registry.
//!
//! Exposes one read-only resource: the full catalog snapshot at
//! `catalog://posts`, recomputed from the store on every read.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::convert::entries_to_pretty_json;
use crate::error::{McpError, Result};
use crate::store::CatalogReader;

/// URI of the catalog snapshot resource.
pub const CATALOG_URI: &str = "catalog://posts";

/// A resource definition for the MCP resources/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDef {
    /// Stable resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Resource description.
    pub description: String,
    /// Media type of the resource body.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Registry of available MCP resources.
pub struct ResourceRegistry {
    resources: Vec<ResourceDef>,
    catalog: Arc<dyn CatalogReader>,
}

impl ResourceRegistry {
    /// Create the resource registry over a catalog reader.
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self {
            resources: vec![ResourceDef {
                uri: CATALOG_URI.to_string(),
                name: "Blog posts".to_string(),
                description: "Every blog post in the catalog, unfiltered, as a JSON array"
                    .to_string(),
                mime_type: "application/json".to_string(),
            }],
            catalog,
        }
    }

    /// Get all resource definitions.
    pub fn resources(&self) -> &[ResourceDef] {
        &self.resources
    }

    /// Read a resource by URI, returning its serialized body.
    ///
    /// The snapshot is unbounded and unfiltered; an empty collection reads as
    /// `[]` rather than an error.
    pub async fn read(&self, uri: &str) -> Result<String> {
        if uri != CATALOG_URI {
            return Err(McpError::UnknownResource(uri.to_string()));
        }
        let entries = self.catalog.find_all().await?;
        entries_to_pretty_json(&entries)
    }
}
