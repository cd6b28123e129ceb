//! Blog catalog tools.
//!
//! Tools: list-blog

use serde_json::{Map, Value as JsonValue};

use crate::convert::{entries_to_pretty_json, get_optional_i64, get_optional_string};
use crate::error::{McpError, Result};
use crate::query::{CatalogFilter, DEFAULT_LIMIT};
use crate::schema;
use crate::store::CatalogReader;
use crate::tools::ToolDef;

/// Validated `list-blog` input.
///
/// Defaults are substituted during parsing, before the handler runs, so the
/// handler only ever sees a complete request. `author: None` disables
/// filtering; `author: Some("")` is a real filter that matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBlogRequest {
    /// Case-insensitive substring to match against author names.
    pub author: Option<String>,
    /// Maximum number of entries to return.
    pub limit: i64,
}

impl ListBlogRequest {
    /// Parse and validate raw tool arguments.
    pub fn parse(args: &Map<String, JsonValue>) -> Result<Self> {
        let author = get_optional_string(args, "author")?;
        let limit = get_optional_i64(args, "limit")?.unwrap_or(DEFAULT_LIMIT);
        if limit < 0 {
            return Err(McpError::InvalidArg {
                name: "limit".into(),
                reason: format!("must be a non-negative integer, got {}", limit),
            });
        }
        Ok(Self { author, limit })
    }

    /// Translate the request into the store filter.
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            author: self.author.clone(),
        }
    }
}

/// Get all blog tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "list-blog",
        "List blog posts from the catalog. Pass author to keep only posts whose \
         author name contains the given text (case-insensitive); omit it to list \
         every post. Pass limit to bound the number of results (default 20). \
         Returns a count summary followed by the matching posts as JSON.",
        schema!(object {
            optional: { "author": string, "limit": integer }
        }),
    )]
}

/// Dispatch a blog tool call.
pub async fn dispatch(
    catalog: &dyn CatalogReader,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list-blog" => {
            let request = ListBlogRequest::parse(&args)?;
            let entries = catalog.find_filtered(&request.filter(), request.limit).await?;
            let body = format!(
                "{} results found:\n{}",
                entries.len(),
                entries_to_pretty_json(&entries)?
            );
            Ok(serde_json::json!({
                "content": [{ "type": "text", "text": body }]
            }))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
