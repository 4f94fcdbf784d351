//! cmdlog-core: query construction and result rendering
//!
//! Translates a free-text query plus session variables into an Elasticsearch
//! search request, and a search response back into highlighted, column-ordered
//! terminal lines.

pub mod error;
pub mod fields;
pub mod palette;
pub mod query;
pub mod render;
pub mod response;
pub mod variables;

pub use error::CoreError;
pub use fields::{FieldKind, FieldRegistry, LogField};
pub use palette::Palette;
pub use query::{HighlightMarkers, QueryBuilder, QueryRequest, QueryShape};
pub use render::{Rendered, RenderedLine, RenderedLines, Renderer, SkipReason, SkippedField};
pub use response::{BackendError, Hit, QueryResponse};
pub use variables::SessionVariables;
