//! Query builder - free text plus session variables to a search request
//!
//! Two request shapes exist: a plain `query_string` search, and the same
//! search intersected with a timestamp range filter. Every request is
//! constructed fresh, there is no shared template to mutate.

use crate::error::CoreError;
use crate::variables::{self, SessionVariables};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default marker inserted before a highlighted match
pub const DEFAULT_PRE_MARKER: &str = "<cmdlog:hl>";
/// Default marker inserted after a highlighted match
pub const DEFAULT_POST_MARKER: &str = "</cmdlog:hl>";

/// Document field the range filter applies to
pub const TIMESTAMP_FIELD: &str = "TimeStamp";
/// Date format of `gte`/`lte`, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "yyyy-MM-dd'T'HH:mm:ss.SSS";

const SORT_FIELD: &str = "@timestamp";
const DEFAULT_FIELD: &str = "text";
/// Large enough that the highlighter returns each field whole
const FRAGMENT_SIZE: i32 = i32::MAX;

/// Sentinels the backend wraps matches in.
///
/// They are replaced by terminal escapes at render time, so they must never
/// occur in real log text. Collisions are possible but unlikely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarkers {
    pre: String,
    post: String,
}

impl Default for HighlightMarkers {
    fn default() -> Self {
        Self {
            pre: DEFAULT_PRE_MARKER.to_string(),
            post: DEFAULT_POST_MARKER.to_string(),
        }
    }
}

impl HighlightMarkers {
    pub fn new(pre: impl Into<String>, post: impl Into<String>) -> Result<Self, CoreError> {
        let pre = pre.into();
        let post = post.into();

        if pre.is_empty() || post.is_empty() {
            return Err(CoreError::InvalidArgument(
                "highlight markers must not be empty".to_string(),
            ));
        }
        if pre == post {
            return Err(CoreError::InvalidArgument(
                "highlight markers must be distinct".to_string(),
            ));
        }

        Ok(Self { pre, post })
    }

    pub fn pre(&self) -> &str {
        &self.pre
    }

    pub fn post(&self) -> &str {
        &self.post
    }
}

/// Which request shape a search uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryShape {
    /// Text query only
    Plain,
    /// Text query limited to a timestamp window
    RangeFiltered { gte: String, lte: String },
}

impl QueryShape {
    /// Pick the shape from the `restricted` variable
    pub fn from_variables(vars: &SessionVariables) -> Result<Self, CoreError> {
        if !vars.is_restricted() {
            return Ok(QueryShape::Plain);
        }

        let bound = |key: &str| {
            vars.get(key).map(str::to_string).ok_or_else(|| {
                CoreError::InvalidArgument(format!("restricted query requires `{}`", key))
            })
        };

        Ok(QueryShape::RangeFiltered {
            gte: bound(variables::GTE)?,
            lte: bound(variables::LTE)?,
        })
    }
}

/// Search request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    /// Offset, passed through as given; the backend coerces it
    pub from: String,
    /// Page size, passed through as given
    pub size: String,
    pub highlight: Highlight,
    pub query: Query,
    pub sort: Vec<BTreeMap<String, SortOrder>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub pre_tags: Vec<String>,
    pub post_tags: Vec<String>,
    pub fields: BTreeMap<String, HighlightField>,
    pub require_field_match: bool,
    pub fragment_size: i32,
    pub number_of_fragments: u32,
}

/// Per-field highlight options, always empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightField {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    QueryString(QueryString),
    Bool(BoolQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryString {
    pub query: String,
    pub fields: Vec<String>,
    pub default_field: String,
    pub analyze_wildcard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolQuery {
    pub must: TextClause,
    pub filter: RangeFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextClause {
    pub query_string: QueryString,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeFilter {
    pub range: BTreeMap<String, RangeBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBounds {
    pub gte: String,
    pub lte: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortOrder {
    pub order: String,
}

impl QueryString {
    fn new(text: &str) -> Self {
        Self {
            query: text.to_string(),
            fields: vec!["*".to_string()],
            default_field: DEFAULT_FIELD.to_string(),
            analyze_wildcard: true,
        }
    }
}

impl Highlight {
    fn new(markers: &HighlightMarkers) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("*".to_string(), HighlightField {});

        Self {
            pre_tags: vec![markers.pre.clone()],
            post_tags: vec![markers.post.clone()],
            fields,
            require_field_match: false,
            fragment_size: FRAGMENT_SIZE,
            number_of_fragments: 1,
        }
    }
}

impl QueryRequest {
    /// Plain text search
    pub fn plain(text: &str, from: &str, size: &str, markers: &HighlightMarkers) -> Self {
        Self::with_query(Query::QueryString(QueryString::new(text)), from, size, markers)
    }

    /// Text search limited to `gte..=lte` on the timestamp field
    pub fn range_filtered(
        text: &str,
        gte: &str,
        lte: &str,
        from: &str,
        size: &str,
        markers: &HighlightMarkers,
    ) -> Self {
        let mut range = BTreeMap::new();
        range.insert(
            TIMESTAMP_FIELD.to_string(),
            RangeBounds {
                gte: gte.to_string(),
                lte: lte.to_string(),
                format: TIMESTAMP_FORMAT.to_string(),
            },
        );

        let query = Query::Bool(BoolQuery {
            must: TextClause {
                query_string: QueryString::new(text),
            },
            filter: RangeFilter { range },
        });

        Self::with_query(query, from, size, markers)
    }

    fn with_query(query: Query, from: &str, size: &str, markers: &HighlightMarkers) -> Self {
        let mut sort = BTreeMap::new();
        sort.insert(
            SORT_FIELD.to_string(),
            SortOrder {
                order: "desc".to_string(),
            },
        );

        Self {
            from: from.to_string(),
            size: size.to_string(),
            highlight: Highlight::new(markers),
            query,
            sort: vec![sort],
        }
    }

    /// The free text forwarded to the backend
    pub fn query_text(&self) -> &str {
        match &self.query {
            Query::QueryString(qs) => &qs.query,
            Query::Bool(b) => &b.must.query_string.query,
        }
    }

    pub fn shape(&self) -> QueryShape {
        match &self.query {
            Query::QueryString(_) => QueryShape::Plain,
            Query::Bool(b) => match b.filter.range.get(TIMESTAMP_FIELD) {
                Some(bounds) => QueryShape::RangeFiltered {
                    gte: bounds.gte.clone(),
                    lte: bounds.lte.clone(),
                },
                None => QueryShape::Plain,
            },
        }
    }

    /// Compact body sent over the wire
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented body for display
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds search requests from free text and session variables
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    markers: HighlightMarkers,
}

impl QueryBuilder {
    pub fn new(markers: HighlightMarkers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &HighlightMarkers {
        &self.markers
    }

    /// Build a request for `text`. Fails when the text is blank.
    pub fn build(&self, text: &str, vars: &SessionVariables) -> Result<QueryRequest, CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "query text must not be empty".to_string(),
            ));
        }

        let from = vars.get(variables::FROM).unwrap_or(variables::DEFAULT_FROM);
        let size = vars.get(variables::SIZE).unwrap_or(variables::DEFAULT_SIZE);

        let request = match QueryShape::from_variables(vars)? {
            QueryShape::Plain => QueryRequest::plain(text, from, size, &self.markers),
            QueryShape::RangeFiltered { gte, lte } => {
                QueryRequest::range_filtered(text, &gte, &lte, from, size, &self.markers)
            }
        };

        tracing::debug!(
            "Built {:?} query: from={}, size={}",
            request.shape(),
            request.from,
            request.size
        );

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn restricted_vars() -> SessionVariables {
        let mut vars = SessionVariables::default();
        vars.set("restricted", "1");
        vars.set("gte", "2016-09-01T00:00:00.000");
        vars.set("lte", "2016-09-02T12:30:00.500");
        vars
    }

    #[test]
    fn plain_query_carries_text_verbatim() {
        let builder = QueryBuilder::default();
        let vars = SessionVariables::default();
        let text = "Host:gas06 AND text:fullauto AND tags:AOS64";

        let request = builder.build(text, &vars).unwrap();
        assert_eq!(request.query_text(), text);
        assert_eq!(request.shape(), QueryShape::Plain);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["query"]["query_string"]["query"], json!(text));
        assert_eq!(body["query"]["query_string"]["default_field"], json!("text"));
        assert_eq!(body["query"]["query_string"]["fields"], json!(["*"]));
        assert_eq!(body["query"]["query_string"]["analyze_wildcard"], json!(true));
        assert!(body["query"].get("bool").is_none());
    }

    #[test]
    fn plain_query_body_layout() {
        let builder = QueryBuilder::default();
        let request = builder.build("host:gas06", &SessionVariables::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["from"], json!("0"));
        assert_eq!(body["size"], json!("50"));
        assert_eq!(body["sort"], json!([{ "@timestamp": { "order": "desc" } }]));
        assert_eq!(body["highlight"]["pre_tags"], json!([DEFAULT_PRE_MARKER]));
        assert_eq!(body["highlight"]["post_tags"], json!([DEFAULT_POST_MARKER]));
        assert_eq!(body["highlight"]["fields"], json!({ "*": {} }));
        assert_eq!(body["highlight"]["require_field_match"], json!(false));
        assert_eq!(body["highlight"]["fragment_size"], json!(2147483647));
    }

    #[test]
    fn restricted_query_nests_text_under_range_filter() {
        let builder = QueryBuilder::default();
        let request = builder.build("text:fullauto", &restricted_vars()).unwrap();

        assert_eq!(
            request.shape(),
            QueryShape::RangeFiltered {
                gte: "2016-09-01T00:00:00.000".to_string(),
                lte: "2016-09-02T12:30:00.500".to_string(),
            }
        );

        let body = serde_json::to_value(&request).unwrap();
        assert!(body["query"].get("query_string").is_none());
        assert_eq!(
            body["query"]["bool"]["must"]["query_string"]["query"],
            json!("text:fullauto")
        );
        let range = &body["query"]["bool"]["filter"]["range"]["TimeStamp"];
        assert_eq!(range["gte"], json!("2016-09-01T00:00:00.000"));
        assert_eq!(range["lte"], json!("2016-09-02T12:30:00.500"));
        assert_eq!(range["format"], json!(TIMESTAMP_FORMAT));
    }

    #[test]
    fn restricted_without_bounds_is_rejected() {
        let builder = QueryBuilder::default();
        let mut vars = SessionVariables::empty();
        vars.set("restricted", "1");
        vars.set("gte", "now-1h");

        let err = builder.build("anything", &vars).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(msg) if msg.contains("lte")));
    }

    #[test]
    fn empty_text_is_invalid() {
        let builder = QueryBuilder::default();
        let vars = SessionVariables::default();
        assert!(matches!(
            builder.build("", &vars),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            builder.build("   ", &vars),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn pagination_is_passed_through_verbatim() {
        let builder = QueryBuilder::default();
        let mut vars = SessionVariables::default();
        vars.set("from", "20");
        vars.set("size", "ten");

        let request = builder.build("x", &vars).unwrap();
        assert_eq!(request.from, "20");
        assert_eq!(request.size, "ten");
    }

    #[test]
    fn missing_pagination_falls_back_to_defaults() {
        let builder = QueryBuilder::default();
        let request = builder.build("x", &SessionVariables::empty()).unwrap();
        assert_eq!(request.from, "0");
        assert_eq!(request.size, "50");
    }

    #[test]
    fn build_is_idempotent() {
        let builder = QueryBuilder::default();
        for vars in [SessionVariables::default(), restricted_vars()] {
            let a = builder.build("host:gas06", &vars).unwrap().to_json().unwrap();
            let b = builder.build("host:gas06", &vars).unwrap().to_json().unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn custom_markers_reach_the_highlight_config() {
        let markers = HighlightMarkers::new("<mark>", "</mark>").unwrap();
        let builder = QueryBuilder::new(markers);
        let request = builder.build("x", &SessionVariables::default()).unwrap();
        assert_eq!(request.highlight.pre_tags, vec!["<mark>".to_string()]);
        assert_eq!(request.highlight.post_tags, vec!["</mark>".to_string()]);
    }

    #[test]
    fn markers_must_be_distinct_and_non_empty() {
        assert!(HighlightMarkers::new("", "x").is_err());
        assert!(HighlightMarkers::new("x", "").is_err());
        assert!(HighlightMarkers::new("same", "same").is_err());
        assert!(HighlightMarkers::new("a", "b").is_ok());
    }
}
