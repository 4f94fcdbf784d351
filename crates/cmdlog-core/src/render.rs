//! Response renderer - search hits to highlighted terminal lines
//!
//! Each hit becomes one line holding the enabled fields in display order.
//! A field that is missing or malformed in a hit is skipped for that hit
//! only and recorded on the line, it never stops the rest of the output.

use crate::fields::{FieldKind, FieldRegistry, LogField};
use crate::palette::Palette;
use crate::query::HighlightMarkers;
use crate::response::{BackendError, Hit, QueryResponse};
use serde_json::Value;
use std::fmt;

/// Minimum width of the log level column
pub const LEVEL_WIDTH: usize = 9;

/// Why a field was left out of a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not present in the hit's source
    Missing,
    /// Present but not renderable (null, object, empty array)
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    pub key: String,
    pub reason: SkipReason,
}

/// One rendered hit, without the trailing newline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub skipped: Vec<SkippedField>,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Result of rendering a response
pub enum Rendered<'a> {
    /// The backend rejected the request; one formatted line per root cause
    Errors(Vec<String>),
    /// One line per hit, produced on demand
    Lines(RenderedLines<'a>),
}

/// Single-pass iterator over rendered hits, in response order
pub struct RenderedLines<'a> {
    renderer: &'a Renderer,
    registry: &'a FieldRegistry,
    hits: std::slice::Iter<'a, Hit>,
}

impl Iterator for RenderedLines<'_> {
    type Item = RenderedLine;

    fn next(&mut self) -> Option<Self::Item> {
        let hit = self.hits.next()?;
        Some(self.renderer.render_hit(hit, self.registry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl ExactSizeIterator for RenderedLines<'_> {}

/// Formats hits using a palette and the markers the query was built with
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    palette: Palette,
    markers: HighlightMarkers,
}

impl Renderer {
    pub fn new(palette: Palette, markers: HighlightMarkers) -> Self {
        Self { palette, markers }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render a response against the registry's enabled fields
    pub fn render<'a>(
        &'a self,
        response: &'a QueryResponse,
        registry: &'a FieldRegistry,
    ) -> Rendered<'a> {
        if response.hits().is_empty() {
            let errors = response.backend_errors();
            if !errors.is_empty() {
                return Rendered::Errors(errors.iter().map(|e| self.error_line(e)).collect());
            }
        }

        Rendered::Lines(RenderedLines {
            renderer: self,
            registry,
            hits: response.hits().iter(),
        })
    }

    /// `error: <type>, <reason>` with the prefix in red
    pub fn error_line(&self, error: &BackendError) -> String {
        format!(
            "{} {}, {}",
            self.palette.paint(&self.palette.red, "error:"),
            error.error_type,
            error.reason
        )
    }

    /// Render one hit
    pub fn render_hit(&self, hit: &Hit, registry: &FieldRegistry) -> RenderedLine {
        let mut parts = Vec::new();
        let mut skipped = Vec::new();

        for field in registry.enabled() {
            match self.render_field(field, hit) {
                Ok(text) => parts.push(text),
                Err(reason) => skipped.push(SkippedField {
                    key: field.key.clone(),
                    reason,
                }),
            }
        }

        if !skipped.is_empty() {
            tracing::debug!("Skipped fields in hit: {:?}", skipped);
        }

        RenderedLine {
            text: parts.join(" "),
            skipped,
        }
    }

    fn render_field(&self, field: &LogField, hit: &Hit) -> Result<String, SkipReason> {
        match field.kind() {
            FieldKind::Tags => source_value(hit, &field.display_name),
            FieldKind::LogLevel => {
                let level = source_value(hit, &field.display_name)?;
                Ok(self.format_level(&level))
            }
            FieldKind::Plain => match hit.fragment(&field.display_name) {
                Some(fragment) => Ok(self.substitute_markers(trim_newline(fragment))),
                None => source_value(hit, &field.display_name),
            },
        }
    }

    /// Color a log level and pad it to the column width
    pub fn format_level(&self, level: &str) -> String {
        let pad = LEVEL_WIDTH.saturating_sub(level.chars().count());
        let painted = match self.palette.level_color(level) {
            Some(color) => self.palette.paint(color, level),
            None => level.to_string(),
        };
        format!("{}{}", painted, " ".repeat(pad))
    }

    /// Swap highlight markers for terminal color sequences
    pub fn substitute_markers(&self, fragment: &str) -> String {
        fragment
            .replace(self.markers.pre(), self.palette.highlight_start())
            .replace(self.markers.post(), &self.palette.reset)
    }
}

/// Extract a field from the hit's source as a single string
fn source_value(hit: &Hit, name: &str) -> Result<String, SkipReason> {
    let value = hit.source.get(name).ok_or(SkipReason::Missing)?;
    scalar(value)
}

/// Scalars print as-is, arrays flatten to their first element
fn scalar(value: &Value) -> Result<String, SkipReason> {
    match value {
        Value::String(s) => Ok(trim_newline(s).to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(items) => match items.first() {
            Some(Value::Array(_)) | None => Err(SkipReason::Malformed),
            Some(first) => scalar(first),
        },
        Value::Null | Value::Object(_) => Err(SkipReason::Malformed),
    }
}

fn trim_newline(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}
