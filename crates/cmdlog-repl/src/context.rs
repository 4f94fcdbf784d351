//! Session state shared by every command
//!
//! Owned by the REPL loop and passed by `&mut` into each command, so there
//! is no global state and commands can be exercised in isolation.

use cmdlog_client::Transport;
use cmdlog_core::{
    FieldRegistry, HighlightMarkers, Palette, QueryBuilder, Renderer, SessionVariables,
};

/// Field registry, variables and the query pipeline for one REPL session
pub struct Session<T> {
    /// Fields and their render state
    pub registry: FieldRegistry,
    /// Variables consulted when building queries
    pub variables: SessionVariables,
    builder: QueryBuilder,
    renderer: Renderer,
    transport: T,
}

impl<T: Transport> Session<T> {
    /// Create a session with the default catalog, variables and colors
    pub fn new(transport: T) -> Self {
        Self::with_palette(transport, Palette::ansi())
    }

    pub fn with_palette(transport: T, palette: Palette) -> Self {
        // Builder and renderer must agree on the markers
        let markers = HighlightMarkers::default();
        Self {
            registry: FieldRegistry::with_default_catalog(),
            variables: SessionVariables::default(),
            builder: QueryBuilder::new(markers.clone()),
            renderer: Renderer::new(palette, markers),
            transport,
        }
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
