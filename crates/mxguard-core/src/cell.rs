//! Typed diagram cells.
//!
//! A draw.io model is a flat list of `mxCell` elements. Each one is a vertex,
//! an edge, or a plain structural cell (the root and layer cells), optionally
//! with a geometry and a parent for containment.

use crate::style::StyleMap;

/// Position and size of a cell in diagram units.
///
/// A coordinate that could not be read at all is `NaN`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geometry {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Rightmost horizontal coordinate covered by the cell: `x + width`.
    ///
    /// `None` when either value is unknown.
    pub fn horizontal_extent(&self) -> Option<f64> {
        let extent = self.x + self.width;
        extent.is_finite().then_some(extent)
    }
}

/// The cells an edge connects. Either end may be left dangling in the
/// source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeEndpoints {
    source: Option<String>,
    target: Option<String>,
}

impl EdgeEndpoints {
    pub fn new(source: Option<String>, target: Option<String>) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// What a cell represents in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    /// Root and layer cells, with neither `vertex` nor `edge` set.
    Plain,
    Vertex,
    Edge(EdgeEndpoints),
}

/// A single node or edge of a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    id: Option<String>,
    kind: CellKind,
    style: StyleMap,
    geometry: Option<Geometry>,
    parent: Option<String>,
}

impl Cell {
    /// Creates a cell with the given id and kind and no style, geometry or parent.
    pub fn new(id: Option<String>, kind: CellKind) -> Self {
        Self {
            id,
            kind,
            style: StyleMap::new(),
            geometry: None,
            parent: None,
        }
    }

    pub fn with_style(mut self, style: StyleMap) -> Self {
        self.style = style;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Returns the cell id, or `None` when the element carried no `id`.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the id for display, using a placeholder for unnamed cells.
    pub fn display_id(&self) -> &str {
        self.id().unwrap_or("<unnamed>")
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    pub fn style(&self) -> &StyleMap {
        &self.style
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.kind, CellKind::Edge(_))
    }

    /// Returns the endpoints if this cell is an edge.
    pub fn endpoints(&self) -> Option<&EdgeEndpoints> {
        match &self.kind {
            CellKind::Edge(endpoints) => Some(endpoints),
            _ => None,
        }
    }
}
