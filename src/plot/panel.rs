//! Panels and layers
//!
//! A panel is one cell of the facet grid: it owns its filtered data,
//! its per-aesthetic scale handles and its layers. A layer is one stack
//! entry of the plot: optional own data, a stat, a geom, the three
//! aesthetic mappings wiring them together, and a position policy.

use std::collections::HashMap;

use crate::aes::AesMapping;
use crate::canvas::Viewport;
use crate::data::DataFrame;
use crate::geom::{Fundamental, Geom, Position};
use crate::grob::Grob;
use crate::scale::ScaleId;
use crate::stat::Stat;

/// One layer of data in a plot.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    /// Name used in diagnostics.
    pub name: String,

    /// Layer-local data; `None` inherits the panel's data.
    pub data: Option<DataFrame>,

    /// Maps data fields to aesthetics, merged over the plot mapping.
    pub data_mapping: AesMapping,

    /// Statistical transform; `None` is the identity.
    pub stat: Option<Stat>,

    /// Maps stat-produced fields to aesthetics.
    pub stat_mapping: AesMapping,

    /// The visual; cleared when the layer degrades.
    pub geom: Option<Geom>,

    /// Maps stat-output fields to the geom's input slot names.
    pub geom_mapping: AesMapping,

    /// Position adjustment applied during construction.
    pub position: Position,

    /// Fundamental geoms produced by construction.
    pub fundamentals: Vec<Fundamental>,

    /// Grobs produced by rendering.
    pub grobs: Vec<Grob>,
}

impl Layer {
    pub fn with_geom(geom: Geom) -> Layer {
        Layer {
            geom: Some(geom),
            ..Layer::default()
        }
    }
}

/// One cell of the facet grid.
#[derive(Debug, Default)]
pub struct Panel {
    pub name: String,

    /// This panel's slice of the plot data.
    pub data: DataFrame,

    pub layers: Vec<Layer>,

    /// Scale handles into the plot's arena. Shared aesthetics store the
    /// same id in every panel; free x/y scales store per-column or
    /// per-row copies.
    pub scales: HashMap<String, ScaleId>,

    /// Facet strip grobs, drawn above (top row) and beside (right
    /// column) the panel.
    pub top_grobs: Vec<Grob>,
    pub right_grobs: Vec<Grob>,

    /// Edge viewports for tick marks/labels and strips, set by layout.
    pub left_vp: Viewport,
    pub bottom_vp: Viewport,
    pub top_vp: Viewport,
    pub right_vp: Viewport,
}

impl Panel {
    pub(crate) fn new(name: String, data: DataFrame) -> Panel {
        Panel {
            name,
            data,
            ..Panel::default()
        }
    }
}
