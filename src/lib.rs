/*!
# layerplot - Layered Statistical Graphics

A grammar-of-graphics plot compiler. A declarative specification (a
dataset, aesthetic mappings, a stack of layers each carrying a
statistical transform and a geometric visual, plus optional faceting and
scales) is compiled through a fixed multi-pass pipeline into a grid of
panels populated with primitive graphical objects, ready to draw on an
abstract 2-D canvas.

## Example

```rust,ignore
use layerplot::{Plot, AesMapping, Layer, Geom, Stat};

let mut plot = Plot::new(frame, AesMapping::from([("x", "Height"), ("y", "Weight")]));
plot.title = Some("Sample 12.3".into());
plot.add_layer(Layer::with_geom(Geom::point()));
plot.add_layer(Layer {
    stat: Some(Stat::lin_reg()),
    geom: Some(Geom::abline()),
    ..Layer::default()
});
plot.compute()?;
plot.dump_to(&mut canvas, 800.0, 600.0)?;
```

## Architecture

The compilation pipeline runs eight ordered passes:

1. facet the data into a panel grid
2. per layer: prepare data (map aesthetics, transform, pre-train scales)
3. per layer: compute the statistical transform
4. wire stat output columns to geom input slots
5. construct geoms (position adjustment, reparametrization, re-training)
6. finalize scales (breaks, labels, mapping functions)
7. render fundamental geoms into grobs
8. render plot-level visuals (title, labels, strips, guides)

Drawing then lays out viewports and replays the grobs onto a [`Canvas`].

## Core Components

- [`data`] - column-store data frame with string interning
- [`aes`] - aesthetic mappings and style merging
- [`scale`] - scale training, transforms and finalization
- [`stat`] - statistical transforms
- [`geom`] - geometric visuals and position adjustments
- [`grob`] - primitive graphical objects
- [`plot`] - the pipeline driver, panels and layout
*/

pub mod aes;
pub mod canvas;
pub mod data;
pub mod facet;
pub mod geom;
pub mod grob;
pub mod plot;
pub mod pool;
pub mod scale;
pub mod stat;
pub mod style;
pub mod theme;

// Re-export key types for convenience
pub use aes::AesMapping;
pub use canvas::{Canvas, FontMetrics, SimpleMetrics, Viewport};
pub use data::{Column, DataFrame, FieldType, FrameSchema};
pub use facet::Faceting;
pub use geom::{Geom, Position};
pub use grob::Grob;
pub use plot::{Layer, Panel, Plot};
pub use pool::StringPool;
pub use scale::{Scale, Transform};
pub use stat::Stat;
pub use style::{Color, FontFace, LineType, PointShape};
pub use theme::Theme;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    /// Conversion to a data frame found no plottable field.
    #[error("unsupported data source: {0}")]
    UnsupportedDataSource(String),

    /// `append` was given frames with different column sets.
    #[error("schema mismatch appending {other} to {frame}")]
    SchemaMismatch { frame: String, other: String },

    /// A discrete-only operation was applied to a continuous column.
    #[error("field {field} in {frame} is not discrete")]
    NotDiscrete { frame: String, field: String },

    /// A facet field is continuous.
    #[error("cannot facet over continuous field {0}")]
    NotDiscreteFacet(String),

    /// A referenced field is absent from its frame.
    #[error("no field {field} in data frame {frame}")]
    MissingField { frame: String, field: String },

    /// A stat or geom is missing one of its needed aesthetics.
    #[error("{consumer} needs aesthetic {aes}")]
    MissingRequiredAes { consumer: String, aes: String },

    /// A stat configured to fail on extra fields saw extras.
    #[error("{stat} cannot handle extra fields {fields:?}")]
    ExcessFields { stat: String, fields: Vec<String> },

    /// A stat grouping on extra fields saw a continuous extra.
    #[error("{stat} cannot group on continuous field {field}")]
    NotDiscreteExtraFields { stat: String, field: String },

    /// A discrete scale was trained with bare values instead of a column.
    #[error("cannot train discrete scale {0} by value")]
    DiscreteTrainByValue(String),

    /// A non-identity transform was attached to a discrete or time scale.
    #[error("cannot transform {kind} scale for {aes}")]
    CannotTransform { aes: String, kind: &'static str },

    /// A numeric transform was applied to a string column.
    #[error("cannot apply function to string column {0}")]
    ApplyOnStringColumn(String),

    /// A style value failed to parse.
    #[error("bad style value {value:?} for {key}")]
    BadStyleValue { key: String, value: String },

    /// User-provided labels cannot be adjusted to the break count.
    #[error("{labels} labels for {breaks} breaks")]
    LabelCountMismatch { labels: usize, breaks: usize },
}

pub type Result<T> = std::result::Result<T, PlotError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
