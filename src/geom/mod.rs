//! Geometric visuals
//!
//! A geom interprets a data frame as a visual. Fundamental geoms
//! (point, line, abline, text, rect) render directly into grobs;
//! derived geoms (bar, boxplot) reparametrize into fundamentals during
//! construction, applying position adjustments and re-training the
//! scales their derived coordinates touch.
//!
//! # Architecture
//!
//! - `Geom`: enum of all geoms, the unit of dispatch
//! - `Fundamental`: a `(fundamental geom, data)` pair produced by
//!   construction and consumed by rendering
//! - [`position`]: the shared position-adjustment policies

use crate::aes::{merge_styles, AesMapping};
use crate::data::DataFrame;
use crate::grob::Grob;
use crate::scale::{ScalesMut, ScalesView};
use crate::theme::Theme;
use crate::Result;

mod abline;
mod bar;
mod boxplot;
mod line;
mod point;
pub mod position;
mod rect;
mod text;

pub use abline::GeomABLine;
pub use bar::GeomBar;
pub use boxplot::GeomBoxplot;
pub use line::GeomLine;
pub use point::GeomPoint;
pub use position::Position;
pub use rect::GeomRect;
pub use text::GeomText;

/// A geometric visual for one layer.
#[derive(Debug, Clone, Default)]
pub enum Geom {
    /// Placeholder that renders nothing; layers normally carry one of
    /// the real geoms below.
    #[default]
    Blank,
    Point(GeomPoint),
    Line(GeomLine),
    ABLine(GeomABLine),
    Text(GeomText),
    Rect(GeomRect),
    Bar(GeomBar),
    Boxplot(GeomBoxplot),
}

/// A fundamental geom together with the data it renders.
#[derive(Debug, Clone)]
pub struct Fundamental {
    pub geom: Geom,
    pub data: DataFrame,
}

impl Geom {
    pub fn point() -> Geom {
        Geom::Point(GeomPoint::default())
    }

    pub fn line() -> Geom {
        Geom::Line(GeomLine::default())
    }

    pub fn abline() -> Geom {
        Geom::ABLine(GeomABLine::default())
    }

    pub fn text() -> Geom {
        Geom::Text(GeomText::default())
    }

    pub fn rect() -> Geom {
        Geom::Rect(GeomRect::default())
    }

    pub fn bar() -> Geom {
        Geom::Bar(GeomBar::default())
    }

    pub fn boxplot() -> Geom {
        Geom::Boxplot(GeomBoxplot::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Geom::Blank => "blank",
            Geom::Point(_) => "point",
            Geom::Line(_) => "line",
            Geom::ABLine(_) => "abline",
            Geom::Text(_) => "text",
            Geom::Rect(_) => "rect",
            Geom::Bar(_) => "bar",
            Geom::Boxplot(_) => "boxplot",
        }
    }

    /// Input slots that must be present for construction.
    pub fn needed_slots(&self) -> &'static [&'static str] {
        match self {
            Geom::Blank => &[],
            Geom::Point(_) | Geom::Line(_) | Geom::Bar(_) => &["x", "y"],
            Geom::ABLine(_) => &["intercept", "slope"],
            Geom::Text(_) => &["x", "y", "text"],
            Geom::Rect(_) => &["xmin", "ymin", "xmax", "ymax"],
            Geom::Boxplot(_) => &["x", "min", "low", "q1", "mid", "q3", "high", "max"],
        }
    }

    /// Input slots used when present.
    pub fn optional_slots(&self) -> &'static [&'static str] {
        match self {
            Geom::Blank => &[],
            Geom::Point(_) => &["color", "size", "shape", "alpha"],
            Geom::Line(_) | Geom::ABLine(_) => &["color", "size", "linetype", "alpha"],
            Geom::Text(_) => &["color", "size", "alpha", "angle"],
            Geom::Rect(_) => &["fill", "color", "alpha", "linetype"],
            Geom::Bar(_) => &["fill", "color", "alpha", "linetype", "weight"],
            Geom::Boxplot(_) => &["outlier", "fill", "color", "alpha", "linetype"],
        }
    }

    /// The merged fixed aesthetics for rendering: the geom's own style
    /// over the user theme over the built-in defaults.
    pub fn aes(&self, theme: &Theme) -> AesMapping {
        let built_in = Theme::built_in();
        let empty = AesMapping::new();
        let (own, themed, fallback) = match self {
            Geom::Blank => (&empty, &theme.rect_style, built_in.rect_style),
            Geom::Point(g) => (&g.style, &theme.point_style, built_in.point_style),
            Geom::Line(g) => (&g.style, &theme.line_style, built_in.line_style),
            Geom::ABLine(g) => (&g.style, &theme.line_style, built_in.line_style),
            Geom::Text(g) => (&g.style, &theme.text_style, built_in.text_style),
            Geom::Rect(g) => (&g.style, &theme.rect_style, built_in.rect_style),
            Geom::Bar(g) => (&g.style, &theme.bar_style, built_in.bar_style),
            Geom::Boxplot(g) => (&g.style, &theme.rect_style, built_in.rect_style),
        };
        merge_styles(&[own, themed, &fallback])
    }

    /// Construction: apply the position adjustment, reparametrize
    /// derived geoms, and train any scales the produced coordinates
    /// touch. Returns the fundamental `(geom, data)` pairs to render.
    pub fn construct(
        &self,
        data: DataFrame,
        position: Position,
        scales: &mut ScalesMut<'_>,
    ) -> Result<Vec<Fundamental>> {
        match self {
            Geom::Blank => Ok(Vec::new()),
            Geom::Point(g) => g.construct(data, position, scales),
            Geom::Line(_) | Geom::Text(_) | Geom::Rect(_) => Ok(vec![Fundamental {
                geom: self.clone(),
                data,
            }]),
            Geom::ABLine(g) => g.construct(data, scales).map(|f| vec![f]),
            Geom::Bar(g) => g.construct(data, position, scales),
            Geom::Boxplot(g) => g.construct(data, scales),
        }
    }

    /// Rendering, for fundamental geoms only: interpret `data` through
    /// the finalized scales and emit grobs. Derived geoms have been
    /// reparametrized away by construction and render nothing.
    pub fn render(&self, data: &DataFrame, style: &AesMapping, scales: &ScalesView<'_>) -> Vec<Grob> {
        match self {
            Geom::Point(g) => g.render(data, style, scales),
            Geom::Line(g) => g.render(data, style, scales),
            Geom::ABLine(g) => g.render(data, style, scales),
            Geom::Text(g) => g.render(data, style, scales),
            Geom::Rect(g) => g.render(data, style, scales),
            Geom::Blank | Geom::Bar(_) | Geom::Boxplot(_) => Vec::new(),
        }
    }
}

impl std::fmt::Display for Geom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
