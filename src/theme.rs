//! Themes
//!
//! A theme is a set of named style mappings holding fixed defaults,
//! consulted whenever a layer does not override them. Styles use the
//! same shape as aesthetic mappings (`AesMapping`), with every value a
//! parseable literal.

use crate::aes::AesMapping;

/// The stylable parameters of a plot.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub point_style: AesMapping,
    pub line_style: AesMapping,
    pub bar_style: AesMapping,
    pub text_style: AesMapping,
    pub rect_style: AesMapping,
    pub panel_bg: AesMapping,
    pub grid_major: AesMapping,
    pub grid_minor: AesMapping,
    pub strip: AesMapping,
    pub tic: AesMapping,
    pub tic_label: AesMapping,
    pub title: AesMapping,
    pub label: AesMapping,
}

impl Theme {
    /// The built-in defaults. Every key consulted by rendering has a
    /// value here, so merging against this theme never leaves a style
    /// unset.
    pub fn built_in() -> Theme {
        Theme {
            point_style: AesMapping::from([
                ("size", "5"),
                ("shape", "circle"),
                ("color", "#222222"),
                ("fill", "#222222"),
                ("alpha", "1"),
            ]),
            line_style: AesMapping::from([
                ("size", "2"),
                ("linetype", "solid"),
                ("color", "#222222"),
                ("alpha", "1"),
            ]),
            bar_style: AesMapping::from([
                ("linetype", "blank"),
                ("color", "gray20"),
                ("fill", "gray20"),
                ("alpha", "1"),
            ]),
            text_style: AesMapping::from([
                ("family", "Helvetica"),
                ("fontface", "regular"),
                ("lineheight", "15"),
                ("size", "12"),
                ("color", "black"),
                ("vjust", "0.5"),
                ("hjust", "0.5"),
                ("angle", "0"),
            ]),
            rect_style: AesMapping::from([
                ("linetype", "solid"),
                ("color", "gray50"),
                ("fill", "gray50"),
                ("alpha", "1"),
            ]),
            panel_bg: AesMapping::from([
                ("linetype", "blank"),
                ("color", "#00000000"),
                ("size", "0"),
                ("fill", "gray80"),
                ("alpha", "1"),
            ]),
            grid_major: AesMapping::from([
                ("linetype", "solid"),
                ("color", "white"),
                ("size", "2"),
                ("alpha", "1"),
            ]),
            grid_minor: AesMapping::from([
                ("linetype", "solid"),
                ("color", "white"),
                ("size", "1"),
                ("alpha", "1"),
            ]),
            strip: AesMapping::from([
                ("linetype", "blank"),
                ("color", "black"),
                ("size", "10 pt"),
                ("fill", "gray60"),
                ("alpha", "1"),
            ]),
            tic: AesMapping::from([
                ("linetype", "solid"),
                ("color", "gray40"),
                ("size", "2"),
                ("length", "2 mm"),
                ("alpha", "1"),
            ]),
            tic_label: AesMapping::from([
                ("color", "gray20"),
                ("size", "12 pt"),
                ("angle", "0"),
                ("sep", "0.5 mm"),
            ]),
            title: AesMapping::from([("color", "black"), ("size", "16 pt"), ("alpha", "1")]),
            label: AesMapping::from([("color", "black"), ("size", "14 pt"), ("alpha", "1")]),
        }
    }
}
