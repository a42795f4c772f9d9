//! Viewport layout and drawing
//!
//! Drawing partitions the canvas into viewports: title bar on top,
//! y-label strip on the left, x-label strip on the bottom, the legend
//! strip on the right, and an equal-size panel grid in the middle
//! surrounded by tick strips (left and bottom edges) and facet strips
//! (top row, right column). Canvas y grows upward; panel row 0 sits at
//! the bottom.

use crate::aes::merge_styles;
use crate::canvas::{Canvas, Viewport};
use crate::grob::Grob;
use crate::style::{parse_color, parse_float, parse_linetype, LineType, MM};
use crate::theme::Theme;

use super::Plot;

/// Padding around titles, labels and guides.
const PAD: f64 = 2.0 * MM;

impl Plot {
    /// Compute the viewports of every component for a canvas of
    /// `width` x `height`.
    pub(super) fn layout(&mut self, width: f64, height: f64) {
        self.viewports.clear();

        let title_h = match self.grobs.get("Title") {
            Some(_) => self.render_info["Title.Height"] + PAD,
            None => 0.0,
        };
        let ylabel_w = match self.grobs.get("Y-Label") {
            Some(_) => self.render_info["Y-Label.Width"] + PAD,
            None => 0.0,
        };
        let xlabel_h = match self.grobs.get("X-Label") {
            Some(_) => self.render_info["X-Label.Height"] + PAD,
            None => 0.0,
        };
        let guides_w = match self.grobs.get("Guides") {
            Some(_) => self.render_info["Guides.Width"] + 2.0 * PAD,
            None => 0.0,
        };

        self.viewports.insert(
            "Title".into(),
            Viewport::new(0.0, height - title_h, width, title_h),
        );
        self.viewports.insert(
            "Y-Label".into(),
            Viewport::new(0.0, xlabel_h, ylabel_w, height - title_h - xlabel_h),
        );
        self.viewports.insert(
            "X-Label".into(),
            Viewport::new(ylabel_w, 0.0, width - ylabel_w - guides_w, xlabel_h),
        );
        // Guide grobs are in canvas units; a unit-scaled viewport maps
        // them through unchanged.
        self.viewports.insert(
            "Guides".into(),
            Viewport::new(width - guides_w + PAD, xlabel_h, 1.0, 1.0),
        );

        let (ytics_w, xtics_h) = self.tics_extents();
        let collab_h = self
            .render_info
            .get("Col-Strip.Height")
            .map_or(0.0, |h| h + PAD);
        let rowlab_w = self
            .render_info
            .get("Row-Strip.Width")
            .map_or(0.0, |w| w + PAD);

        let sep_x = 2.0 * MM;
        let sep_y = 2.0 * MM;
        let nrows = self.panels.len();
        let ncols = self.panels[0].len();
        let total_w = width - ylabel_w - guides_w - ytics_w - rowlab_w;
        let total_h = height - title_h - xlabel_h - collab_h - xtics_h;
        let panel_w = (total_w - sep_x * (ncols - 1) as f64) / ncols as f64;
        let panel_h = (total_h - sep_y * (nrows - 1) as f64) / nrows as f64;
        let x0 = ylabel_w + ytics_w;
        let y0 = xlabel_h + xtics_h;

        for r in 0..nrows {
            for c in 0..ncols {
                let x = x0 + c as f64 * (panel_w + sep_x);
                let y = y0 + r as f64 * (panel_h + sep_y);
                self.viewports.insert(
                    format!("Panel-{},{}", r, c),
                    Viewport::new(x, y, panel_w, panel_h),
                );
            }
        }

        // Tick strips on the left and bottom edges, facet strips on the
        // top row and right column.
        for r in 0..nrows {
            let y = y0 + r as f64 * (panel_h + sep_y);
            self.panels[r][0].left_vp = Viewport::new(ylabel_w, y, ytics_w, panel_h);
            self.panels[r][ncols - 1].right_vp =
                Viewport::new(width - guides_w - rowlab_w, y, rowlab_w, panel_h);
        }
        for c in 0..ncols {
            let x = x0 + c as f64 * (panel_w + sep_x);
            self.panels[0][c].bottom_vp = Viewport::new(x, xlabel_h, panel_w, xtics_h);
            self.panels[nrows - 1][c].top_vp =
                Viewport::new(x, height - title_h - collab_h, panel_w, collab_h);
        }
    }

    /// Width of the y tick labels and height of the x tick labels,
    /// measured over the edge panels.
    fn tics_extents(&self) -> (f64, f64) {
        let built_in = Theme::built_in();
        let label = merge_styles(&[&self.theme.tic_label, &built_in.tic_label]);
        let size = parse_float(label.get("size").unwrap_or("12"), 4.0, 36.0);
        let sep = parse_float(label.get("sep").unwrap_or("0"), 0.0, 100.0);
        let tic = merge_styles(&[&self.theme.tic, &built_in.tic]);
        let length = parse_float(tic.get("length").unwrap_or("0"), 0.0, 100.0);

        let measure = |text: &str| {
            Grob::Text {
                x: 0.0,
                y: 0.0,
                text: text.to_string(),
                size,
                color: parse_color("black"),
                angle: 0.0,
                hjust: 0.0,
                vjust: 0.0,
                font: "Helvetica".into(),
                lineheight: 15.0,
            }
            .bounding_box(self.metrics.as_ref())
        };

        let mut ywidth: f64 = 0.0;
        for row in &self.panels {
            if let Some(scale) = row[0].scales.get("y").map(|id| self.scales.get(*id)) {
                for l in &scale.labels {
                    ywidth = ywidth.max(measure(l).0);
                }
            }
        }
        let mut xheight: f64 = 0.0;
        for c in 0..self.panels[0].len() {
            if let Some(scale) = self.panels[0][c].scales.get("x").map(|id| self.scales.get(*id)) {
                for l in &scale.labels {
                    xheight = xheight.max(measure(l).1);
                }
            }
        }
        (ywidth + length + sep, xheight + length + sep)
    }

    /// Replay every grob onto the canvas.
    pub(super) fn draw(&self, canvas: &mut dyn Canvas) {
        for element in ["Title", "X-Label", "Y-Label", "Guides"] {
            if let (Some(grob), Some(vp)) = (self.grobs.get(element), self.viewports.get(element)) {
                grob.draw(vp, canvas);
            }
        }

        for r in 0..self.panels.len() {
            let show_x = r == 0;
            for c in 0..self.panels[r].len() {
                let show_y = c == 0;
                let vp = self.viewports[&format!("Panel-{},{}", r, c)];
                self.draw_panel(r, c, &vp, show_x, show_y, canvas);
            }
        }
    }

    /// One panel: strips, background, grid, ticks, then the layers.
    fn draw_panel(
        &self,
        r: usize,
        c: usize,
        vp: &Viewport,
        show_x: bool,
        show_y: bool,
        canvas: &mut dyn Canvas,
    ) {
        let panel = &self.panels[r][c];
        let built_in = Theme::built_in();

        for grob in &panel.top_grobs {
            grob.draw(&panel.top_vp, canvas);
        }
        for grob in &panel.right_grobs {
            grob.draw(&panel.right_vp, canvas);
        }

        // Background and border.
        let bg = merge_styles(&[&self.theme.panel_bg, &built_in.panel_bg]);
        Grob::Rect {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 1.0,
            ymax: 1.0,
            fill: parse_color(bg.get("fill").unwrap_or("")),
        }
        .draw(vp, canvas);
        let border_lt = parse_linetype(bg.get("linetype").unwrap_or("blank"));
        if border_lt != LineType::Blank {
            Grob::Path {
                points: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
                size: parse_float(bg.get("size").unwrap_or("0"), 0.0, 20.0),
                linetype: border_lt,
                color: parse_color(bg.get("color").unwrap_or("")),
            }
            .draw(vp, canvas);
        }

        // Major grid lines plus edge ticks and labels.
        let major = merge_styles(&[&self.theme.grid_major, &built_in.grid_major]);
        let major_lt = parse_linetype(major.get("linetype").unwrap_or("solid"));
        let major_size = parse_float(major.get("size").unwrap_or("2"), 0.0, 20.0);
        let major_col = parse_color(major.get("color").unwrap_or("white"));

        let tic = merge_styles(&[&self.theme.tic, &built_in.tic]);
        let tic_lt = parse_linetype(tic.get("linetype").unwrap_or("solid"));
        let tic_col = parse_color(tic.get("color").unwrap_or("gray40"));
        let tic_len = parse_float(tic.get("length").unwrap_or("0"), 0.0, 1000.0);
        let tic_size = parse_float(tic.get("size").unwrap_or("2"), 0.0, 100.0);

        let label = merge_styles(&[&self.theme.tic_label, &built_in.tic_label]);
        let label_angle = parse_float(label.get("angle").unwrap_or("0"), 0.0, std::f64::consts::TAU);
        let label_col = parse_color(label.get("color").unwrap_or("gray20"));
        let label_sep = parse_float(label.get("sep").unwrap_or("0"), 0.0, 1000.0);
        let label_size = parse_float(label.get("size").unwrap_or("12"), 0.0, 100.0);

        let text = |x: f64, y: f64, s: &str, hjust: f64, vjust: f64, angle: f64| Grob::Text {
            x,
            y,
            text: s.to_string(),
            size: label_size,
            color: label_col,
            angle,
            hjust,
            vjust,
            font: "Helvetica".into(),
            lineheight: 15.0,
        };

        if let Some(sx) = panel.scales.get("x").map(|id| self.scales.get(*id)) {
            let (h, sep) = (tic_len / vp.height, label_sep / vp.height);
            for (i, b) in sx.breaks.iter().enumerate() {
                let xv = sx.pos(*b);
                Grob::Line {
                    x0: xv,
                    y0: 0.0,
                    x1: xv,
                    y1: 1.0,
                    size: major_size,
                    linetype: major_lt,
                    color: major_col,
                }
                .draw(vp, canvas);
                if !show_x {
                    continue;
                }
                Grob::Line {
                    x0: xv,
                    y0: 0.0,
                    x1: xv,
                    y1: -h,
                    size: tic_size,
                    linetype: tic_lt,
                    color: tic_col,
                }
                .draw(vp, canvas);
                text(xv, -h - sep, &sx.labels[i], 0.5, 1.0, label_angle).draw(vp, canvas);
            }
        }
        if let Some(sy) = panel.scales.get("y").map(|id| self.scales.get(*id)) {
            let (w, sep) = (tic_len / vp.width, label_sep / vp.width);
            for (i, b) in sy.breaks.iter().enumerate() {
                let yv = sy.pos(*b);
                Grob::Line {
                    x0: 0.0,
                    y0: yv,
                    x1: 1.0,
                    y1: yv,
                    size: major_size,
                    linetype: major_lt,
                    color: major_col,
                }
                .draw(vp, canvas);
                if !show_y {
                    continue;
                }
                Grob::Line {
                    x0: 0.0,
                    y0: yv,
                    x1: -w,
                    y1: yv,
                    size: tic_size,
                    linetype: tic_lt,
                    color: tic_col,
                }
                .draw(vp, canvas);
                text(-w - sep, yv, &sy.labels[i], 1.0, 0.5, 0.0).draw(vp, canvas);
            }
        }

        for layer in &panel.layers {
            for grob in &layer.grobs {
                grob.draw(vp, canvas);
            }
        }
    }
}
