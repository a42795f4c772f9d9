//! The pipeline driver
//!
//! [`Plot`] owns the global data, the facet specification, the scale
//! arena and templates, the panel grid, the theme and the plot-level
//! grobs. [`Plot::compute`] runs the eight ordered passes that turn the
//! declarative spec into renderable panels:
//!
//! 1. panel creation and data faceting
//! 2. data preparation (mapping, transforms, scale pre-training)
//! 3. statistical transforms
//! 4. wiring stat outputs to geom inputs
//! 5. geom construction
//! 6. scale finalization
//! 7. geom rendering
//! 8. plot-level visuals
//!
//! Each pass completes across the whole grid before the next begins;
//! every pass only reads what earlier passes produced.

use std::collections::HashMap;
use std::sync::Arc;

use crate::aes::{merge_aes, merge_styles, AesMapping};
use crate::canvas::{Canvas, FontMetrics, SimpleMetrics, Viewport};
use crate::data::{DataFrame, FieldType, FrameSchema};
use crate::facet::Faceting;
use crate::grob::Grob;
use crate::pool::StringPool;
use crate::scale::{Scale, ScaleArena, ScalesMut};
use crate::stat::{apply_with_policy, StatContext};
use crate::style::{parse_color, parse_float};
use crate::theme::Theme;
use crate::{PlotError, Result};

mod layout;
mod panel;

pub use panel::{Layer, Panel};

/// Aesthetics that own a scale.
const SCALEABLE: [&str; 8] = [
    "x", "y", "color", "fill", "alpha", "size", "linetype", "shape",
];

/// A whole plot: the declarative spec plus everything the pipeline
/// derives from it.
pub struct Plot {
    pub title: Option<String>,

    /// The data to draw. Layers without own data inherit it.
    pub data: DataFrame,

    pub faceting: Faceting,

    /// Maps fields of `data` to aesthetics.
    pub aes: AesMapping,

    /// The layer specs; faceting clones them into every panel.
    pub layers: Vec<Layer>,

    pub theme: Theme,

    /// String pool shared by all frames of this plot.
    pub pool: Arc<StringPool>,

    /// Font measurement used for visuals and layout.
    pub metrics: Box<dyn FontMetrics>,

    /// All live scale instances; panels hold ids into this arena.
    scales: ScaleArena,

    /// Template copy per aesthetic, cloned into the arena on
    /// distribution.
    templates: HashMap<String, Scale>,

    /// The facet grid, populated by pass 1.
    pub panels: Vec<Vec<Panel>>,

    /// Plot-level grobs (title, axis labels, guides).
    grobs: HashMap<String, Grob>,

    /// Extents measured while rendering visuals, consumed by layout.
    render_info: HashMap<String, f64>,

    /// Viewports assigned by layout.
    viewports: HashMap<String, Viewport>,

    constructed: bool,
}

impl Plot {
    /// A plot over an already-built data frame.
    pub fn new(data: DataFrame, aes: AesMapping) -> Plot {
        let pool = Arc::clone(&data.pool);
        Plot {
            title: None,
            data,
            faceting: Faceting::default(),
            aes,
            layers: Vec::new(),
            theme: Theme::built_in(),
            pool,
            metrics: Box::new(SimpleMetrics),
            scales: ScaleArena::default(),
            templates: HashMap::new(),
            panels: Vec::new(),
            grobs: HashMap::new(),
            render_info: HashMap::new(),
            viewports: HashMap::new(),
            constructed: false,
        }
    }

    /// A plot over records converted through an explicit schema.
    pub fn from_records<R>(
        rows: &[R],
        schema: &FrameSchema<R>,
        aes: AesMapping,
    ) -> Result<Plot> {
        let pool = Arc::new(StringPool::new());
        let data = schema.build(rows, &pool)?;
        Ok(Plot::new(data, aes))
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Install a template scale (fixed domain, transform, manual
    /// breaks) for its aesthetic.
    pub fn set_scale(&mut self, scale: Scale) {
        self.templates.insert(scale.aesthetic.clone(), scale);
    }

    /// The finalized scale serving `aesthetic` in panel (row, col).
    pub fn panel_scale(&self, row: usize, col: usize, aesthetic: &str) -> Option<&Scale> {
        let id = self.panels.get(row)?.get(col)?.scales.get(aesthetic)?;
        Some(self.scales.get(*id))
    }

    /// Facet the data, run the statistics, construct the geoms, scale
    /// the axes and render everything renderable without a canvas.
    /// Idempotent.
    pub fn compute(&mut self) -> Result<()> {
        if self.constructed {
            return Ok(());
        }

        self.create_panels()?; // pass 1
        self.prepare_data()?; // pass 2
        self.compute_statistics(); // pass 3
        self.wire_stat_to_geom()?; // pass 4
        self.construct_geoms(); // pass 5
        self.finalize_scales()?; // pass 6
        self.render_geoms(); // pass 7
        self.render_visuals(); // pass 8

        self.constructed = true;
        Ok(())
    }

    /// Run the pipeline if needed, lay out viewports for `width` x
    /// `height` and draw everything onto `canvas`.
    pub fn dump_to(&mut self, canvas: &mut dyn Canvas, width: f64, height: f64) -> Result<()> {
        self.compute()?;
        self.layout(width, height);
        self.draw(canvas);
        Ok(())
    }

    // =====================================================================
    // Pass 1: panel creation and faceting

    fn create_panels(&mut self) -> Result<()> {
        if self.faceting.is_grid() {
            self.create_grid_panels()
        } else {
            self.create_single_panel();
            Ok(())
        }
    }

    fn create_single_panel(&mut self) {
        let mut panel = Panel::new("0/0".to_string(), self.data.clone());
        panel.layers = self.layers.clone();
        self.panels = vec![vec![panel]];
    }

    /// Levels of a facet field rendered to strip labels; fails on
    /// continuous fields.
    fn facet_levels(&self, field: &str) -> Result<(Vec<f64>, Vec<String>)> {
        let col = self
            .data
            .columns
            .get(field)
            .ok_or_else(|| PlotError::NotDiscreteFacet(field.to_string()))?;
        if !col.discrete() {
            return Err(PlotError::NotDiscreteFacet(field.to_string()));
        }
        let levels = self.data.levels(field)?;
        let strips = col.format_values(&levels);
        Ok((levels, strips))
    }

    fn create_grid_panels(&mut self) -> Result<()> {
        let (row_levels, row_strips) = if self.faceting.rows.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            self.facet_levels(&self.faceting.rows.clone())?
        };
        let (col_levels, col_strips) = if self.faceting.columns.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            self.facet_levels(&self.faceting.columns.clone())?
        };
        self.faceting.row_strips = row_strips;
        self.faceting.col_strips = col_strips;

        let nrows = row_levels.len().max(1);
        let ncols = col_levels.len().max(1);
        let row_field = self.faceting.rows.clone();
        let col_field = self.faceting.columns.clone();
        let totals = self.faceting.totals;

        let filter_on = |df: &DataFrame, field: &str, levels: &[f64], i: usize| -> DataFrame {
            if field.is_empty() {
                df.clone()
            } else {
                df.filter(field, levels[i])
            }
        };

        let mut panels: Vec<Vec<Panel>> = Vec::new();
        for r in 0..nrows {
            let row_data = filter_on(&self.data, &row_field, &row_levels, r);
            let mut row = Vec::new();
            for c in 0..ncols {
                let mut panel = Panel::new(
                    format!("{}/{}", r, c),
                    filter_on(&row_data, &col_field, &col_levels, c),
                );
                panel.layers = self
                    .layers
                    .iter()
                    .map(|orig| {
                        let mut layer = orig.clone();
                        if let Some(data) = &orig.data {
                            let by_row = filter_on(data, &row_field, &row_levels, r);
                            layer.data = Some(filter_on(&by_row, &col_field, &col_levels, c));
                        }
                        layer
                    })
                    .collect();
                row.push(panel);
            }
            if totals {
                // Rightmost column: all of this row's data.
                let mut panel = Panel::new(format!("{}/-all-", r), row_data.clone());
                panel.layers = self
                    .layers
                    .iter()
                    .map(|orig| {
                        let mut layer = orig.clone();
                        if let Some(data) = &orig.data {
                            layer.data = Some(filter_on(data, &row_field, &row_levels, r));
                        }
                        layer
                    })
                    .collect();
                row.push(panel);
            }
            panels.push(row);
        }
        if totals {
            // Bottom row: all of each column's data, plus everything in
            // the corner.
            let mut row = Vec::new();
            for c in 0..ncols {
                let col_data = filter_on(&self.data, &col_field, &col_levels, c);
                let mut panel = Panel::new(format!("-all-/{}", c), col_data);
                panel.layers = self
                    .layers
                    .iter()
                    .map(|orig| {
                        let mut layer = orig.clone();
                        if let Some(data) = &orig.data {
                            layer.data = Some(filter_on(data, &col_field, &col_levels, c));
                        }
                        layer
                    })
                    .collect();
                row.push(panel);
            }
            let mut panel = Panel::new("-all-/-all-".to_string(), self.data.clone());
            panel.layers = self.layers.clone();
            row.push(panel);
            panels.push(row);
        }

        self.panels = panels;
        Ok(())
    }

    // =====================================================================
    // Pass 2: data preparation

    fn prepare_data(&mut self) -> Result<()> {
        // 2a: give every layer its own frame holding exactly the mapped
        // columns, renamed to their aesthetic names.
        for row in &mut self.panels {
            for panel in row {
                for layer in &mut panel.layers {
                    if layer.data.is_none() {
                        layer.data = Some(panel.data.clone());
                    }
                    let merged = merge_aes(&[&layer.data_mapping, &self.aes]);
                    let data = layer.data.as_mut().unwrap();
                    let (_, fields) = merged.used(false);
                    for f in data.field_names() {
                        if !fields.contains(&f) {
                            data.delete(&f);
                        }
                    }
                    for (aes, field) in merged.iter() {
                        data.rename(field, aes);
                    }
                }
            }
        }

        // 2b: make sure every mapped scaleable aesthetic has a
        // distributed scale. The merged mapping is recomputed from the
        // specs; its keys are the aesthetic names the columns now carry.
        let plot_aes = self.aes.clone();
        let merged_of =
            move |layer: &Layer| merge_aes(&[&layer.data_mapping, &plot_aes]);
        let requests = self.collect_scale_requests(&merged_of);
        self.ensure_scales(&requests);

        // 2c: apply scale transforms to the mapped columns and
        // pre-train the panel scales.
        self.transform_and_train(&merged_of)
    }

    /// Scan panels for scaleable aesthetics that are mapped to a column
    /// but have no panel scale yet. First occurrence fixes the scale's
    /// name and domain type.
    fn collect_scale_requests(
        &self,
        mapping_of: impl Fn(&Layer) -> AesMapping,
    ) -> Vec<(String, String, FieldType)> {
        let mut requests: Vec<(String, String, FieldType)> = Vec::new();
        for row in &self.panels {
            for panel in row {
                for layer in &panel.layers {
                    let Some(data) = &layer.data else { continue };
                    let mapping = mapping_of(layer);
                    let (aes_names, _) = mapping.used(true);
                    for aes in aes_names {
                        if !SCALEABLE.contains(&aes.as_str())
                            || panel.scales.contains_key(&aes)
                            || requests.iter().any(|(a, _, _)| *a == aes)
                        {
                            continue;
                        }
                        let Some(col) = data.columns.get(&aes) else {
                            continue;
                        };
                        let name = mapping.get(&aes).unwrap_or("").to_string();
                        requests.push((aes, name, col.ftype));
                    }
                }
            }
        }
        requests
    }

    /// Create missing templates and distribute instances to the
    /// panels: one shared instance per aesthetic, except free x/y which
    /// get per-column/per-row copies.
    fn ensure_scales(&mut self, requests: &[(String, String, FieldType)]) {
        for (aes, name, ftype) in requests {
            let template = self
                .templates
                .entry(aes.clone())
                .or_insert_with(|| Scale::new(aes, name, *ftype))
                .clone();
            if self.panels[0][0].scales.contains_key(aes) {
                continue;
            }

            let nrows = self.panels.len();
            let ncols = self.panels[0].len();
            let free_x = aes == "x" && self.faceting.free_x();
            let free_y = aes == "y" && self.faceting.free_y();
            if free_x {
                // Each panel column shares one copy down its rows.
                for c in 0..ncols {
                    let id = self.scales.alloc(template.clone());
                    for r in 0..nrows {
                        self.panels[r][c].scales.insert(aes.clone(), id);
                    }
                }
            } else if free_y {
                // Each panel row shares one copy across its columns.
                for r in 0..nrows {
                    let id = self.scales.alloc(template.clone());
                    for panel in &mut self.panels[r] {
                        panel.scales.insert(aes.clone(), id);
                    }
                }
            } else {
                let id = self.scales.alloc(template);
                for row in &mut self.panels {
                    for panel in row {
                        panel.scales.insert(aes.clone(), id);
                    }
                }
            }
        }
    }

    /// Apply each scale's transform to its mapped column (sanitizing
    /// transforms on discrete/time scales), then train the scale.
    fn transform_and_train(&mut self, mapping_of: impl Fn(&Layer) -> AesMapping) -> Result<()> {
        let Plot { panels, scales, .. } = self;
        for row in panels.iter_mut() {
            for panel in row.iter_mut() {
                for layer in &mut panel.layers {
                    let mapping = mapping_of(layer);
                    let Some(data) = &mut layer.data else { continue };
                    let (aes_names, _) = mapping.used(true);
                    for aes in aes_names {
                        if !SCALEABLE.contains(&aes.as_str()) {
                            continue;
                        }
                        let Some(&id) = panel.scales.get(&aes) else {
                            continue;
                        };
                        let scale = scales.get_mut(id);
                        if scale.transform != crate::scale::Transform::Identity {
                            if scale.discrete || scale.time {
                                log::warn!(
                                    "cannot transform {} scale {}",
                                    if scale.discrete { "discrete" } else { "time" },
                                    scale.aesthetic
                                );
                                scale.transform = crate::scale::Transform::Identity;
                            } else if let Some(col) = data.columns.get_mut(&aes) {
                                let t = scale.transform;
                                col.apply(|x| t.apply(x))?;
                            }
                        }
                        if let Some(col) = data.columns.get(&aes) {
                            scale.train(col);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // =====================================================================
    // Pass 3: statistical transforms

    fn compute_statistics(&mut self) {
        let Plot { panels, scales, .. } = self;
        for row in panels.iter_mut() {
            for panel in row.iter_mut() {
                let ctx = match panel.scales.get("x") {
                    Some(&id) => {
                        let sx = scales.get(id);
                        StatContext {
                            x_domain: (sx.domain_min, sx.domain_max),
                        }
                    }
                    None => StatContext::default(),
                };
                for layer in &mut panel.layers {
                    let Some(stat) = &layer.stat else { continue };
                    let Some(data) = &layer.data else { continue };
                    match apply_with_policy(stat, data, &ctx) {
                        Ok(result) => layer.data = result,
                        Err(err) => {
                            log::warn!(
                                "stat {} on layer {:?} in panel {}: {}",
                                stat.name(),
                                layer.name,
                                panel.name,
                                err
                            );
                            layer.data = None;
                            layer.geom = None;
                        }
                    }
                }
            }
        }
    }

    // =====================================================================
    // Pass 4: wire stat output to geom input

    fn wire_stat_to_geom(&mut self) -> Result<()> {
        // 4a: rename stat-produced fields to their aesthetic names.
        for row in &mut self.panels {
            for panel in row.iter_mut() {
                for layer in &mut panel.layers {
                    let Some(data) = &mut layer.data else {
                        // The stat signalled "nothing to draw".
                        layer.geom = None;
                        continue;
                    };
                    for (aes, field) in layer.stat_mapping.iter() {
                        data.rename(field, aes);
                    }
                }
            }
        }

        // 4b: stat outputs may map new aesthetics; give them scales and
        // train.
        let requests = self.collect_scale_requests(|layer| layer.stat_mapping.clone());
        self.ensure_scales(&requests);
        self.transform_and_train(|layer| layer.stat_mapping.clone())?;

        // 4c: rename to the geom's expected slot names.
        for row in &mut self.panels {
            for panel in row.iter_mut() {
                for layer in &mut panel.layers {
                    let Some(data) = &mut layer.data else { continue };
                    for (aes, field) in layer.geom_mapping.iter() {
                        data.rename(field, aes);
                    }
                }
            }
        }
        Ok(())
    }

    // =====================================================================
    // Pass 5: geom construction

    fn construct_geoms(&mut self) {
        let Plot { panels, scales, .. } = self;
        for row in panels.iter_mut() {
            for panel in row.iter_mut() {
                for layer in &mut panel.layers {
                    let Some(geom) = layer.geom.clone() else {
                        if layer.data.is_some() {
                            log::warn!("no geom specified in layer {:?}", layer.name);
                        }
                        continue;
                    };
                    let Some(data) = &layer.data else { continue };

                    let missing: Vec<&str> = geom
                        .needed_slots()
                        .iter()
                        .copied()
                        .filter(|&slot| !data.has(slot))
                        .collect();
                    if !missing.is_empty() {
                        log::warn!(
                            "missing slots in geom {} in layer {:?}: {:?}",
                            geom.name(),
                            layer.name,
                            missing
                        );
                        layer.geom = None;
                        continue;
                    }

                    let mut view = ScalesMut::new(&panel.scales, scales);
                    match geom.construct(data.clone(), layer.position, &mut view) {
                        Ok(fundamentals) => layer.fundamentals = fundamentals,
                        Err(err) => {
                            log::warn!(
                                "constructing geom {} in layer {:?}: {}",
                                geom.name(),
                                layer.name,
                                err
                            );
                            layer.geom = None;
                        }
                    }
                }
            }
        }
    }

    // =====================================================================
    // Pass 6: scale finalization

    fn finalize_scales(&mut self) -> Result<()> {
        let Plot { panels, scales, pool, .. } = self;
        for row in panels.iter() {
            for panel in row {
                for &id in panel.scales.values() {
                    scales.get_mut(id).finalize(pool)?;
                }
            }
        }
        Ok(())
    }

    // =====================================================================
    // Pass 7: geom rendering

    fn render_geoms(&mut self) {
        let Plot { panels, scales, theme, .. } = self;
        for row in panels.iter_mut() {
            for panel in row.iter_mut() {
                let ids = &panel.scales;
                for layer in &mut panel.layers {
                    if layer.geom.is_none() {
                        continue;
                    }
                    for fund in &layer.fundamentals {
                        let style = fund.geom.aes(theme);
                        let view = crate::scale::ScalesView::new(ids, scales);
                        layer
                            .grobs
                            .extend(fund.geom.render(&fund.data, &style, &view));
                    }
                }
            }
        }
    }

    // =====================================================================
    // Pass 8: plot-level visuals

    fn render_visuals(&mut self) {
        let built_in = Theme::built_in();

        if let Some(title) = self.title.clone() {
            let style = merge_styles(&[&self.theme.title, &built_in.title]);
            let grob = centered_text(&title, &style);
            let (_, h) = grob.bounding_box(self.metrics.as_ref());
            self.render_info.insert("Title.Height".into(), h);
            self.grobs.insert("Title".into(), grob);
        }

        let label_style = merge_styles(&[&self.theme.label, &built_in.label]);
        if let Some(name) = self.scale_name("x") {
            if !name.is_empty() {
                let grob = centered_text(&name, &label_style);
                let (_, h) = grob.bounding_box(self.metrics.as_ref());
                self.render_info.insert("X-Label.Height".into(), h);
                self.grobs.insert("X-Label".into(), grob);
            }
        }
        if let Some(name) = self.scale_name("y") {
            if !name.is_empty() {
                let mut grob = centered_text(&name, &label_style);
                if let Grob::Text { angle, .. } = &mut grob {
                    *angle = std::f64::consts::FRAC_PI_2;
                }
                let (w, _) = grob.bounding_box(self.metrics.as_ref());
                self.render_info.insert("Y-Label.Width".into(), w);
                self.grobs.insert("Y-Label".into(), grob);
            }
        }

        self.render_strips();
        self.render_guides();
    }

    fn scale_name(&self, aes: &str) -> Option<String> {
        let id = self.panels.first()?.first()?.scales.get(aes)?;
        Some(self.scales.get(*id).name.clone())
    }

    /// Facet strips: a filled rect plus the level label, attached to
    /// the outer panels.
    fn render_strips(&mut self) {
        let built_in = Theme::built_in();
        let style = merge_styles(&[&self.theme.strip, &built_in.strip]);
        let fill = parse_color(style.get("fill").unwrap_or(""));
        let color = parse_color(style.get("color").unwrap_or(""));
        let size = parse_float(style.get("size").unwrap_or("10"), 4.0, 100.0);

        let strip_text = |text: &str, angle: f64| Grob::Text {
            x: 0.5,
            y: 0.5,
            text: text.to_string(),
            size,
            color,
            angle,
            hjust: 0.5,
            vjust: 0.5,
            font: "Helvetica".into(),
            lineheight: 15.0,
        };
        let backdrop = Grob::Rect {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 1.0,
            ymax: 1.0,
            fill,
        };

        if !self.faceting.row_strips.is_empty() {
            let ncols = self.panels[0].len();
            let mut max_width: f64 = 0.0;
            for r in 0..self.faceting.row_strips.len().min(self.panels.len()) {
                let text = strip_text(
                    &self.faceting.row_strips[r].clone(),
                    std::f64::consts::FRAC_PI_2,
                );
                let (w, _) = text.bounding_box(self.metrics.as_ref());
                max_width = max_width.max(w);
                self.panels[r][ncols - 1].right_grobs = vec![backdrop.clone(), text];
            }
            self.render_info.insert("Row-Strip.Width".into(), max_width);
        }
        if !self.faceting.col_strips.is_empty() {
            let nrows = self.panels.len();
            let mut max_height: f64 = 0.0;
            for c in 0..self.faceting.col_strips.len().min(self.panels[0].len()) {
                let text = strip_text(&self.faceting.col_strips[c].clone(), 0.0);
                let (_, h) = text.bounding_box(self.metrics.as_ref());
                max_height = max_height.max(h);
                self.panels[nrows - 1][c].top_grobs = vec![backdrop.clone(), text];
            }
            self.render_info.insert("Col-Strip.Height".into(), max_height);
        }
    }

    /// Legends for the non-positional scales, stacked vertically.
    fn render_guides(&mut self) {
        let Some(first) = self.panels.first().and_then(|r| r.first()) else {
            return;
        };
        let mut aesthetics: Vec<&String> = first
            .scales
            .keys()
            .filter(|a| *a != "x" && *a != "y")
            .collect();
        aesthetics.sort();

        let mut max_width: f64 = 0.0;
        let mut y_cum = 0.0;
        let y_sep = 5.0;
        let mut children = Vec::new();
        for aes in aesthetics {
            let scale = self.scales.get(first.scales[aes]);
            let (grob, width, height) = scale.render_guide(self.metrics.as_ref());
            max_width = max_width.max(width);
            if let Grob::Group { children: kids, .. } = grob {
                children.push(Grob::Group {
                    x0: 0.0,
                    y0: y_cum,
                    children: kids,
                });
            }
            y_cum += height + y_sep;
        }
        if !children.is_empty() {
            self.grobs
                .insert("Guides".into(), Grob::Group { x0: 0.0, y0: 0.0, children });
            self.render_info.insert("Guides.Width".into(), max_width);
        }
    }
}

fn centered_text(text: &str, style: &AesMapping) -> Grob {
    Grob::Text {
        x: 0.5,
        y: 0.5,
        text: text.to_string(),
        size: parse_float(style.get("size").unwrap_or("12"), 0.0, 100.0),
        color: parse_color(style.get("color").unwrap_or("black")),
        angle: 0.0,
        hjust: 0.5,
        vjust: 0.5,
        font: "Helvetica".into(),
        lineheight: 15.0,
    }
}

impl std::fmt::Debug for Plot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plot")
            .field("title", &self.title)
            .field("layers", &self.layers.len())
            .field(
                "panels",
                &format!("{}x{}", self.panels.len(), self.panels.first().map_or(0, Vec::len)),
            )
            .field("constructed", &self.constructed)
            .finish()
    }
}
