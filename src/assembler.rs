//! # Reticle Assembler
//!
//! Turns a source canvas holding one image per layer into finished reticles.
//!
//! ## Per-canvas Steps
//!
//! ```text
//! for each packed canvas i:
//!   images   = for each slot: extract(layer) → remap → magnify(scale) → translate(offset)
//!   reticle  = template copy ⊕ images
//!   barcode  = render("{ID}-R{i}") → rotate → move to barcode anchor
//!   labels   = "{ID}-R{i}" at id anchor, annotation text at text anchor
//!   flatten, name "{ID}-R{i}"
//! ```
//!
//! Canvases are independent, so they are built in parallel; output order is
//! always canvas index order.

use std::collections::HashMap;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::barcode::{self, SymbologyTable};
use crate::config::ReticleProfile;
use crate::error::{ReticleError, Result};
use crate::geometry::{Canvas, Label, Layer, Point, Size, Transform};
use crate::packer::{CanvasAssignment, Packing};

/// Place every assigned image onto its canvas, without annotations.
///
/// `image_layers[i]` is the source layer of slot `i`. Each image is moved to
/// `geometry_layer`, magnified by `scale` and translated to its slot offset.
/// One flat canvas is returned per packed canvas.
pub fn populate(
    source: &Canvas,
    image_layers: &[Layer],
    packing: &Packing,
    scale: f64,
    geometry_layer: Layer,
) -> Result<Vec<Canvas>> {
    if packing.slot_count() != image_layers.len() {
        return Err(ReticleError::InvalidConfig(format!(
            "packing holds {} slots but {} image layers were given",
            packing.slot_count(),
            image_layers.len()
        )));
    }

    Ok(packing
        .canvases
        .par_iter()
        .map(|assignment| place_images(source, image_layers, assignment, scale, geometry_layer))
        .collect())
}

fn place_images(
    source: &Canvas,
    image_layers: &[Layer],
    assignment: &CanvasAssignment,
    scale: f64,
    geometry_layer: Layer,
) -> Canvas {
    let mut canvas = Canvas::new(format!("images_{}", assignment.index));

    for slot in &assignment.slots {
        let layer = image_layers[slot.index];
        let remap = HashMap::from([(layer, geometry_layer)]);
        let mut image = source.extract(&[layer]).remap_layers(&remap);
        if image.elements.is_empty() {
            warn!("image layer {} has no geometry (slot {})", layer, slot.index);
        }
        image.transform(&Transform::magnification(scale));
        image.set_name(format!("image_{}", slot.index));

        canvas.insert(image).translate(slot.offset);
        debug!(
            "canvas {}: slot {} (layer {}) at row {}, col {}",
            assignment.index, slot.index, layer, slot.row, slot.col
        );
    }

    canvas.flatten();
    canvas
}

/// Packing plus the finished reticles, one per packed canvas.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub packing: Packing,
    pub reticles: Vec<Canvas>,
}

/// Builds annotated reticles for one profile.
pub struct ReticleAssembler<'a> {
    profile: &'a ReticleProfile,
    table: &'a SymbologyTable,
    template: Option<&'a Canvas>,
}

impl<'a> ReticleAssembler<'a> {
    pub fn new(profile: &'a ReticleProfile, table: &'a SymbologyTable) -> Self {
        Self {
            profile,
            table,
            template: None,
        }
    }

    /// Copy `template` (frame, fiducials) under every reticle.
    pub fn with_template(mut self, template: &'a Canvas) -> Self {
        self.template = Some(template);
        self
    }

    /// Finished reticles for `image_layers` of `source`.
    ///
    /// `id` is truncated and uppercased per the profile; `text` likewise and
    /// omitted when empty.
    pub fn assemble(
        &self,
        source: &Canvas,
        image_size: Size,
        image_layers: &[Layer],
        id: &str,
        text: &str,
    ) -> Result<Vec<Canvas>> {
        Ok(self.build(source, image_size, image_layers, id, text)?.reticles)
    }

    /// Like [`assemble`](Self::assemble), also returning the packing used.
    pub fn build(
        &self,
        source: &Canvas,
        image_size: Size,
        image_layers: &[Layer],
        id: &str,
        text: &str,
    ) -> Result<Assembly> {
        let id = self.profile.normalize_id(id);
        let text = self.profile.normalize_text(text);

        let packing = self.profile.pack(image_size, image_layers.len())?;
        let images = populate(
            source,
            image_layers,
            &packing,
            self.profile.scale,
            self.profile.geometry_layer,
        )?;

        let reticles: Vec<Canvas> = images
            .into_par_iter()
            .enumerate()
            .map(|(index, images)| self.annotate(images, &id, &text, index))
            .collect();

        info!(
            "assembled {} reticle(s) for {} ({} images)",
            reticles.len(),
            id,
            image_layers.len()
        );

        Ok(Assembly { packing, reticles })
    }

    /// Barcode canvas for `name`, before rotation and placement.
    pub fn barcode_canvas(&self, name: &str) -> Canvas {
        let placement = &self.profile.barcode;
        let symbols = barcode::encode(name, placement.max_length, self.table);
        barcode::render_with_metrics(
            &symbols,
            placement.height,
            self.profile.geometry_layer,
            &placement.metrics,
        )
        .into_canvas(format!("{}_barcode", name))
    }

    fn label_canvas(&self, text: &str) -> Canvas {
        let mut canvas = Canvas::new(format!("label_{}", text));
        canvas.add_label(
            Label::new(text, Point::ORIGIN, self.profile.text_height),
            self.profile.geometry_layer,
        );
        canvas
    }

    fn annotate(&self, images: Canvas, id: &str, text: &str, index: usize) -> Canvas {
        let profile = self.profile;
        let name = ReticleProfile::reticle_name(id, index);

        let mut reticle = match self.template {
            Some(template) => template.clone(),
            None => Canvas::new(name.clone()),
        };
        reticle.insert(images);

        reticle
            .insert(self.barcode_canvas(&name))
            .rotate(profile.barcode.rotation)
            .translate(profile.barcode.anchor);

        reticle
            .insert(self.label_canvas(&name))
            .rotate(profile.text_rotation)
            .translate(profile.id_anchor);

        if !text.is_empty() {
            reticle
                .insert(self.label_canvas(text))
                .rotate(profile.text_rotation)
                .translate(profile.text_anchor);
        }

        reticle.flatten();
        reticle.set_name(name);
        debug!("reticle {} finalized with {} elements", reticle.name, reticle.elements.len());
        reticle
    }
}
