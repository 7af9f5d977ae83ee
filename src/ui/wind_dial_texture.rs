// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rasterises wind dial SVG into egui textures.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use deplist_core::weather::{wind_dial, Wind};
use deplist_core::Generation;
use log::warn;
use resvg::tiny_skia;
use thiserror::Error;
use usvg::{fontdb, Tree};

#[derive(Debug, Error)]
pub enum DialRenderError {
    #[error("invalid dial SVG: {0}")]
    Svg(#[from] usvg::Error),

    #[error("cannot allocate a {0}x{0} pixmap")]
    Pixmap(u32),
}

/// Identifies one rendered dial image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DialKey {
    generation: Generation,
    slot: usize,
    revision: u64,
    pixels: u32,
}

/// Render an SVG document to premultiplied RGBA.
pub fn rasterize(svg: &str, options: &usvg::Options, pixels: u32) -> Result<egui::ColorImage, DialRenderError> {
    let tree = Tree::from_str(svg, options)?;
    let mut pixmap = tiny_skia::Pixmap::new(pixels, pixels).ok_or(DialRenderError::Pixmap(pixels))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let side = pixels as usize;
    Ok(egui::ColorImage::from_rgba_premultiplied([side, side], pixmap.data()))
}

/// Per-box dial textures, re-rendered only when the box content or its
/// on-screen size changes.
pub struct DialTextures {
    options: usvg::Options<'static>,
    textures: HashMap<usize, (DialKey, egui::TextureHandle)>,
    failed: HashSet<DialKey>,
    generation: Option<Generation>,
}

impl std::fmt::Debug for DialTextures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialTextures")
            .field("textures", &self.textures.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Default for DialTextures {
    fn default() -> Self {
        Self::new()
    }
}

impl DialTextures {
    pub fn new() -> Self {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_system_fonts();
        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(fontdb);

        Self {
            options,
            textures: HashMap::new(),
            failed: HashSet::new(),
            generation: None,
        }
    }

    /// Texture for box `slot`, rendering it if needed. `None` when the
    /// size is still zero or rendering failed.
    pub fn get(
        &mut self,
        ctx: &egui::Context,
        generation: Generation,
        slot: usize,
        revision: u64,
        size_points: f32,
        wind: &Wind,
    ) -> Option<egui::TextureHandle> {
        if self.generation != Some(generation) {
            self.textures.clear();
            self.failed.clear();
            self.generation = Some(generation);
        }

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "non-negative on-screen size"
        )]
        let pixels = (size_points * ctx.pixels_per_point()).round().max(0.0) as u32;
        let key = DialKey {
            generation,
            slot,
            revision,
            pixels,
        };

        if let Some((cached, texture)) = self.textures.get(&slot) {
            if *cached == key {
                return Some(texture.clone());
            }
        }
        if self.failed.contains(&key) {
            return None;
        }

        #[allow(clippy::cast_precision_loss, reason = "dial sizes are a few hundred pixels")]
        let svg = wind_dial::render_svg(pixels as f32, wind)?;
        match rasterize(&svg, &self.options, pixels) {
            Ok(image) => {
                let texture = ctx.load_texture(
                    format!("wind_dial_{slot}"),
                    image,
                    egui::TextureOptions::LINEAR,
                );
                self.textures.insert(slot, (key, texture.clone()));
                Some(texture)
            }
            Err(e) => {
                warn!("Wind dial for box {slot} could not be drawn: {e}");
                self.failed.insert(key);
                None
            }
        }
    }
}
