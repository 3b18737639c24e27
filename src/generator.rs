use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use anyhow::Context;

use crate::{
    atlas::{self, PackedLayout},
    config::{AtlasConfig, ConfigError},
    glyph::GlyphBitmap,
    text::{
        metadata::{self, GlyphRecord},
        sdf,
        source::{GlyphRequest, GlyphSource},
    },
    texture::{ComposeOptions, Texture},
};

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("a generation run is already in progress")]
    Busy,

    #[error("couldn't render '{character}': {reason:#}")]
    Glyph {
        character: char,
        reason: anyhow::Error,
    },
}

/// Output of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedAtlas {
    pub texture: Texture,
    pub layout: PackedLayout,
    pub glyphs: Vec<GlyphRecord>,
}

/// Runs the atlas pipeline, one run at a time.
///
/// Glyphs are fetched from the source first. Once all of them are in, the
/// distance field, packing, composition and metadata stages run back to back
/// without yielding.
#[derive(Debug, Default)]
pub struct Generator {
    generating: AtomicBool,
}

impl GeneratedAtlas {
    pub fn metadata_json(&self) -> serde_json::Result<String> {
        metadata::to_json(&self.glyphs)
    }

    pub fn save<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        image_path: P,
        json_path: Q,
    ) -> anyhow::Result<()> {
        self.texture.save_png(image_path)?;
        let json_path = json_path.as_ref();
        fs::write(json_path, self.metadata_json()?)
            .with_context(|| format!("write glyph metadata {:?}", json_path))?;
        log::info!("wrote {} glyph records to {:?}", self.glyphs.len(), json_path);
        Ok(())
    }
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    pub async fn generate<S: GlyphSource>(
        &self,
        source: &S,
        config: &AtlasConfig,
    ) -> Result<GeneratedAtlas, GenerateError> {
        config.validate()?;
        if !source.has_font(&config.font_name) {
            return Err(ConfigError::UnknownFont(config.font_name.clone()).into());
        }

        if self
            .generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("rejected a generation request while another run is active");
            return Err(GenerateError::Busy);
        }
        let _guard = RunGuard(&self.generating);

        let characters = config.characters.characters();
        let started = Instant::now();
        let glyphs = render_glyphs(source, &characters, config).await?;
        log::info!(
            "rendered {} glyphs of '{}' at {}px in {:?}",
            glyphs.len(),
            config.font_name,
            config.font_size,
            started.elapsed()
        );

        Ok(build(glyphs, &characters, config))
    }
}

async fn render_glyphs<S: GlyphSource>(
    source: &S,
    characters: &[char],
    config: &AtlasConfig,
) -> Result<Vec<GlyphBitmap>, GenerateError> {
    let mut glyphs = Vec::with_capacity(characters.len());
    for &character in characters {
        let request = GlyphRequest::for_config(character, config);
        let glyph = source
            .render(&request)
            .await
            .map_err(|reason| GenerateError::Glyph { character, reason })?;
        glyphs.push(glyph);
    }
    Ok(glyphs)
}

/// The synchronous half of the pipeline, from rendered glyphs to the finished atlas.
pub fn build(
    glyphs: Vec<GlyphBitmap>,
    characters: &[char],
    config: &AtlasConfig,
) -> GeneratedAtlas {
    let started = Instant::now();
    let glyphs = if config.use_distance_field {
        glyphs
            .iter()
            .map(|glyph| sdf::to_distance_field(glyph, config.falloff))
            .collect()
    } else {
        glyphs
    };

    let layout = atlas::pack(&glyphs, config.padding, config.power_of_two);
    let options = ComposeOptions {
        background: config.background(),
        mirror_x: config.mirror_x,
        mirror_y: config.mirror_y,
    };
    let texture = Texture::from_layout(&layout, &glyphs, &options);
    let records = metadata::emit(&layout, &glyphs, characters, config);
    log::info!(
        "built {}x{} atlas with {} glyphs in {:?}",
        layout.width,
        layout.height,
        records.len(),
        started.elapsed()
    );

    GeneratedAtlas {
        texture,
        layout,
        glyphs: records,
    }
}
