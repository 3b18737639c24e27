use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glyphatlas::{
    text::font_bitmap_manager::FontBitmapManager, AtlasConfig, Background, CharacterSet, Color,
    Generator,
};
use glyphatlas_asset::Loader;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pack font glyphs into a texture atlas")]
struct Args {
    /// font files to load (.ttf, .otf, .woff, .woff2)
    #[arg(long = "font", required = true)]
    fonts: Vec<PathBuf>,

    /// family to render; overrides the config file, defaults to the first loaded font
    #[arg(long)]
    font_name: Option<String>,

    /// JSON atlas configuration; replaces the rendering flags below
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 32)]
    size: u32,

    /// horizontal scale in percent
    #[arg(long, default_value_t = 100)]
    scale_x: u32,

    /// vertical scale in percent
    #[arg(long, default_value_t = 100)]
    scale_y: u32,

    #[arg(long)]
    bold: bool,

    #[arg(long)]
    italic: bool,

    #[arg(long)]
    distance_field: bool,

    #[arg(long, default_value_t = 5)]
    falloff: u32,

    #[arg(long)]
    power_of_two: bool,

    #[arg(long)]
    black_background: bool,

    #[arg(long, default_value = "#ffffff")]
    color: String,

    #[arg(long)]
    mirror_x: bool,

    #[arg(long)]
    mirror_y: bool,

    /// custom character set; printable ASCII when omitted
    #[arg(long)]
    chars: Option<String>,

    #[arg(long)]
    out_image: PathBuf,

    #[arg(long)]
    out_json: PathBuf,
}

impl Args {
    fn atlas_config(&self, default_family: &str) -> Result<AtlasConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("read config {:?}", path))?;
                config_from_json(&text, default_family)
                    .with_context(|| format!("parse config {:?}", path))?
            }
            None => {
                let background = if self.black_background {
                    Background::Black
                } else {
                    Background::Transparent
                };
                AtlasConfig {
                    font_name: default_family.to_string(),
                    font_size: self.size,
                    scale_x: self.scale_x as f64 / 100.0,
                    scale_y: self.scale_y as f64 / 100.0,
                    bold: self.bold,
                    italic: self.italic,
                    use_distance_field: self.distance_field,
                    falloff: self.falloff,
                    power_of_two: self.power_of_two,
                    distance_field_background: background,
                    normal_background: background,
                    font_color: self.color.parse::<Color>()?,
                    mirror_x: self.mirror_x,
                    mirror_y: self.mirror_y,
                    characters: self
                        .chars
                        .clone()
                        .map_or(CharacterSet::Ascii, CharacterSet::Custom),
                    ..AtlasConfig::default()
                }
            }
        };
        if let Some(font_name) = &self.font_name {
            config.font_name = font_name.clone();
        }
        Ok(config)
    }
}

/// A config file that doesn't name a font renders `default_family`.
fn config_from_json(text: &str, default_family: &str) -> serde_json::Result<AtlasConfig> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let names_font = value.get("font_name").is_some();
    let mut config: AtlasConfig = serde_json::from_value(value)?;
    if !names_font {
        config.font_name = default_family.to_string();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut loader = Loader::new();
    let mut first_family = None;
    for path in &args.fonts {
        let family = loader.load(path)?;
        first_family.get_or_insert(family);
    }
    let manager = FontBitmapManager::from_loader(&loader)?;

    let config = args.atlas_config(first_family.as_deref().unwrap_or_default())?;
    log::info!(
        "generating '{}' {}px atlas, distance field: {}",
        config.font_name,
        config.font_size,
        config.use_distance_field
    );

    let generator = Generator::new();
    let atlas = pollster::block_on(generator.generate(&manager, &config))?;
    atlas.save(&args.out_image, &args.out_json)?;

    Ok(())
}
