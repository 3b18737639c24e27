use std::{collections::HashMap, fs::File, io::Read, path::Path};

use anyhow::{anyhow, Context};

const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "woff", "woff2"];

#[derive(Clone, Debug)]
pub struct Asset {
    pub bytes: Vec<u8>,
}

/// Font files keyed by family name.
///
/// The family name is derived from the file name: the extension is dropped and
/// dashes become spaces, so `Open-Sans.ttf` registers as `Open Sans`.
#[derive(Debug)]
pub struct Loader {
    assets: HashMap<String, Asset>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    pub fn family_name<P: AsRef<Path>>(path: P) -> anyhow::Result<String> {
        let stem = path
            .as_ref()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or(anyhow!("Font path {:?} has no usable file name.", path.as_ref()))?;
        Ok(stem.replace('-', " "))
    }

    pub fn get_font_by_family(&self, family: &str) -> anyhow::Result<Asset> {
        let asset = self
            .assets
            .get(family)
            .ok_or(anyhow!("Font family '{}' isn't loaded.", family))?;
        Ok(asset.clone())
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// Reads a font file and registers it, returning the family it was stored under.
    /// A family that's already loaded is kept as is.
    pub fn load<S: AsRef<Path>>(&mut self, path: S) -> anyhow::Result<String> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !FONT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(anyhow!("{:?} isn't a font file.", path));
        }

        let family = Self::family_name(path)?;
        if self.assets.contains_key(&family) {
            log::warn!("font family '{}' is already loaded", family);
            return Ok(family);
        }

        let mut file = File::open(path).with_context(|| format!("open font {:?}", path))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|| format!("read font {:?}", path))?;
        log::info!("loaded font '{}' ({} bytes)", family, bytes.len());
        self.insert(family.clone(), bytes);
        Ok(family)
    }

    pub fn insert(&mut self, family: String, bytes: Vec<u8>) {
        self.assets.insert(family, Asset { bytes });
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
