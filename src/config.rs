use std::{fmt, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=256;
pub const FALLOFF_RANGE: std::ops::RangeInclusive<u32> = 1..=32;

/// Everything one generation run reads. Validated once, then passed around by reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub font_name: String,
    pub font_size: u32,
    pub scale_x: f64,
    pub scale_y: f64,
    pub bold: bool,
    pub italic: bool,
    pub use_distance_field: bool,
    /// distance field search radius, in supersampled texels
    pub falloff: u32,
    /// gap between packed glyphs; the atlas border is half of it
    pub padding: u32,
    pub power_of_two: bool,
    pub distance_field_background: Background,
    pub normal_background: Background,
    pub font_color: Color,
    pub mirror_x: bool,
    pub mirror_y: bool,
    pub characters: CharacterSet,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            font_name: "Arial".into(),
            font_size: 32,
            scale_x: 1.0,
            scale_y: 1.0,
            bold: false,
            italic: false,
            use_distance_field: false,
            falloff: 5,
            padding: 2,
            power_of_two: false,
            distance_field_background: Background::Transparent,
            normal_background: Background::Transparent,
            font_color: Color::WHITE,
            mirror_x: false,
            mirror_y: false,
            characters: CharacterSet::Ascii,
        }
    }
}

impl AtlasConfig {
    pub fn with_font(mut self, font_name: &str, font_size: u32) -> Self {
        self.font_name = font_name.into();
        self.font_size = font_size;
        self
    }

    pub fn with_distance_field(mut self, falloff: u32) -> Self {
        self.use_distance_field = true;
        self.falloff = falloff;
        self
    }

    pub fn with_characters(mut self, characters: CharacterSet) -> Self {
        self.characters = characters;
        self
    }

    pub fn with_mirror(mut self, mirror_x: bool, mirror_y: bool) -> Self {
        self.mirror_x = mirror_x;
        self.mirror_y = mirror_y;
        self
    }

    /// Checks the bounds that don't need a font source. The first offending field wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.font_name.trim().is_empty() {
            return Err(ConfigError::UnknownFont(self.font_name.clone()));
        }
        if !FONT_SIZE_RANGE.contains(&self.font_size) {
            return Err(ConfigError::FontSize(self.font_size));
        }
        for (axis, scale) in [("x", self.scale_x), ("y", self.scale_y)] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ConfigError::Scale { axis, value: scale });
            }
        }
        if self.use_distance_field && !FALLOFF_RANGE.contains(&self.falloff) {
            return Err(ConfigError::Falloff(self.falloff));
        }
        if self.characters.characters().is_empty() {
            return Err(ConfigError::EmptyCharacterSet);
        }
        Ok(())
    }

    /// Background of the composed atlas for the active display type.
    pub fn background(&self) -> Background {
        if self.use_distance_field {
            self.distance_field_background
        } else {
            self.normal_background
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("fontName: font '{0}' can't be resolved")]
    UnknownFont(String),

    #[error("fontSize: {0} is outside 1..=256")]
    FontSize(u32),

    #[error("scale{axis}: {value} must be a positive number")]
    Scale { axis: &'static str, value: f64 },

    #[error("falloff: {0} is outside 1..=32")]
    Falloff(u32),

    #[error("characters: the character set is empty")]
    EmptyCharacterSet,

    #[error("fontColor: '{0}' isn't a #rrggbb colour")]
    Color(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Transparent,
    Black,
}

impl Background {
    pub fn pixel(self) -> [u8; 4] {
        match self {
            Background::Transparent => [0, 0, 0, 0],
            Background::Black => [0, 0, 0, 255],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ConfigError::Color(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|_| invalid());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterSet {
    /// the 95 printable ASCII characters, space through tilde
    #[default]
    Ascii,
    Custom(String),
}

impl CharacterSet {
    /// Characters to rasterize, duplicates removed in first-seen order.
    pub fn characters(&self) -> Vec<char> {
        match self {
            CharacterSet::Ascii => (32u8..=126).map(char::from).collect(),
            CharacterSet::Custom(set) => set.chars().unique().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_set_is_printable_range() {
        let chars = CharacterSet::Ascii.characters();
        assert_eq!(chars.len(), 95);
        assert_eq!(chars.first(), Some(&' '));
        assert_eq!(chars.last(), Some(&'~'));
    }

    #[test]
    fn custom_set_is_deduplicated_in_order() {
        let chars = CharacterSet::Custom("abcab€c".into()).characters();
        assert_eq!(chars, vec!['a', 'b', 'c', '€']);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(AtlasConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validation_names_the_field() {
        let config = AtlasConfig::default().with_font("Arial", 0);
        assert_eq!(config.validate(), Err(ConfigError::FontSize(0)));

        let config = AtlasConfig::default().with_font("Arial", 257);
        assert_eq!(config.validate(), Err(ConfigError::FontSize(257)));

        let config = AtlasConfig::default().with_distance_field(33);
        assert_eq!(config.validate(), Err(ConfigError::Falloff(33)));
        assert!(config.validate().unwrap_err().to_string().starts_with("falloff"));

        let config = AtlasConfig::default().with_characters(CharacterSet::Custom(String::new()));
        assert_eq!(config.validate(), Err(ConfigError::EmptyCharacterSet));

        let config = AtlasConfig {
            scale_y: 0.0,
            ..AtlasConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Scale { axis: "y", .. })));
    }

    #[test]
    fn falloff_is_ignored_without_distance_field() {
        let config = AtlasConfig {
            falloff: 0,
            ..AtlasConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn background_follows_display_type() {
        let mut config = AtlasConfig {
            distance_field_background: Background::Black,
            ..AtlasConfig::default()
        };
        assert_eq!(config.background(), Background::Transparent);
        config.use_distance_field = true;
        assert_eq!(config.background(), Background::Black);
    }

    #[test]
    fn colour_parsing() {
        assert_eq!("#ff8000".parse::<Color>(), Ok(Color::rgb(255, 128, 0)));
        assert_eq!("00ff00".parse::<Color>(), Ok(Color::rgb(0, 255, 0)));
        assert!("#ff80".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert_eq!(Color::rgb(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn config_from_json_uses_defaults() {
        let config: AtlasConfig = serde_json::from_str(
            r##"{ "font_name": "Mono", "use_distance_field": true, "font_color": "#102030",
                  "characters": { "custom": "xyz" }, "distance_field_background": "black" }"##,
        )
        .unwrap();
        assert_eq!(config.font_name, "Mono");
        assert_eq!(config.font_size, 32);
        assert_eq!(config.falloff, 5);
        assert_eq!(config.font_color, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(config.characters, CharacterSet::Custom("xyz".into()));
        assert_eq!(config.background(), Background::Black);
    }
}
