use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};
use serde::Deserialize;
use viper_patrol_rendering::{Color, SpriteKey};

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Parameters describing how a sprite should be drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Position in screen-space pixels where the sprite's top-left corner is placed.
    pub position: Vec2,
    /// Desired size in screen-space pixels.
    pub scale: Vec2,
    /// Rotation applied around the computed pivot, in radians.
    pub rotation_radians: f32,
    /// Pivot expressed in normalised sprite coordinates (0.0..=1.0).
    pub pivot: Vec2,
    /// Tint applied to the sprite.
    pub tint: Color,
    /// Mirrors the sprite horizontally, for craft facing left.
    pub flip_x: bool,
}

impl DrawParams {
    /// Creates draw parameters anchored at the provided position and scale.
    #[must_use]
    pub fn new(position: Vec2, scale: Vec2) -> Self {
        Self {
            position,
            scale,
            rotation_radians: 0.0,
            pivot: Vec2::splat(0.5),
            tint: Color::new(1.0, 1.0, 1.0, 1.0),
            flip_x: false,
        }
    }

    /// Overrides the rotation applied when drawing the sprite.
    #[must_use]
    pub fn with_rotation(mut self, rotation_radians: f32) -> Self {
        self.rotation_radians = rotation_radians;
        self
    }

    /// Overrides the tint colour used when drawing the sprite.
    #[must_use]
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Mirrors the sprite horizontally.
    #[must_use]
    pub fn with_flip_x(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, PathBuf>,
}

fn parse_manifest(text: &str) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest = toml::from_str(text).context("failed to parse sprite manifest")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {} (expected {})",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut entries = Vec::with_capacity(manifest.sprites.len());
    for (name, path) in manifest.sprites {
        let Some(key) = SpriteKey::ALL
            .into_iter()
            .find(|key| key.manifest_name() == name)
        else {
            bail!("unknown sprite name {name:?} in manifest");
        };
        entries.push((key, path));
    }
    entries.sort_by_key(|(key, _)| key.manifest_name());
    Ok(entries)
}

/// Cache of textures loaded from the sprite manifest.
#[derive(Debug)]
pub struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads the default sprite manifest from disk.
    pub fn from_default_manifest() -> Result<Self> {
        Self::from_manifest_path(Self::default_manifest_path())
    }

    /// Loads sprites from the manifest located at the provided path.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Loads sprites from a manifest using the provided texture loader.
    pub fn from_manifest_with_loader<F>(path: impl AsRef<Path>, mut loader: F) -> Result<Self>
    where
        F: FnMut(&Path) -> Result<Texture2D>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read sprite manifest {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let mut textures = HashMap::new();
        for (key, relative) in parse_manifest(&text)? {
            let texture_path = base.join(relative);
            let texture = loader(&texture_path)
                .with_context(|| format!("failed to load sprite {}", texture_path.display()))?;
            let _ = textures.insert(key, texture);
        }
        Ok(Self { textures })
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Reports whether the atlas holds a texture for the provided key.
    #[must_use]
    pub fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    /// Number of loaded textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Reports whether the atlas holds no textures at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Draws the requested sprite using the supplied parameters.
    ///
    /// Returns an error when the key is missing so callers can render a
    /// fallback shape instead of crashing mid-frame.
    pub fn draw(&self, key: SpriteKey, params: DrawParams) -> Result<()> {
        let texture = *self
            .textures
            .get(&key)
            .with_context(|| format!("sprite {key:?} missing from atlas"))?;

        let dest_size = MacroquadVec2::new(params.scale.x, params.scale.y);
        let pivot_offset =
            MacroquadVec2::new(params.pivot.x * dest_size.x, params.pivot.y * dest_size.y);
        let pivot = MacroquadVec2::new(
            params.position.x + pivot_offset.x,
            params.position.y + pivot_offset.y,
        );

        let draw_params = DrawTextureParams {
            dest_size: Some(dest_size),
            rotation: params.rotation_radians,
            pivot: Some(pivot),
            flip_x: params.flip_x,
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(
            texture,
            params.position.x,
            params.position.y,
            to_macroquad_color(params.tint),
            draw_params,
        );
        Ok(())
    }
}

fn default_loader(path: &Path) -> Result<Texture2D> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read texture {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[cfg(test)]
mod tests {
    use super::parse_manifest;
    use std::path::PathBuf;
    use viper_patrol_rendering::SpriteKey;

    #[test]
    fn parses_known_sprite_names() {
        let entries = parse_manifest(
            r#"
                version = 1

                [sprites]
                viper = "sprites/viper.png"
                stargate = "sprites/stargate.png"
            "#,
        )
        .expect("manifest parses");

        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .any(|(key, path)| *key == SpriteKey::Viper
                && *path == PathBuf::from("sprites/viper.png")));
    }

    #[test]
    fn rejects_unknown_sprite_names() {
        let error = parse_manifest(
            r#"
                version = 1

                [sprites]
                mothership = "sprites/mothership.png"
            "#,
        )
        .expect_err("unknown name must fail");
        assert!(error.to_string().contains("mothership"));
    }

    #[test]
    fn rejects_unsupported_manifest_versions() {
        let error = parse_manifest("version = 9\n[sprites]\n")
            .expect_err("future version must fail");
        assert!(error.to_string().contains("version"));
    }
}
