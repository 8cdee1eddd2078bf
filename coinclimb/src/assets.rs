use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;

use crate::render::{FontHandle, Renderer, TextureHandle};

/// Manages cached assets (textures and fonts), keyed by path.
pub struct AssetManager {
    root: PathBuf,
    textures: HashMap<String, TextureHandle>,
    mirrored: HashMap<String, [TextureHandle; 2]>,
    fonts: HashMap<String, FontHandle>,
}

impl AssetManager {
    /// Create an asset manager resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: HashMap::new(),
            mirrored: HashMap::new(),
            fonts: HashMap::new(),
        }
    }

    /// Resolve `path` against the asset root unless it is absolute or
    /// already under the root.
    ///
    /// Paths read out of a loaded map were joined to the map's resolved
    /// directory, so resolving them again must not add the root twice.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() || path.starts_with(&self.root) {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Load a texture from a file path, caching it if already loaded.
    pub fn load_texture(
        &mut self,
        renderer: &mut Renderer,
        path: impl AsRef<Path>,
    ) -> Result<TextureHandle> {
        let path = self.resolve(path);
        let key = path.to_string_lossy().into_owned();
        if let Some(handle) = self.textures.get(&key) {
            return Ok(*handle);
        }

        let handle = renderer
            .load_texture_from_file(&path)
            .with_context(|| format!("Failed to load texture {}", path.display()))?;
        log::debug!("Loaded texture {}", path.display());
        self.textures.insert(key, handle);
        Ok(handle)
    }

    /// Load an image and its left-right mirror as two textures.
    ///
    /// The file is decoded once; index 0 is the image as stored, index 1 is
    /// mirrored across its vertical axis.
    pub fn load_texture_pair(
        &mut self,
        renderer: &mut Renderer,
        path: impl AsRef<Path>,
    ) -> Result<[TextureHandle; 2]> {
        let path = self.resolve(path);
        let key = path.to_string_lossy().into_owned();
        if let Some(pair) = self.mirrored.get(&key) {
            return Ok(*pair);
        }

        let bytes = fs::read(&path)
            .map_err(|e| anyhow!("Failed to read texture {}: {}", path.display(), e))?;
        let (original, mirrored) = decode_mirrored(&bytes)
            .with_context(|| format!("Failed to decode texture {}", path.display()))?;
        let (width, height) = original.dimensions();
        let pair = [
            renderer.load_texture_from_rgba(&original, width, height)?,
            renderer.load_texture_from_rgba(&mirrored, width, height)?,
        ];
        self.mirrored.insert(key, pair);
        Ok(pair)
    }

    /// Load a font from bytes, caching it by a given key.
    pub fn load_font_from_bytes(
        &mut self,
        renderer: &mut Renderer,
        key: &str,
        bytes: &[u8],
    ) -> Result<FontHandle> {
        if let Some(handle) = self.fonts.get(key) {
            return Ok(*handle);
        }

        let handle = renderer.load_font_from_bytes(bytes)?;
        self.fonts.insert(key.to_string(), handle);
        Ok(handle)
    }

    /// Load a font file, caching it by its resolved path.
    pub fn load_font(
        &mut self,
        renderer: &mut Renderer,
        path: impl AsRef<Path>,
    ) -> Result<FontHandle> {
        let path = self.resolve(path);
        let key = path.to_string_lossy().into_owned();
        if let Some(handle) = self.fonts.get(&key) {
            return Ok(*handle);
        }
        let bytes = fs::read(&path)
            .map_err(|e| anyhow!("Failed to read font {}: {}", path.display(), e))?;
        self.load_font_from_bytes(renderer, &key, &bytes)
    }

    /// Get a cached texture handle by resolved path, if it exists.
    pub fn get_texture(&self, path: impl AsRef<Path>) -> Option<TextureHandle> {
        let key = self.resolve(path).to_string_lossy().into_owned();
        self.textures.get(&key).copied()
    }
}

/// Decode an encoded image into RGBA8 plus its horizontal mirror.
pub fn decode_mirrored(bytes: &[u8]) -> Result<(RgbaImage, RgbaImage)> {
    let original = image::load_from_memory(bytes)?.to_rgba8();
    let mirrored = image::imageops::flip_horizontal(&original);
    Ok((original, mirrored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::TileMap;
    use image::{DynamicImage, ImageOutputFormat, Rgba};
    use std::io::Cursor;

    fn png(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn mirrored_copy_swaps_columns() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let (original, mirrored) = decode_mirrored(&png(image)).expect("decodes");
        assert_eq!(original.dimensions(), mirrored.dimensions());
        assert_eq!(*original.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*mirrored.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*mirrored.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn garbage_is_not_an_image() {
        assert!(decode_mirrored(b"definitely not a png").is_err());
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let assets = AssetManager::new("assets");
        assert_eq!(
            assets.resolve("images/player.png"),
            Path::new("assets").join("images/player.png")
        );
        assert_eq!(assets.get_texture("images/player.png"), None);
    }

    #[test]
    fn resolving_is_idempotent() {
        let assets = AssetManager::new("assets");
        let once = assets.resolve("sounds/coin1.wav");
        assert_eq!(assets.resolve(&once), once);
    }

    #[test]
    fn map_tile_paths_resolve_once_under_a_relative_root() {
        const MAP: &str = r#"{
            "width": 1, "height": 1, "tilewidth": 128, "tileheight": 128,
            "tilesets": [ { "firstgid": 1, "tilewidth": 128, "tileheight": 128, "tiles": [
                { "id": 0, "image": "grass.png", "imagewidth": 128, "imageheight": 128 }
            ] } ],
            "layers": [
                { "type": "tilelayer", "name": "Platforms", "width": 1, "height": 1, "data": [1] }
            ]
        }"#;

        let root = PathBuf::from("target").join(format!("asset-root-{}", std::process::id()));
        let maps = root.join("maps");
        fs::create_dir_all(&maps).expect("create map dir");
        fs::write(maps.join("level.json"), MAP).expect("write map");
        fs::write(maps.join("grass.png"), png(RgbaImage::new(1, 1))).expect("write tile");

        let assets = AssetManager::new(root.clone());
        let map = TileMap::load(assets.resolve("maps/level.json"), 0.5).expect("map loads");
        let tile_path = assets.resolve(&map.layers[0].tiles[0].image.path);

        assert_eq!(tile_path, maps.join("grass.png"));
        assert!(tile_path.is_file());
        let _ = fs::remove_dir_all(&root);
    }
}
