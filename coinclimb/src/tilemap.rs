//! Loader for maps saved by the Tiled editor in its JSON format.
//!
//! Only orthogonal maps with uncompressed (CSV/array) tile data are
//! supported. Everything is converted to a y-up world: the bottom-left corner
//! of the map is the origin and all coordinates are multiplied by the
//! scaling passed to [`TileMap::load`].

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::math::{Rect, Vec2};

const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
const GID_MASK: u32 = !(FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY);

/// Errors produced while loading a Tiled map.
#[derive(Debug, Error)]
pub enum TileMapError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported map orientation '{0}'")]
    UnsupportedOrientation(String),
    #[error("layer '{layer}' uses unsupported tile data encoding '{encoding}'")]
    UnsupportedEncoding { layer: String, encoding: String },
    #[error("layer '{0}' has no tile data (infinite maps are not supported)")]
    MissingTileData(String),
    #[error("tileset {0} is not a JSON tileset")]
    UnsupportedTileset(PathBuf),
    #[error("gid {gid} in layer '{layer}' does not belong to any tileset")]
    UnknownGid { gid: u32, layer: String },
}

/// Custom properties attached to a tile, object or layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties(HashMap<String, Value>);

impl Properties {
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.0.get(name).and_then(Value::as_f64).map(|v| v as f32)
    }

    fn from_raw(raw: &[RawProperty]) -> Self {
        Properties(
            raw.iter()
                .map(|p| (p.name.clone(), p.value.clone()))
                .collect(),
        )
    }

    /// Properties of `self` overridden by those of `other`.
    fn merged(&self, other: &Properties) -> Properties {
        let mut out = self.clone();
        out.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

/// Where a tile's pixels come from.
#[derive(Clone, Debug, PartialEq)]
pub struct TileImage {
    /// Image file, resolved against the file that declared the tileset.
    pub path: PathBuf,
    /// Normalised `[x, y, w, h]` region inside a sprite sheet, `None` for a
    /// whole image.
    pub uv_rect: Option<[f32; 4]>,
}

/// One placed tile, from a tile layer cell or a tile object.
#[derive(Clone, Debug, PartialEq)]
pub struct MapTile {
    pub image: TileImage,
    /// World-space bounds after scaling.
    pub rect: Rect,
    pub flip_x: bool,
    pub flip_y: bool,
    pub properties: Properties,
}

/// A named layer in draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayer {
    pub name: String,
    pub visible: bool,
    pub tiles: Vec<MapTile>,
    pub properties: Properties,
}

/// A loaded Tiled map.
#[derive(Clone, Debug)]
pub struct TileMap {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub scaling: f32,
    /// RGBA in 0.0..=1.0, if the map sets one.
    pub background_color: Option<[f32; 4]>,
    pub layers: Vec<MapLayer>,
}

impl TileMap {
    /// Load a map file; tileset and image paths resolve relative to it.
    pub fn load(path: impl AsRef<Path>, scaling: f32) -> Result<Self, TileMapError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TileMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawMap = serde_json::from_str(&text).map_err(|source| TileMapError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_raw(raw, base_dir, scaling)
    }

    /// Parse a map from JSON text, resolving relative paths against `base_dir`.
    pub fn from_json_str(json: &str, base_dir: &Path, scaling: f32) -> Result<Self, TileMapError> {
        let raw: RawMap = serde_json::from_str(json).map_err(|source| TileMapError::Json {
            path: base_dir.to_path_buf(),
            source,
        })?;
        Self::from_raw(raw, base_dir, scaling)
    }

    pub fn layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Scaled width of the map in world pixels.
    pub fn pixel_width(&self) -> f32 {
        (self.width * self.tile_width) as f32 * self.scaling
    }

    /// Scaled height of the map in world pixels.
    pub fn pixel_height(&self) -> f32 {
        (self.height * self.tile_height) as f32 * self.scaling
    }

    fn from_raw(raw: RawMap, base_dir: &Path, scaling: f32) -> Result<Self, TileMapError> {
        if let Some(orientation) = raw.orientation.as_deref() {
            if orientation != "orthogonal" {
                return Err(TileMapError::UnsupportedOrientation(orientation.to_string()));
            }
        }

        let tilesets = raw
            .tilesets
            .into_iter()
            .map(|r| Tileset::resolve(r, base_dir))
            .collect::<Result<Vec<_>, _>>()?;

        let builder = LayerBuilder {
            tilesets,
            map_pixel_height: (raw.height * raw.tileheight) as f32,
            tile_width: raw.tilewidth,
            tile_height: raw.tileheight,
            scaling,
        };

        let mut layers = Vec::new();
        for layer in &raw.layers {
            builder.collect(layer, 0.0, 0.0, &mut layers)?;
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            tile_width: raw.tilewidth,
            tile_height: raw.tileheight,
            scaling,
            background_color: raw.backgroundcolor.as_deref().and_then(parse_color),
            layers,
        })
    }
}

/// Parse `#RRGGBB` or `#AARRGGBB` into normalised RGBA.
fn parse_color(text: &str) -> Option<[f32; 4]> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    let byte = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .map(|b| b as f32 / 255.0)
    };
    match hex.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 1.0]),
        8 => Some([byte(2)?, byte(4)?, byte(6)?, byte(0)?]),
        _ => None,
    }
}

struct TileInfo {
    image: Option<PathBuf>,
    size: Option<(u32, u32)>,
    properties: Properties,
}

struct Tileset {
    first_gid: u32,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    tile_count: u32,
    margin: u32,
    spacing: u32,
    image: Option<(PathBuf, u32, u32)>,
    tiles: HashMap<u32, TileInfo>,
}

impl Tileset {
    fn resolve(reference: RawTilesetRef, map_dir: &Path) -> Result<Self, TileMapError> {
        let (raw, dir): (RawTileset, PathBuf) = match reference.source {
            Some(source) => {
                let path = map_dir.join(&source);
                let is_json = matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("json") | Some("tsj")
                );
                if !is_json {
                    return Err(TileMapError::UnsupportedTileset(path));
                }
                let text = fs::read_to_string(&path).map_err(|source| TileMapError::Io {
                    path: path.clone(),
                    source,
                })?;
                let raw = serde_json::from_str(&text).map_err(|source| TileMapError::Json {
                    path: path.clone(),
                    source,
                })?;
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (raw, dir)
            }
            None => {
                let raw = serde_json::from_value(Value::Object(reference.inline)).map_err(
                    |source| TileMapError::Json {
                        path: map_dir.to_path_buf(),
                        source,
                    },
                )?;
                (raw, map_dir.to_path_buf())
            }
        };

        let tiles = raw
            .tiles
            .iter()
            .map(|t| {
                let size = (t.imagewidth > 0 && t.imageheight > 0)
                    .then_some((t.imagewidth, t.imageheight));
                (
                    t.id,
                    TileInfo {
                        image: t.image.as_ref().map(|i| dir.join(i)),
                        size,
                        properties: Properties::from_raw(t.properties.as_slice()),
                    },
                )
            })
            .collect();

        Ok(Self {
            first_gid: reference.firstgid,
            tile_width: raw.tilewidth,
            tile_height: raw.tileheight,
            columns: raw.columns,
            tile_count: raw.tilecount,
            margin: raw.margin,
            spacing: raw.spacing,
            image: raw
                .image
                .as_ref()
                .map(|i| (dir.join(i), raw.imagewidth, raw.imageheight)),
            tiles,
        })
    }

    /// Image, pixel size and properties of a tile by local id.
    fn tile(&self, local_id: u32) -> Option<(TileImage, (u32, u32), Properties)> {
        let info = self.tiles.get(&local_id);
        let properties = info.map(|i| i.properties.clone()).unwrap_or_default();

        if let Some(path) = info.and_then(|i| i.image.clone()) {
            let size = info
                .and_then(|i| i.size)
                .unwrap_or((self.tile_width, self.tile_height));
            return Some((TileImage { path, uv_rect: None }, size, properties));
        }

        let (path, image_width, image_height) = self.image.clone()?;
        if self.columns == 0 || image_width == 0 || image_height == 0 {
            return None;
        }
        if self.tile_count > 0 && local_id >= self.tile_count {
            return None;
        }
        let col = local_id % self.columns;
        let row = local_id / self.columns;
        let px = self.margin + col * (self.tile_width + self.spacing);
        let py = self.margin + row * (self.tile_height + self.spacing);
        let uv_rect = [
            px as f32 / image_width as f32,
            py as f32 / image_height as f32,
            self.tile_width as f32 / image_width as f32,
            self.tile_height as f32 / image_height as f32,
        ];
        Some((
            TileImage {
                path,
                uv_rect: Some(uv_rect),
            },
            (self.tile_width, self.tile_height),
            properties,
        ))
    }
}

struct LayerBuilder {
    tilesets: Vec<Tileset>,
    map_pixel_height: f32,
    tile_width: u32,
    tile_height: u32,
    scaling: f32,
}

impl LayerBuilder {
    fn collect(
        &self,
        layer: &RawLayer,
        parent_dx: f32,
        parent_dy: f32,
        out: &mut Vec<MapLayer>,
    ) -> Result<(), TileMapError> {
        match layer {
            RawLayer::TileLayer {
                name,
                width,
                data,
                encoding,
                visible,
                offsetx,
                offsety,
                properties,
                ..
            } => {
                let cells = match (data, encoding.as_deref()) {
                    (_, Some(enc)) if enc != "csv" => {
                        return Err(TileMapError::UnsupportedEncoding {
                            layer: name.clone(),
                            encoding: enc.to_string(),
                        })
                    }
                    (Value::Array(cells), _) => cells,
                    (Value::Null, _) => return Err(TileMapError::MissingTileData(name.clone())),
                    _ => {
                        return Err(TileMapError::UnsupportedEncoding {
                            layer: name.clone(),
                            encoding: "string".to_string(),
                        })
                    }
                };

                let columns = (*width).max(1);
                let mut tiles = Vec::new();
                for (index, cell) in cells.iter().enumerate() {
                    let raw_gid = cell.as_u64().unwrap_or(0) as u32;
                    if raw_gid & GID_MASK == 0 {
                        continue;
                    }
                    let col = (index as u32 % columns) as f32;
                    let row = (index as u32 / columns) as f32;
                    let left = col * self.tile_width as f32 + parent_dx + offsetx;
                    let bottom = (row + 1.0) * self.tile_height as f32 + parent_dy + offsety;
                    let tile =
                        self.place(raw_gid, name, left, bottom, None, &Properties::default())?;
                    tiles.push(tile);
                }

                out.push(MapLayer {
                    name: name.clone(),
                    visible: *visible,
                    tiles,
                    properties: Properties::from_raw(properties.as_slice()),
                });
            }
            RawLayer::ObjectGroup {
                name,
                objects,
                visible,
                offsetx,
                offsety,
                properties,
            } => {
                let mut tiles = Vec::new();
                for object in objects.iter().filter(|o| o.visible) {
                    let Some(raw_gid) = object.gid else {
                        log::debug!(
                            "Skipping non-tile object '{}' in layer '{}'",
                            object.name,
                            name
                        );
                        continue;
                    };
                    let size = (object.width > 0.0 && object.height > 0.0)
                        .then_some((object.width, object.height));
                    tiles.push(self.place(
                        raw_gid,
                        name,
                        object.x + parent_dx + offsetx,
                        object.y + parent_dy + offsety,
                        size,
                        &Properties::from_raw(object.properties.as_slice()),
                    )?);
                }

                out.push(MapLayer {
                    name: name.clone(),
                    visible: *visible,
                    tiles,
                    properties: Properties::from_raw(properties.as_slice()),
                });
            }
            RawLayer::Group {
                layers,
                offsetx,
                offsety,
                ..
            } => {
                for child in layers {
                    self.collect(child, parent_dx + offsetx, parent_dy + offsety, out)?;
                }
            }
            RawLayer::Other => {}
        }
        Ok(())
    }

    /// Place a tile whose bottom-left corner is at (`left`, `bottom`) in Tiled
    /// (y-down, unscaled) pixels.
    fn place(
        &self,
        raw_gid: u32,
        layer: &str,
        left: f32,
        bottom: f32,
        size: Option<(f32, f32)>,
        overrides: &Properties,
    ) -> Result<MapTile, TileMapError> {
        let gid = raw_gid & GID_MASK;
        let unknown = || TileMapError::UnknownGid {
            gid,
            layer: layer.to_string(),
        };
        let tileset = self
            .tilesets
            .iter()
            .filter(|t| t.first_gid <= gid)
            .max_by_key(|t| t.first_gid)
            .ok_or_else(unknown)?;
        let (image, (tile_w, tile_h), properties) =
            tileset.tile(gid - tileset.first_gid).ok_or_else(unknown)?;

        let (width, height) = size.unwrap_or((tile_w as f32, tile_h as f32));
        let world_bottom = self.map_pixel_height - bottom;
        let s = self.scaling;
        let rect = Rect::from_edges(
            left * s,
            (left + width) * s,
            world_bottom * s,
            (world_bottom + height) * s,
        );

        Ok(MapTile {
            image,
            rect,
            flip_x: raw_gid & FLIPPED_HORIZONTALLY != 0,
            flip_y: raw_gid & FLIPPED_VERTICALLY != 0,
            properties: properties.merged(overrides),
        })
    }
}

impl MapTile {
    pub fn center(&self) -> Vec2 {
        self.rect.center
    }
}

#[derive(Deserialize)]
struct RawMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    orientation: Option<String>,
    #[serde(default)]
    backgroundcolor: Option<String>,
    #[serde(default)]
    layers: Vec<RawLayer>,
    #[serde(default)]
    tilesets: Vec<RawTilesetRef>,
}

fn default_visible() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawLayer {
    #[serde(rename = "tilelayer")]
    TileLayer {
        name: String,
        width: u32,
        #[serde(default)]
        data: Value,
        #[serde(default)]
        encoding: Option<String>,
        #[serde(default = "default_visible")]
        visible: bool,
        #[serde(default)]
        offsetx: f32,
        #[serde(default)]
        offsety: f32,
        #[serde(default)]
        properties: Vec<RawProperty>,
    },
    #[serde(rename = "objectgroup")]
    ObjectGroup {
        name: String,
        #[serde(default)]
        objects: Vec<RawObject>,
        #[serde(default = "default_visible")]
        visible: bool,
        #[serde(default)]
        offsetx: f32,
        #[serde(default)]
        offsety: f32,
        #[serde(default)]
        properties: Vec<RawProperty>,
    },
    #[serde(rename = "group")]
    Group {
        #[serde(default)]
        layers: Vec<RawLayer>,
        #[serde(default)]
        offsetx: f32,
        #[serde(default)]
        offsety: f32,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct RawObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    gid: Option<u32>,
    x: f32,
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Deserialize)]
struct RawProperty {
    name: String,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
struct RawTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct RawTileset {
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
    #[serde(default)]
    tiles: Vec<RawTile>,
}

#[derive(Deserialize)]
struct RawTile {
    id: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r##"{
        "width": 4, "height": 3, "tilewidth": 128, "tileheight": 128,
        "orientation": "orthogonal",
        "backgroundcolor": "#6495ed",
        "tilesets": [
            {
                "firstgid": 1, "name": "sheet",
                "image": "tiles.png", "imagewidth": 256, "imageheight": 128,
                "columns": 2, "tilecount": 2, "tilewidth": 128, "tileheight": 128,
                "tiles": [
                    { "id": 1, "properties": [
                        { "name": "change_x", "type": "float", "value": 2 },
                        { "name": "boundary_left", "type": "float", "value": 100 }
                    ] }
                ]
            },
            {
                "firstgid": 3, "name": "items", "columns": 0, "tilecount": 1,
                "tilewidth": 128, "tileheight": 128,
                "tiles": [
                    { "id": 0, "image": "../images/coin.png",
                      "imagewidth": 128, "imageheight": 128 }
                ]
            }
        ],
        "layers": [
            { "type": "tilelayer", "name": "Platforms", "width": 4, "height": 3,
              "data": [0,0,0,0, 0,0,0,0, 1,1,1,2147483650] },
            { "type": "objectgroup", "name": "Coins", "objects": [
                { "id": 1, "gid": 3, "x": 128, "y": 256, "width": 128, "height": 128 },
                { "id": 2, "x": 0, "y": 0, "width": 10, "height": 10 }
            ] },
            { "type": "group", "name": "Decor", "layers": [
                { "type": "tilelayer", "name": "Background", "width": 4, "height": 3,
                  "visible": false, "data": [3,0,0,0, 0,0,0,0, 0,0,0,0] }
            ] },
            { "type": "imagelayer", "name": "Sky" }
        ]
    }"##;

    fn load() -> TileMap {
        TileMap::from_json_str(MAP, Path::new("maps"), 0.5).expect("map parses")
    }

    #[test]
    fn reads_dimensions_and_background() {
        let map = load();
        assert_eq!((map.width, map.height), (4, 3));
        assert_eq!(map.pixel_width(), 256.0);
        assert_eq!(map.pixel_height(), 192.0);
        let [r, g, b, a] = map.background_color.expect("colour");
        assert!((r - 100.0 / 255.0).abs() < 1e-6);
        assert!((g - 149.0 / 255.0).abs() < 1e-6);
        assert!((b - 237.0 / 255.0).abs() < 1e-6);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn flattens_groups_and_skips_unknown_layers() {
        let map = load();
        let names: Vec<_> = map.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Platforms", "Coins", "Background"]);
        assert!(!map.layer("Background").expect("layer").visible);
    }

    #[test]
    fn tile_layer_cells_become_y_up_scaled_rects() {
        let map = load();
        let platforms = map.layer("Platforms").expect("layer");
        assert_eq!(platforms.tiles.len(), 4);

        let first = &platforms.tiles[0];
        assert_eq!(first.rect, Rect::from_edges(0.0, 64.0, 0.0, 64.0));
        assert_eq!(first.image.path, Path::new("maps").join("tiles.png"));
        assert_eq!(first.image.uv_rect, Some([0.0, 0.0, 0.5, 1.0]));

        let flipped = &platforms.tiles[3];
        assert!(flipped.flip_x);
        assert!(!flipped.flip_y);
        assert_eq!(flipped.image.uv_rect, Some([0.5, 0.0, 0.5, 1.0]));
        assert_eq!(flipped.properties.get_f32("change_x"), Some(2.0));
        assert_eq!(flipped.rect.center, Vec2::new(224.0, 32.0));
    }

    #[test]
    fn tile_objects_use_bottom_left_anchor() {
        let map = load();
        let coins = map.layer("Coins").expect("layer");
        assert_eq!(coins.tiles.len(), 1);
        let coin = &coins.tiles[0];
        assert_eq!(coin.center(), Vec2::new(96.0, 96.0));
        assert_eq!(coin.image.uv_rect, None);
        assert_eq!(
            coin.image.path,
            Path::new("maps").join("../images/coin.png")
        );
    }

    #[test]
    fn rejects_base64_layers() {
        let json = r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "layers": [ { "type": "tilelayer", "name": "L", "width": 1, "height": 1,
                          "encoding": "base64", "data": "AAAAAA==" } ] }"#;
        let err = TileMap::from_json_str(json, Path::new("."), 1.0).unwrap_err();
        assert!(matches!(err, TileMapError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn rejects_gids_outside_tilesets() {
        let json = r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "layers": [ { "type": "tilelayer", "name": "L", "width": 1, "height": 1,
                          "data": [5] } ] }"#;
        let err = TileMap::from_json_str(json, Path::new("."), 1.0).unwrap_err();
        assert!(matches!(err, TileMapError::UnknownGid { gid: 5, .. }));
    }

    #[test]
    fn rejects_xml_tilesets() {
        let json = r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "tilesets": [ { "firstgid": 1, "source": "tiles.tsx" } ], "layers": [] }"#;
        let err = TileMap::from_json_str(json, Path::new("."), 1.0).unwrap_err();
        assert!(matches!(err, TileMapError::UnsupportedTileset(_)));
    }

    #[test]
    fn object_properties_override_tile_properties() {
        let json = r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "tilesets": [ { "firstgid": 1, "name": "lifts", "image": "t.png",
                "imagewidth": 8, "imageheight": 8, "columns": 1, "tilecount": 1,
                "tilewidth": 8, "tileheight": 8,
                "tiles": [ { "id": 0, "properties": [
                    { "name": "change_x", "type": "float", "value": 1 },
                    { "name": "boundary_left", "type": "float", "value": 4 },
                    { "name": "label", "type": "string", "value": "lift" }
                ] } ] } ],
            "layers": [ { "type": "objectgroup", "name": "Moving Platforms", "objects": [
                { "id": 1, "gid": 1, "x": 0, "y": 8, "width": 8, "height": 8,
                  "properties": [ { "name": "change_x", "type": "float", "value": 3 } ] }
            ] } ] }"#;
        let map = TileMap::from_json_str(json, Path::new("."), 1.0).expect("map parses");
        let lift = &map.layers[0].tiles[0];
        assert_eq!(lift.properties.get_f32("change_x"), Some(3.0));
        assert_eq!(lift.properties.get_f32("boundary_left"), Some(4.0));
        assert_eq!(lift.properties.get_f32("label"), None);
        assert_eq!(lift.properties.get_f32("change_y"), None);
    }

    #[test]
    fn parses_argb_colours() {
        assert_eq!(parse_color("#80ff0000"), Some([1.0, 0.0, 0.0, 128.0 / 255.0]));
        assert_eq!(parse_color("#12345"), None);
    }
}
