//! Tile classification and the character-grid tile map.
//!
//! A map is a 2-D grid of characters. Each character may name a tile in the
//! [`TileSet`]; characters that do not (spaces, spawn markers, typos) are
//! simply empty cells. A tile carries a [`CollisionType`] and a collision
//! box local to its 16x16 cell.
//!
//! # Tile set file format
//!
//! ```json
//! [
//!   { "char": "#", "name": "wall", "collision": "solid" },
//!   { "char": "=", "name": "ledge", "color": [255, 0, 0, 255], "box": [0, 0, 16, 4] }
//! ]
//! ```
//!
//! `collision` and `color` are alternatives: a marker colour is classified
//! with [`CollisionType::from_color`].

use bevy_ecs::prelude::Resource;
use glam::{IVec2, Vec2};
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::components::boxcollider::Aabb;
use crate::physics::TileLookup;

/// Side length of a map cell in world units.
pub const TILE_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionType {
    #[default]
    None,
    Solid,
    #[serde(rename = "oneway")]
    OneWay,
    #[serde(rename = "ypassable")]
    YPassable,
}

impl CollisionType {
    /// Classify a collision marker colour.
    ///
    /// Transparent pixels mean no collision. When blue beats green, red
    /// beating blue makes the tile one-way and anything else is solid.
    /// Otherwise red beating green is one-way and the rest is y-passable, so
    /// greys and red-green ties fall through to y-passable.
    pub fn from_color(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba;
        if a == 0 {
            return CollisionType::None;
        }
        if b > g {
            if r > b {
                CollisionType::OneWay
            } else {
                CollisionType::Solid
            }
        } else if r > g {
            CollisionType::OneWay
        } else {
            CollisionType::YPassable
        }
    }
}

/// Collision information for one tile kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TileInfo {
    pub name: String,
    /// Collision box relative to the cell's top-left corner.
    pub collision_box: Aabb,
    pub collision_type: CollisionType,
}

impl TileInfo {
    pub fn new(name: impl Into<String>, collision_box: Aabb, collision_type: CollisionType) -> Self {
        let collision_box = if collision_type == CollisionType::None || collision_box.is_empty() {
            Aabb::EMPTY
        } else {
            collision_box
        };
        let collision_type = if collision_box.is_empty() {
            CollisionType::None
        } else {
            collision_type
        };
        Self {
            name: name.into(),
            collision_box,
            collision_type,
        }
    }

    pub fn full(name: impl Into<String>, collision_type: CollisionType) -> Self {
        Self::new(name, Aabb::from_xywh(0.0, 0.0, TILE_SIZE, TILE_SIZE), collision_type)
    }
}

#[derive(Debug, Deserialize)]
struct TileDef {
    #[serde(rename = "char")]
    ch: char,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    collision: Option<CollisionType>,
    #[serde(default)]
    color: Option<[u8; 4]>,
    #[serde(default, rename = "box")]
    collision_box: Option<[f32; 4]>,
}

/// Character-to-tile mapping.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    tiles: FxHashMap<char, TileInfo>,
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tiles the bundled maps are drawn with.
    pub fn standard() -> Self {
        let mut set = Self::new();
        set.insert('#', TileInfo::full("wall", CollisionType::Solid));
        set.insert(
            '(',
            TileInfo::new("edge_left", Aabb::from_xywh(2.0, 0.0, 14.0, 16.0), CollisionType::Solid),
        );
        set.insert(
            ')',
            TileInfo::new("edge_right", Aabb::from_xywh(0.0, 0.0, 14.0, 16.0), CollisionType::Solid),
        );
        set.insert(
            '=',
            TileInfo::new("ledge", Aabb::from_xywh(0.0, 0.0, 16.0, 4.0), CollisionType::OneWay),
        );
        set.insert('~', TileInfo::full("vines", CollisionType::YPassable));
        set.insert('§', TileInfo::new("decor", Aabb::EMPTY, CollisionType::None));
        set
    }

    pub fn insert(&mut self, ch: char, tile: TileInfo) {
        self.tiles.insert(ch, tile);
    }

    pub fn get(&self, ch: char) -> Option<&TileInfo> {
        self.tiles.get(&ch)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let defs: Vec<TileDef> =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse tile set: {}", e))?;
        let mut set = Self::new();
        for def in defs {
            let collision_type = match (def.collision, def.color) {
                (Some(t), _) => t,
                (None, Some(rgba)) => CollisionType::from_color(rgba),
                (None, None) => {
                    return Err(format!(
                        "Tile '{}' needs either a collision type or a marker color",
                        def.ch
                    ));
                }
            };
            let collision_box = match def.collision_box {
                Some([x, y, w, h]) => Aabb::from_xywh(x, y, w, h),
                None => Aabb::from_xywh(0.0, 0.0, TILE_SIZE, TILE_SIZE),
            };
            let name = def.name.unwrap_or_else(|| def.ch.to_string());
            set.insert(def.ch, TileInfo::new(name, collision_box, collision_type));
        }
        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read tile set {}: {}", path.display(), e))?;
        let set = Self::from_json_str(&json)?;
        info!("Loaded {} tiles from {}", set.len(), path.display());
        Ok(set)
    }
}

/// Read-only tile grid used by collision resolution.
#[derive(Resource, Debug, Clone)]
pub struct TileMap {
    width: usize,
    height: usize,
    /// Row-major cells.
    cells: Vec<char>,
    tileset: TileSet,
}

impl TileMap {
    /// Build a map from rows of characters. Short rows are padded with spaces.
    pub fn from_rows(rows: &[&str], tileset: TileSet) -> Result<Self, String> {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        if width == 0 || height == 0 {
            return Err("Map is empty".to_string());
        }
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            let mut n = 0;
            for c in row.chars() {
                cells.push(c);
                n += 1;
            }
            cells.extend(std::iter::repeat_n(' ', width - n));
        }
        Ok(Self {
            width,
            height,
            cells,
            tileset,
        })
    }

    pub fn from_text(text: &str, tileset: TileSet) -> Result<Self, String> {
        let rows: Vec<&str> = text.lines().collect();
        Self::from_rows(&rows, tileset)
    }

    /// Read a map whose right half mirrors the left half.
    ///
    /// Cells right of the centre column copy their mirror image from the
    /// left, with `(` and `)` swapped so edge tiles face the right way.
    pub fn from_text_mirrored(text: &str, tileset: TileSet) -> Result<Self, String> {
        let mut map = Self::from_text(text, tileset)?;
        let w = map.width;
        for y in 0..map.height {
            for x in (w / 2 + 1)..w {
                let c = match map.cells[y * w + (w - x - 1)] {
                    '(' => ')',
                    ')' => '(',
                    c => c,
                };
                map.cells[y * w + x] = c;
            }
        }
        Ok(map)
    }

    pub fn load(path: impl AsRef<Path>, tileset: TileSet, mirrored: bool) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read map {}: {}", path.display(), e))?;
        let map = if mirrored {
            Self::from_text_mirrored(&text, tileset)?
        } else {
            Self::from_text(&text, tileset)?
        };
        info!(
            "Loaded map {} ({}x{} cells{})",
            path.display(),
            map.width,
            map.height,
            if mirrored { ", mirrored" } else { "" }
        );
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    /// Cell coordinate containing a world position.
    pub fn cell_of(world: Vec2) -> IVec2 {
        (world / TILE_SIZE).floor().as_ivec2()
    }

    pub fn cell(&self, cell: IVec2) -> Option<char> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Every cell holding one of `markers`, with the cell's top-left world position.
    pub fn find_markers(&self, markers: &[char]) -> Vec<(char, Vec2)> {
        let mut found = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.cells[y * self.width + x];
                if markers.contains(&c) {
                    found.push((c, Vec2::new(x as f32, y as f32) * TILE_SIZE));
                }
            }
        }
        found
    }
}

impl TileLookup for TileMap {
    fn char_at(&self, world: Vec2) -> Option<char> {
        self.cell(Self::cell_of(world))
    }

    fn tile_from_char(&self, ch: char) -> Option<&TileInfo> {
        self.tileset.get(ch)
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_xywh(
            0.0,
            0.0,
            self.width as f32 * TILE_SIZE,
            self.height as f32 * TILE_SIZE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_color_dominant_channel() {
        assert_eq!(CollisionType::from_color([0, 0, 0, 0]), CollisionType::None);
        assert_eq!(CollisionType::from_color([255, 10, 10, 255]), CollisionType::OneWay);
        assert_eq!(CollisionType::from_color([10, 255, 10, 255]), CollisionType::YPassable);
        assert_eq!(CollisionType::from_color([0, 0, 255, 255]), CollisionType::Solid);
    }

    #[test]
    fn test_from_color_ties() {
        // blue level with red stays solid
        assert_eq!(CollisionType::from_color([200, 10, 200, 255]), CollisionType::Solid);
        // nothing beats green: y-passable
        assert_eq!(CollisionType::from_color([0, 0, 0, 255]), CollisionType::YPassable);
        assert_eq!(CollisionType::from_color([128, 128, 128, 255]), CollisionType::YPassable);
        assert_eq!(CollisionType::from_color([200, 200, 50, 255]), CollisionType::YPassable);
        // red over green with blue tied to green is one-way
        assert_eq!(CollisionType::from_color([200, 50, 50, 255]), CollisionType::OneWay);
    }

    #[test]
    fn test_empty_box_classifies_as_none() {
        let t = TileInfo::new("glass", Aabb::EMPTY, CollisionType::Solid);
        assert_eq!(t.collision_type, CollisionType::None);
    }

    #[test]
    fn test_tileset_from_json() {
        let json = r##"[
            { "char": "#", "name": "wall", "collision": "solid" },
            { "char": "=", "color": [255, 0, 0, 255], "box": [0, 0, 16, 4] }
        ]"##;
        let set = TileSet::from_json_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get('#').unwrap().collision_type, CollisionType::Solid);
        let ledge = set.get('=').unwrap();
        assert_eq!(ledge.collision_type, CollisionType::OneWay);
        assert_eq!(ledge.collision_box, Aabb::from_xywh(0.0, 0.0, 16.0, 4.0));
        assert_eq!(ledge.name, "=");
    }

    #[test]
    fn test_tileset_from_json_requires_type() {
        let json = r##"[{ "char": "#" }]"##;
        assert!(TileSet::from_json_str(json).is_err());
    }

    #[test]
    fn test_char_at_quantizes_by_tile_size() {
        let map = TileMap::from_rows(&["  #", "## "], TileSet::standard()).unwrap();
        assert_eq!(map.char_at(Vec2::new(33.0, 2.0)), Some('#'));
        assert_eq!(map.char_at(Vec2::new(31.9, 15.9)), Some(' '));
        assert_eq!(map.char_at(Vec2::new(0.0, 16.0)), Some('#'));
        assert_eq!(map.char_at(Vec2::new(-0.5, 0.0)), None);
        assert_eq!(map.char_at(Vec2::new(48.0, 0.0)), None);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let map = TileMap::from_rows(&["###", "#"], TileSet::standard()).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.cell(IVec2::new(2, 1)), Some(' '));
    }

    #[test]
    fn test_empty_map_is_an_error() {
        assert!(TileMap::from_text("", TileSet::standard()).is_err());
    }

    #[test]
    fn test_mirrored_reader_swaps_edges() {
        let map = TileMap::from_text_mirrored("#(  .  )X", TileSet::standard()).unwrap();
        // width 9, columns 5..9 mirror columns 3..0
        let row: String = (0..9).map(|x| map.cell(IVec2::new(x, 0)).unwrap()).collect();
        assert_eq!(row, "#(  .  )#");
    }

    #[test]
    fn test_find_markers() {
        let map = TileMap::from_rows(&["1  ", "  2"], TileSet::standard()).unwrap();
        let markers = map.find_markers(&['1', '2']);
        assert_eq!(markers, vec![('1', Vec2::ZERO), ('2', Vec2::new(32.0, 16.0))]);
    }
}
