//! Text rendering of the map and the live entities.
//!
//! Used by the command-line runner to dump frames while the simulation runs.
//! Each map cell becomes one character; an entity is drawn in the cell that
//! holds the centre of its bounding box.
//!
//! | Glyph   | Meaning                       |
//! |---------|-------------------------------|
//! | tile    | the tile's map character      |
//! | `1`-`9` | wizard of that player         |
//! | `*`     | bullet                        |
//! | `^`     | spike                         |

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::lifecycle::{Dead, Hazard, Player, Projectile};
use crate::components::rigidbody::RigidBody;
use crate::resources::tilemap::TileMap;

/// Draw `map` with `glyphs` (world position, character) on top.
///
/// Characters that are not tiles (spawn markers, blanks) render as spaces.
/// Later glyphs overwrite earlier ones in the same cell.
pub fn ascii_frame(map: &TileMap, glyphs: &[(Vec2, char)]) -> String {
    let (w, h) = (map.width(), map.height());
    let mut grid: Vec<Vec<char>> = (0..h)
        .map(|y| {
            (0..w)
                .map(|x| {
                    map.cell(glam::IVec2::new(x as i32, y as i32))
                        .filter(|c| map.tileset().get(*c).is_some())
                        .unwrap_or(' ')
                })
                .collect()
        })
        .collect();

    for (position, glyph) in glyphs {
        let cell = TileMap::cell_of(*position);
        if cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < w && (cell.y as usize) < h {
            grid[cell.y as usize][cell.x as usize] = *glyph;
        }
    }

    let mut out = String::with_capacity((w + 1) * h);
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

fn glyph_for(player: Option<&Player>, projectile: bool, hazard: bool) -> char {
    if let Some(player) = player {
        char::from_digit(player.index as u32, 10).unwrap_or('@')
    } else if projectile {
        '*'
    } else if hazard {
        '^'
    } else {
        '?'
    }
}

/// Render the [`TileMap`] resource with every live body.
pub fn world_frame(world: &mut World) -> String {
    let mut query = world.query_filtered::<(
        &RigidBody,
        Option<&Player>,
        Has<Projectile>,
        Has<Hazard>,
    ), Without<Dead>>();
    let mut glyphs: Vec<(Vec2, char)> = query
        .iter(world)
        .map(|(body, player, projectile, hazard)| {
            (body.bounding_box.center(), glyph_for(player, projectile, hazard))
        })
        .collect();
    // wizards on top
    glyphs.sort_by_key(|(_, c)| c.is_ascii_digit());
    let map = world.resource::<TileMap>();
    ascii_frame(map, &glyphs)
}
