#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Screen-space projection of walls and billboard sprites.
//!
//! The depth buffer produced from a frame of rays is the only occlusion
//! structure: walls are drawn as one strip per ray and sprites are clipped
//! column by column against the recorded wall distances.

use crawler_core::{EngineConfig, EntitySnapshot, PlayerPose};
use crawler_system_raycaster::Ray;
use glam::Vec2;

/// Field of view that maps to a camera plane of unit length.
pub const SPRITE_PLANE_REFERENCE_FOV: f32 = 100.0;

/// Smallest depth used when scaling sprites and wall strips.
pub const MIN_DEPTH: f32 = 0.1;

/// Dimensions of the 3D view and the camera parameters used to fill it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width of the view in pixels.
    pub screen_width: f32,
    /// Height of the view in pixels.
    pub screen_height: f32,
    /// Horizontal field of view in degrees.
    pub fov_degrees: f32,
    /// Side length of a tile in world units.
    pub tile_size: f32,
}

impl Viewport {
    /// Derives the viewport from the engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            screen_width: config.screen_width as f32,
            screen_height: config.screen_height as f32,
            fov_degrees: config.fov_degrees,
            tile_size: config.tile_size,
        }
    }

    /// Distance from the eye to the projection plane in pixels.
    #[must_use]
    pub fn projection_plane_distance(&self) -> f32 {
        projection_plane_distance(self.screen_width, self.fov_degrees)
    }
}

/// Distance from the eye to a projection plane `screen_width` pixels wide.
#[must_use]
pub fn projection_plane_distance(screen_width: f32, fov_degrees: f32) -> f32 {
    (screen_width / 2.0) / (fov_degrees.to_radians() / 2.0).tan()
}

/// Corrected wall distance for every ray of a completed frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepthBuffer {
    distances: Vec<f32>,
}

impl DepthBuffer {
    /// Captures the corrected distances of a frame of rays in column order.
    #[must_use]
    pub fn from_rays(rays: &[Ray]) -> Self {
        Self {
            distances: rays.iter().map(|ray| ray.corrected_distance).collect(),
        }
    }

    /// Number of recorded columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Reports whether no rays were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Wall distance recorded for a depth column.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.distances.get(index).copied()
    }

    /// Depth column covering the provided screen column.
    #[must_use]
    pub fn index_for_screen_x(&self, screen_x: i64, screen_width: f32) -> Option<usize> {
        if screen_x < 0 || screen_width <= 0.0 {
            return None;
        }
        let index = (screen_x as f32 * self.distances.len() as f32 / screen_width).floor();
        let index = index as usize;
        (index < self.distances.len()).then_some(index)
    }
}

/// Vertical wall slice drawn for one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallStrip {
    /// Index of the ray that produced the strip.
    pub column: usize,
    /// Left edge of the strip in pixels.
    pub screen_x: f32,
    /// Width of the strip in pixels.
    pub width: f32,
    /// Top edge of the strip in pixels.
    pub top: f32,
    /// Height of the strip in pixels.
    pub height: f32,
    /// Texture of the struck wall; `None` draws background.
    pub texture_id: Option<u16>,
    /// Horizontal texture coordinate in `0.0..1.0`.
    pub texture_u: f32,
    /// Corrected distance, usable for distance shading.
    pub distance: f32,
}

/// Converts a frame of rays into wall strips, one per ray.
#[must_use]
pub fn wall_strips(rays: &[Ray], viewport: &Viewport) -> Vec<WallStrip> {
    if rays.is_empty() {
        return Vec::new();
    }

    let plane = viewport.projection_plane_distance();
    let width = viewport.screen_width / rays.len() as f32;
    rays.iter()
        .enumerate()
        .map(|(column, ray)| {
            let height = viewport.tile_size / ray.corrected_distance.max(MIN_DEPTH) * plane;
            let along_face = if ray.hit_vertical_face {
                ray.hit.y
            } else {
                ray.hit.x
            };
            WallStrip {
                column,
                screen_x: column as f32 * width,
                width,
                top: viewport.screen_height / 2.0 - height / 2.0,
                height,
                texture_id: ray.hit_wall.map(|hit| hit.texture_id),
                texture_u: along_face.rem_euclid(viewport.tile_size) / viewport.tile_size,
                distance: ray.corrected_distance,
            }
        })
        .collect()
}

/// Camera-facing sprite placed in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Billboard {
    /// World position of the sprite.
    pub position: Vec2,
    /// Vertical offset; negative values lift the sprite.
    pub elevation: f32,
    /// Scale applied to the texture size.
    pub scale: f32,
    /// Texture width in texels.
    pub texture_width: f32,
    /// Texture height in texels.
    pub texture_height: f32,
}

impl Billboard {
    /// Places the texture of an entity at the entity's position.
    #[must_use]
    pub fn from_snapshot(
        snapshot: &EntitySnapshot,
        texture_width: f32,
        texture_height: f32,
    ) -> Self {
        Self {
            position: snapshot.position,
            elevation: snapshot.elevation,
            scale: snapshot.scale,
            texture_width,
            texture_height,
        }
    }
}

/// One visible screen column of a projected sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteColumn {
    /// Screen column in pixels.
    pub screen_x: i64,
    /// Horizontal texture coordinate in `0.0..1.0`.
    pub texture_u: f32,
}

/// Screen placement of a sprite together with its unoccluded columns.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteProjection {
    /// Distance along the view direction.
    pub depth: f32,
    /// Left edge in pixels.
    pub left: f32,
    /// Top edge in pixels.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Columns in front of the walls, left to right.
    pub columns: Vec<SpriteColumn>,
}

/// Projects a billboard into screen space, clipping it against the depth buffer.
///
/// Returns `None` when the sprite lies behind the viewer or entirely off
/// screen. A projection may still carry no columns when walls hide it.
#[must_use]
pub fn project_sprite(
    billboard: &Billboard,
    pose: &PlayerPose,
    depth: &DepthBuffer,
    viewport: &Viewport,
) -> Option<SpriteProjection> {
    let forward = pose.forward();
    let plane = forward.perp() * (viewport.fov_degrees / SPRITE_PLANE_REFERENCE_FOV);
    let relative = billboard.position - pose.position;

    let inv_det = 1.0 / (plane.x * forward.y - forward.x * plane.y);
    let transform_x = inv_det * (forward.y * relative.x - forward.x * relative.y);
    let transform_y = inv_det * (-plane.y * relative.x + plane.x * relative.y);
    if !(transform_y > 0.0) {
        return None;
    }

    let plane_distance = viewport.projection_plane_distance();
    let sprite_depth = transform_y.max(MIN_DEPTH);
    let height = billboard.texture_height / sprite_depth * plane_distance * billboard.scale;
    let width = billboard.texture_width / sprite_depth * plane_distance * billboard.scale;
    let left = (viewport.screen_width / 2.0) * (1.0 + transform_x / transform_y) - width / 2.0;
    let top = viewport.screen_height / 2.0
        - billboard.elevation * plane_distance / transform_y
        - height / 2.0;

    if left + width < 0.0 || left > viewport.screen_width {
        return None;
    }

    let screen_width = viewport.screen_width.floor() as i64;
    let mut columns = Vec::new();
    for x in 0..width.ceil() as i64 {
        let screen_x = (left + x as f32).floor() as i64;
        if screen_x < 0 || screen_x >= screen_width {
            continue;
        }
        let Some(wall_distance) = depth
            .index_for_screen_x(screen_x, viewport.screen_width)
            .and_then(|index| depth.get(index))
        else {
            continue;
        };
        if transform_y < wall_distance {
            columns.push(SpriteColumn {
                screen_x,
                texture_u: x as f32 / width,
            });
        }
    }

    Some(SpriteProjection {
        depth: transform_y,
        left,
        top,
        width,
        height,
        columns,
    })
}

/// Projects a batch of keyed billboards and orders them farthest first for painting.
#[must_use]
pub fn project_all<K>(
    billboards: impl IntoIterator<Item = (K, Billboard)>,
    pose: &PlayerPose,
    depth: &DepthBuffer,
    viewport: &Viewport,
) -> Vec<(K, SpriteProjection)> {
    let mut projected: Vec<_> = billboards
        .into_iter()
        .filter_map(|(key, billboard)| {
            project_sprite(&billboard, pose, depth, viewport).map(|projection| (key, projection))
        })
        .collect();
    projected.sort_by(|(_, a), (_, b)| b.depth.total_cmp(&a.depth));
    projected
}
