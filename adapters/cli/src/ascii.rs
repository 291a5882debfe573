//! Text renditions of a frame for terminals.

use std::collections::BTreeSet;

use crawler_core::{CellCoord, EntityKind, EntitySnapshot};
use crawler_system_projection::Viewport;
use crawler_world::{query, Session};

use crate::frame::FrameReport;

const VIEW_COLUMNS: usize = 80;
const VIEW_ROWS: usize = 24;
const SHADES: [char; 4] = ['#', '%', '+', '-'];

/// Renders the first-person view: wall strips shaded by distance, sprites on top.
pub(crate) fn render_view(frame: &FrameReport, viewport: &Viewport) -> String {
    let column_width = viewport.screen_width / VIEW_COLUMNS as f32;
    let row_height = viewport.screen_height / VIEW_ROWS as f32;
    let mut canvas: Vec<Vec<char>> = (0..VIEW_ROWS)
        .map(|row| {
            let fill = if row < VIEW_ROWS / 2 { ' ' } else { '.' };
            vec![fill; VIEW_COLUMNS]
        })
        .collect();

    if let Some(first) = frame.strips.first() {
        for column in 0..VIEW_COLUMNS {
            let screen_x = (column as f32 + 0.5) * column_width;
            let index = ((screen_x / first.width) as usize).min(frame.strips.len() - 1);
            let strip = &frame.strips[index];
            if strip.texture_id.is_none() {
                continue;
            }

            let shade = shade(strip.distance / viewport.tile_size);
            for row in row_span(strip.top, strip.height, row_height) {
                canvas[row][column] = shade;
            }
        }
    }

    for (entity, projection) in &frame.sprites {
        let glyph = glyph(entity);
        for sprite_column in &projection.columns {
            let column = (sprite_column.screen_x as f32 / column_width) as usize;
            if column >= VIEW_COLUMNS {
                continue;
            }
            for row in row_span(projection.top, projection.height, row_height) {
                canvas[row][column] = glyph;
            }
        }
    }

    join(canvas)
}

/// Renders a top-down map with walls, entities and the player.
pub(crate) fn render_minimap(session: &Session, frame: &FrameReport) -> String {
    let grid = query::grid(session);
    let tile_size = query::config(session).tile_size;
    let walls: BTreeSet<CellCoord> = query::walls(session).iter().map(|wall| wall.cell()).collect();
    let entities = query::entity_view(session);
    let player = CellCoord::from_world(frame.pose.position, tile_size);

    let canvas = (0..grid.rows())
        .map(|row| {
            (0..grid.columns())
                .map(|column| {
                    let cell = CellCoord::new(column, row);
                    if Some(cell) == player {
                        return '@';
                    }
                    if walls.contains(&cell) {
                        return '#';
                    }
                    entities
                        .iter()
                        .find(|entity| {
                            CellCoord::from_world(entity.position, tile_size) == Some(cell)
                        })
                        .map_or('.', glyph)
                })
                .collect()
        })
        .collect();
    join(canvas)
}

fn row_span(top: f32, height: f32, row_height: f32) -> std::ops::Range<usize> {
    let first = (top / row_height).floor().max(0.0) as usize;
    let last = ((top + height) / row_height).ceil().max(0.0) as usize;
    first.min(VIEW_ROWS)..last.min(VIEW_ROWS)
}

fn shade(distance_in_tiles: f32) -> char {
    let index = (distance_in_tiles / 2.0) as usize;
    SHADES[index.min(SHADES.len() - 1)]
}

fn glyph(entity: &EntitySnapshot) -> char {
    let initial = entity.name.chars().next().unwrap_or('?');
    match entity.kind {
        EntityKind::Hostile(_) => initial.to_ascii_uppercase(),
        _ => initial.to_ascii_lowercase(),
    }
}

fn join(canvas: Vec<Vec<char>>) -> String {
    canvas
        .into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_clamped_to_the_canvas() {
        assert_eq!(row_span(-100.0, 10_000.0, 25.0), 0..VIEW_ROWS);
        assert_eq!(row_span(250.0, 100.0, 25.0), 10..14);
    }

    #[test]
    fn nearer_walls_use_denser_shades() {
        assert_eq!(shade(0.5), '#');
        assert_eq!(shade(3.0), '%');
        assert_eq!(shade(400.0), '-');
    }
}
