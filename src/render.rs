use std::{
    io::Write,
    path::{Path, PathBuf},
};

use glam::Vec2;
use plotters::prelude::*;
use tracing::info;

use crate::{
    city::City,
    error::{Result, SpreadError},
    layout::Layout,
};

const HUMAN_COLOR: RGBColor = RGBColor(25, 25, 112);
const ZOMBIE_COLOR: RGBColor = RGBColor(46, 139, 87);

/// Draws one frame of a run.
pub trait Visualizer {
    /// Persists the frame at `target` and returns where it went, or shows it
    /// transiently and returns `None` when there is no target.
    fn draw(&mut self, city: &City, layout: &Layout, target: Option<&Path>)
        -> Result<Option<PathBuf>>;
}

/// PNG frames through plotters' bitmap backend.
pub struct BitmapVisualizer {
    width: u32,
    height: u32,
    node_radius: i32,
    margin: u32,
    terminal_size: (usize, usize),
}

impl BitmapVisualizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            node_radius: 8,
            margin: 20,
            terminal_size: (72, 28),
        }
    }

    pub fn node_radius(mut self, radius: i32) -> Self {
        self.node_radius = radius;
        self
    }

    pub fn terminal_size(mut self, columns: usize, rows: usize) -> Self {
        self.terminal_size = (columns, rows);
        self
    }

    fn to_pixel(&self, p: Vec2) -> (i32, i32) {
        let margin = self.margin as f32;
        let w = self.width as f32 - 2.0 * margin;
        let h = self.height as f32 - 2.0 * margin;
        (
            (margin + (p.x + 1.0) * 0.5 * w).round() as i32,
            (margin + (1.0 - p.y) * 0.5 * h).round() as i32,
        )
    }

    fn save_png(&self, city: &City, layout: &Layout, target: &Path) -> Result<()> {
        let root = BitMapBackend::new(target, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(SpreadError::render)?;

        for (_, a, b) in city.roads() {
            let (Some(pa), Some(pb)) = (layout.position(a), layout.position(b)) else {
                continue;
            };
            root.draw(&PathElement::new(
                vec![self.to_pixel(pa), self.to_pixel(pb)],
                BLACK.mix(0.5).stroke_width(1),
            ))
            .map_err(SpreadError::render)?;
        }

        for node in city.citizens() {
            let Some(p) = layout.position(node) else {
                continue;
            };
            let color = if city.is_zombie(node) {
                ZOMBIE_COLOR
            } else {
                HUMAN_COLOR
            };
            root.draw(&Circle::new(self.to_pixel(p), self.node_radius, color.filled()))
                .map_err(SpreadError::render)?;
        }

        root.present().map_err(SpreadError::render)?;
        Ok(())
    }
}

impl Default for BitmapVisualizer {
    fn default() -> Self {
        Self::new(1000, 1000)
    }
}

impl Visualizer for BitmapVisualizer {
    fn draw(
        &mut self,
        city: &City,
        layout: &Layout,
        target: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        match target {
            Some(path) => {
                self.save_png(city, layout, path)?;
                info!(path = %path.display(), zombies = city.zombie_count(), "frame written");
                Ok(Some(path.to_path_buf()))
            }
            None => {
                let (columns, rows) = self.terminal_size;
                let map = character_map(city, layout, columns, rows);
                let mut out = std::io::stdout().lock();
                writeln!(
                    out,
                    "{map}zombies: {}/{}",
                    city.zombie_count(),
                    city.citizen_count()
                )?;
                Ok(None)
            }
        }
    }
}

/// Plots citizens on a `columns` x `rows` grid, `Z` for zombies and `o`
/// for humans. A zombie wins a cell it shares with a human.
pub fn character_map(city: &City, layout: &Layout, columns: usize, rows: usize) -> String {
    let columns = columns.max(1);
    let rows = rows.max(1);
    let mut grid = vec![vec![' '; columns]; rows];
    for node in city.citizens() {
        let Some(p) = layout.position(node) else {
            continue;
        };
        let col = cell(p.x, columns);
        let row = cell(-p.y, rows);
        let mark = if city.is_zombie(node) { 'Z' } else { 'o' };
        if grid[row][col] != 'Z' {
            grid[row][col] = mark;
        }
    }
    let mut map = String::with_capacity((columns + 1) * rows);
    for line in grid {
        map.extend(line);
        map.push('\n');
    }
    map
}

fn cell(v: f32, cells: usize) -> usize {
    let scaled = ((v.clamp(-1.0, 1.0) + 1.0) * 0.5 * cells as f32) as usize;
    scaled.min(cells - 1)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use image::GenericImageView;
    use petgraph::stable_graph::NodeIndex;

    use super::*;

    fn two_citizens() -> (City, Layout) {
        let mut city = City::from_edges(2, [(0, 1)]);
        city.set_zombie(NodeIndex::new(1), true);
        let layout = Layout::from_positions(HashMap::from([
            (NodeIndex::new(0), Vec2::new(-1.0, 1.0)),
            (NodeIndex::new(1), Vec2::new(1.0, -1.0)),
        ]));
        (city, layout)
    }

    #[test]
    fn character_map_places_corners() {
        let (city, layout) = two_citizens();
        let map = character_map(&city, &layout, 4, 3);
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines, vec!["o   ", "    ", "   Z"]);
    }

    #[test]
    fn zombie_wins_a_shared_cell() {
        let mut city = City::with_citizens(2);
        city.set_zombie(NodeIndex::new(0), true);
        let layout = Layout::from_positions(HashMap::from([
            (NodeIndex::new(0), Vec2::ZERO),
            (NodeIndex::new(1), Vec2::ZERO),
        ]));
        let map = character_map(&city, &layout, 1, 1);
        assert_eq!(map, "Z\n");
    }

    #[test]
    fn png_frame_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let (city, layout) = two_citizens();
        let target = dir.path().join("zombies-0.png");
        let written = BitmapVisualizer::new(64, 64)
            .draw(&city, &layout, Some(target.as_path()))
            .unwrap();
        assert_eq!(written.as_deref(), Some(target.as_path()));
        let img = image::open(&target).unwrap();
        assert_eq!(img.dimensions(), (64, 64));
    }

    #[test]
    fn terminal_view_returns_no_path() {
        let (city, layout) = two_citizens();
        let written = BitmapVisualizer::new(64, 64)
            .node_radius(2)
            .terminal_size(8, 4)
            .draw(&city, &layout, None)
            .unwrap();
        assert!(written.is_none());
    }

    #[test]
    fn unwritable_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (city, layout) = two_citizens();
        let target = dir.path().join("missing").join("frame.png");
        assert!(BitmapVisualizer::new(32, 32)
            .draw(&city, &layout, Some(target.as_path()))
            .is_err());
    }
}
