use glam::DVec2;

use crate::error::{CollisionError, Result};
use crate::pixel::PixelMask;
use crate::types::*;

/// Geometry of a tile grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileMapDesc {
    /// Columns and rows.
    pub width: u32,
    pub height: u32,
    /// Size of one cell in world units.
    pub tile_size: DVec2,
    /// World position of the upper-left corner of cell (0, 0).
    pub origin: DVec2,
}

impl TileMapDesc {
    pub fn new(width: u32, height: u32, tile_size: DVec2) -> Self {
        Self { width, height, tile_size, origin: DVec2::ZERO }
    }

    pub fn with_origin(mut self, origin: DVec2) -> Self {
        self.origin = origin;
        self
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct TileCell {
    /// Relative to the cell center; never rotated or mirrored.
    shape: Shape,
    enabled: bool,
}

/// Static per-cell collision shapes.
#[derive(Clone, Debug)]
pub struct TileMap {
    desc: TileMapDesc,
    cells: Vec<TileCell>,
}

impl TileMap {
    pub fn new(desc: TileMapDesc) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            return Err(CollisionError::InvalidConfig(format!(
                "tile map must have at least one cell, got {}x{}",
                desc.width, desc.height
            )));
        }
        if !(desc.tile_size.x > 0.0 && desc.tile_size.y > 0.0) {
            return Err(CollisionError::InvalidConfig(format!(
                "tile size must be positive, got {}",
                desc.tile_size
            )));
        }
        let cell = TileCell { shape: Shape::None, enabled: true };
        Ok(Self { desc, cells: vec![cell; desc.width as usize * desc.height as usize] })
    }

    pub fn desc(&self) -> &TileMapDesc {
        &self.desc
    }

    pub fn contains(&self, loc: TileLoc) -> bool {
        loc.x >= 0 && loc.y >= 0 && (loc.x as u32) < self.desc.width && (loc.y as u32) < self.desc.height
    }

    fn index(&self, loc: TileLoc) -> Result<usize> {
        if !self.contains(loc) {
            return Err(CollisionError::TileOutOfRange {
                x: loc.x,
                y: loc.y,
                width: self.desc.width,
                height: self.desc.height,
            });
        }
        Ok(loc.y as usize * self.desc.width as usize + loc.x as usize)
    }

    /// World center of a cell (also defined outside the grid).
    pub fn center(&self, loc: TileLoc) -> DVec2 {
        let cell = DVec2::new(loc.x as f64 + 0.5, loc.y as f64 + 0.5);
        self.desc.origin + cell * self.desc.tile_size
    }

    /// Cell containing a world point, if it lies on the grid.
    pub fn loc_at(&self, p: DVec2) -> Option<TileLoc> {
        let q = ((p - self.desc.origin) / self.desc.tile_size).floor();
        let loc = TileLoc::new(q.x as i32, q.y as i32);
        self.contains(loc).then_some(loc)
    }

    /// Assigning an image gives the cell a rectangle of the image size;
    /// clearing it removes the cell's shape.
    pub fn set_image(&mut self, loc: TileLoc, image: Option<&PixelMask>) -> Result<()> {
        let i = self.index(loc)?;
        self.cells[i].shape = match image {
            Some(mask) => Shape::Rectangle(Rectangle::axis_aligned(DVec2::ZERO, mask.size() * 0.5)),
            None => Shape::None,
        };
        Ok(())
    }

    /// Sets the shape of a cell, relative to its center.
    pub fn declare(&mut self, loc: TileLoc, shape: Shape) -> Result<()> {
        let kind = shape.kind();
        if matches!(kind, ShapeKind::None | ShapeKind::PixelMask) {
            return Err(CollisionError::IllegalShape { kind, registry: "tile" });
        }
        let i = self.index(loc)?;
        self.cells[i].shape = shape;
        Ok(())
    }

    pub fn set_enabled(&mut self, loc: TileLoc, enabled: bool) -> Result<()> {
        let i = self.index(loc)?;
        self.cells[i].enabled = enabled;
        Ok(())
    }

    pub fn active_kind(&self, loc: TileLoc) -> Result<ShapeKind> {
        Ok(self.cells[self.index(loc)?].shape.kind())
    }

    /// Cell shape in world space; `Shape::None` when disabled or off the grid.
    pub fn world_shape(&self, loc: TileLoc) -> Shape {
        match self.index(loc) {
            Ok(i) if self.cells[i].enabled => self.cells[i].shape.translated(self.center(loc)),
            _ => Shape::None,
        }
    }

    pub fn shaped_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.shape.is_none()).count()
    }
}
