#![forbid(unsafe_code)]

//! Frame = Buffer + metadata for one render pass.
//!
//! Widgets draw into [`Frame::buffer`], place the hardware cursor with
//! [`Frame::set_cursor`] and register clickable regions in the hit grid so
//! later mouse events can be resolved to a widget and a payload.
//!
//! ```
//! use sift_core::geometry::Rect;
//! use sift_render::frame::{Frame, HitId, HitRegion};
//!
//! let mut frame = Frame::with_hit_grid(20, 5);
//! frame.register_hit(Rect::new(0, 1, 20, 1), HitId::new(7), HitRegion::Content, 42);
//! assert_eq!(frame.hit_test(3, 1), Some((HitId::new(7), HitRegion::Content, 42)));
//! assert_eq!(frame.hit_test(3, 2), None);
//! ```

use crate::buffer::Buffer;
use sift_core::geometry::Rect;

/// Identifier of the widget that owns a hit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HitId(pub u32);

impl HitId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Widget-defined payload attached to a hit region.
pub type HitData = u64;

/// Which part of a widget a hit region covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitRegion {
    #[default]
    None,
    Content,
    Border,
    Scrollbar,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct HitCell {
    widget_id: Option<HitId>,
    region: HitRegion,
    data: HitData,
}

/// Screen-sized map from cell to the last region registered over it.
#[derive(Debug, Clone)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<HitCell>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![HitCell::default(); width as usize * height as usize],
        }
    }

    /// Map every cell of `rect` (clipped to the grid) to the given hit.
    pub fn register(&mut self, rect: Rect, widget_id: HitId, region: HitRegion, data: HitData) {
        let clipped = rect.intersection(&Rect::from_size(self.width, self.height));
        if clipped.is_empty() {
            return;
        }
        let hit = HitCell {
            widget_id: Some(widget_id),
            region,
            data,
        };
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * self.width as usize;
            self.cells[row + clipped.x as usize..row + clipped.right() as usize].fill(hit);
        }
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let cell = self.cells[y as usize * self.width as usize + x as usize];
        cell.widget_id.map(|id| (id, cell.region, cell.data))
    }

    pub fn clear(&mut self) {
        self.cells.fill(HitCell::default());
    }
}

/// The render target handed to `view` and to widgets.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The cell grid for this pass.
    pub buffer: Buffer,
    /// Present only when mouse hit testing is wanted.
    pub hit_grid: Option<HitGrid>,
    /// Where the hardware cursor should be shown, if anywhere.
    pub cursor_position: Option<(u16, u16)>,
    pub cursor_visible: bool,
}

impl Frame {
    /// A frame without hit testing.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hit_grid: None,
            cursor_position: None,
            cursor_visible: true,
        }
    }

    /// A frame with a hit grid covering the whole buffer.
    pub fn with_hit_grid(width: u16, height: u16) -> Self {
        Self {
            hit_grid: Some(HitGrid::new(width, height)),
            ..Self::new(width, height)
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.buffer.bounds()
    }

    /// Reset cells, hits and cursor for the next pass.
    pub fn clear(&mut self) {
        self.buffer.clear();
        if let Some(grid) = self.hit_grid.as_mut() {
            grid.clear();
        }
        self.cursor_position = None;
    }

    #[inline]
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor_position = position;
    }

    #[inline]
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    /// Register a hit region clipped to the buffer's current scissor.
    ///
    /// Returns `false` when the frame has no hit grid.
    pub fn register_hit(
        &mut self,
        rect: Rect,
        id: HitId,
        region: HitRegion,
        data: HitData,
    ) -> bool {
        let Some(grid) = self.hit_grid.as_mut() else {
            return false;
        };
        let clipped = rect.intersection(&self.buffer.current_scissor());
        if !clipped.is_empty() {
            grid.register(clipped, id, region, data);
        }
        true
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        self.hit_grid.as_ref().and_then(|grid| grid.hit_test(x, y))
    }
}
