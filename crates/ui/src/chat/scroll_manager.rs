use gpui::{Pixels, point};
use gpui_component::VirtualListScrollHandle;

/// Keeps the message list pinned to its newest entry.
///
/// Every transcript change requests a scroll; the request is fulfilled on the
/// next render once the list knows its new max offset.
pub struct ScrollManager {
    scroll_handle: VirtualListScrollHandle,
    pending_scroll_to_bottom: bool,
    last_applied_max_offset: Option<Pixels>,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: VirtualListScrollHandle::new(),
            pending_scroll_to_bottom: false,
            last_applied_max_offset: None,
        }
    }

    pub fn handle(&self) -> &VirtualListScrollHandle {
        &self.scroll_handle
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll_to_bottom
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
    }

    /// Scrolls to the tail. Returns true while another frame is needed.
    pub fn apply_pending_scroll(&mut self) -> bool {
        if !self.pending_scroll_to_bottom {
            return false;
        }

        let max_offset = self.scroll_handle.max_offset().height;
        let current_x = self.scroll_handle.offset().x;
        // GPUI scrolls down with negative Y offsets.
        let target_y = if max_offset > Pixels::ZERO {
            -max_offset
        } else {
            Pixels::ZERO
        };
        self.scroll_handle.set_offset(point(current_x, target_y));

        // Freshly appended rows grow max offset on the following layout pass.
        if self.last_applied_max_offset == Some(max_offset) {
            self.pending_scroll_to_bottom = false;
            self.last_applied_max_offset = None;
        } else {
            self.last_applied_max_offset = Some(max_offset);
        }

        self.pending_scroll_to_bottom
    }

    pub fn list_width(&self) -> Pixels {
        self.scroll_handle.bounds().size.width
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}
