//! Geometry of the last drawn frame, kept for mouse hit testing

/// Visible slice of the board table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardViewport {
    /// Terminal row of the first data row
    pub start_y: u16,
    /// Number of data rows that fit
    pub rows: usize,
    /// Display index of the first visible row
    pub scroll: usize,
    pub total: usize,
}

impl BoardViewport {
    /// Adjust the scroll offset so `selected` stays visible
    pub fn follow_selection(&mut self, selected: usize, total: usize, rows: usize) {
        self.total = total;
        self.rows = rows;
        if rows == 0 {
            self.scroll = 0;
            return;
        }
        if selected < self.scroll {
            self.scroll = selected;
        } else if selected >= self.scroll + rows {
            self.scroll = selected + 1 - rows;
        }
        let max_scroll = total.saturating_sub(rows);
        self.scroll = self.scroll.min(max_scroll);
    }

    pub fn visible(&self) -> std::ops::Range<usize> {
        self.scroll..(self.scroll + self.rows).min(self.total)
    }

    pub fn has_more_above(&self) -> bool {
        self.scroll > 0
    }

    pub fn has_more_below(&self) -> bool {
        self.scroll + self.rows < self.total
    }

    pub fn hit_test_row(&self, y: u16) -> Option<usize> {
        let offset = usize::from(y.checked_sub(self.start_y)?);
        if offset >= self.rows {
            return None;
        }
        let index = self.scroll + offset;
        (index < self.total).then_some(index)
    }
}

/// Horizontal layout of the candle plot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartViewport {
    /// Terminal column of the first candle
    pub start_x: u16,
    /// Columns per candle
    pub stride: u16,
    /// Index of the leftmost visible candle
    pub start_index: usize,
    pub visible: usize,
    pub total: usize,
}

impl ChartViewport {
    pub const STRIDE: u16 = 2;

    /// Choose the window of candles for a plot `width` columns wide.
    ///
    /// Defaults to the newest candles and slides only as far as needed to
    /// keep `cursor` in view.
    pub fn layout(start_x: u16, width: u16, total: usize, cursor: Option<usize>) -> Self {
        let visible = usize::from(width / Self::STRIDE).min(total);
        let mut start_index = total - visible;
        if let Some(cursor) = cursor {
            if cursor < start_index {
                start_index = cursor;
            } else if visible > 0 && cursor >= start_index + visible {
                start_index = cursor + 1 - visible;
            }
        }
        Self {
            start_x,
            stride: Self::STRIDE,
            start_index,
            visible,
            total,
        }
    }

    /// Terminal column of the candle at `index`, if it is on screen
    pub fn column_of(&self, index: usize) -> Option<u16> {
        if index < self.start_index || index >= self.start_index + self.visible {
            return None;
        }
        let col = u16::try_from(index - self.start_index).ok()?;
        Some(self.start_x + col * self.stride)
    }

    pub fn hit_test_candle(&self, x: u16) -> Option<usize> {
        if self.stride == 0 {
            return None;
        }
        let col = usize::from(x.checked_sub(self.start_x)? / self.stride);
        if col >= self.visible {
            return None;
        }
        let index = self.start_index + col;
        (index < self.total).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_scroll_keeps_selection_visible() {
        let mut viewport = BoardViewport {
            start_y: 4,
            ..BoardViewport::default()
        };
        viewport.follow_selection(0, 30, 10);
        assert_eq!(viewport.scroll, 0);
        assert!(!viewport.has_more_above());
        assert!(viewport.has_more_below());

        viewport.follow_selection(15, 30, 10);
        assert_eq!(viewport.scroll, 6);
        assert_eq!(viewport.visible(), 6..16);

        viewport.follow_selection(3, 30, 10);
        assert_eq!(viewport.scroll, 3);
    }

    #[test]
    fn test_board_scroll_shrinks_with_list() {
        let mut viewport = BoardViewport::default();
        viewport.follow_selection(29, 30, 10);
        assert_eq!(viewport.scroll, 20);
        viewport.follow_selection(4, 5, 10);
        assert_eq!(viewport.scroll, 0);
        assert!(!viewport.has_more_below());
    }

    #[test]
    fn test_board_hit_test() {
        let mut viewport = BoardViewport {
            start_y: 4,
            ..BoardViewport::default()
        };
        viewport.follow_selection(12, 20, 5);
        assert_eq!(viewport.hit_test_row(3), None);
        assert_eq!(viewport.hit_test_row(4), Some(8));
        assert_eq!(viewport.hit_test_row(8), Some(12));
        assert_eq!(viewport.hit_test_row(9), None);

        let mut short = BoardViewport {
            start_y: 4,
            ..BoardViewport::default()
        };
        short.follow_selection(0, 2, 5);
        assert_eq!(short.hit_test_row(6), None);
    }

    #[test]
    fn test_chart_window_defaults_to_newest() {
        let viewport = ChartViewport::layout(14, 20, 100, None);
        assert_eq!(viewport.visible, 10);
        assert_eq!(viewport.start_index, 90);
        assert_eq!(viewport.column_of(99), Some(32));
        assert_eq!(viewport.column_of(89), None);
    }

    #[test]
    fn test_chart_window_follows_cursor() {
        let viewport = ChartViewport::layout(14, 20, 100, Some(5));
        assert_eq!(viewport.start_index, 5);
        assert_eq!(viewport.hit_test_candle(14), Some(5));
        assert_eq!(viewport.hit_test_candle(17), Some(6));
        assert_eq!(viewport.hit_test_candle(13), None);
        assert_eq!(viewport.hit_test_candle(34), None);
    }

    #[test]
    fn test_chart_window_with_few_candles() {
        let viewport = ChartViewport::layout(14, 80, 3, Some(2));
        assert_eq!(viewport.start_index, 0);
        assert_eq!(viewport.visible, 3);
        assert_eq!(viewport.hit_test_candle(18), Some(2));
        assert_eq!(viewport.hit_test_candle(20), None);
    }
}
