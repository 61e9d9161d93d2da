//! Paged, wrapped text for the text box.
//!
//! Content is a list of logical lines. A page shows `lines_per_page` rendered
//! rows starting at logical line `index * lines_per_page`; logical lines that
//! do not fit in one row are wrapped onto continuation rows, which may push
//! later lines of the same page off the bottom.

use crate::backend::Rect;

/// Marker drawn in the last cell of a row that continues on the next row.
/// Continuation rows draw it mirrored in their first cell.
pub const WRAP_MARKER: &str = "\u{23CE}";

/// Monospace font metrics at the text font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    /// Advance of one glyph (measured on `"M"`).
    pub glyph_width: u32,
    pub line_height: u32,
}

/// How much text fits into the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// At least 3, so a wrapped continuation row always holds one character
    /// between its markers.
    pub chars_per_line: usize,
    /// At least 1.
    pub lines_per_page: usize,
}

impl Capacity {
    pub fn new(textbox: Rect, metrics: TextMetrics) -> Self {
        let chars = textbox.w / metrics.glyph_width.max(1);
        let lines = textbox.h / metrics.line_height.max(1);
        Self {
            chars_per_line: (chars as usize).max(3),
            lines_per_page: (lines as usize).max(1),
        }
    }
}

/// One row on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedLine {
    pub text: String,
    /// Row continues a wrapped line; a mirrored marker occupies cell 0.
    pub wrap_in: bool,
    /// Row is continued below; a marker occupies the last cell.
    pub wrap_out: bool,
}

/// The rows of the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPage {
    pub lines: Vec<RenderedLine>,
    pub index: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Number of the last page.
///
/// This is `floor(total / lines_per_page)`, so content that exactly fills
/// `n` pages still allows scrolling onto an empty page `n`.
pub fn page_count(total_lines: usize, lines_per_page: usize) -> usize {
    total_lines / lines_per_page.max(1)
}

/// Step `index` one page and clamp it to `[0, page_count]`.
pub fn scroll(index: usize, direction: ScrollDirection, page_count: usize) -> usize {
    let next = match direction {
        ScrollDirection::Up => index.saturating_sub(1),
        ScrollDirection::Down => index.saturating_add(1),
    };
    next.min(page_count)
}

/// Wrap `line` into rows of at most `chars_per_line` cells, appending to
/// `out` until it holds `max_rows` rows.
fn wrap_into(line: &str, chars_per_line: usize, max_rows: usize, out: &mut Vec<RenderedLine>) {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() < chars_per_line {
        out.push(RenderedLine {
            text: line.to_string(),
            ..Default::default()
        });
        return;
    }

    let first = chars_per_line - 1;
    out.push(RenderedLine {
        text: chars[..first].iter().collect(),
        wrap_in: false,
        wrap_out: true,
    });
    let mut rest = &chars[first..];
    while !rest.is_empty() && out.len() < max_rows {
        // A closing row has room for everything after the opening marker.
        let take = if rest.len() < chars_per_line {
            rest.len()
        } else {
            chars_per_line - 2
        };
        out.push(RenderedLine {
            text: rest[..take].iter().collect(),
            wrap_in: true,
            wrap_out: take < rest.len(),
        });
        rest = &rest[take..];
    }
}

/// Render page `index` of `lines`.
pub fn render_page(lines: &[String], index: usize, capacity: Capacity) -> Vec<RenderedLine> {
    let lpp = capacity.lines_per_page;
    let start = index.saturating_mul(lpp);
    let mut rows = Vec::with_capacity(lpp);
    for line in lines.iter().skip(start) {
        if rows.len() >= lpp {
            break;
        }
        wrap_into(line, capacity.chars_per_line, lpp, &mut rows);
    }
    rows
}

/// Text box content plus the current page index.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    lines: Vec<String>,
    index: usize,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content and return to the first page.
    pub fn set_text(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.index = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn page_count(&self, capacity: Capacity) -> usize {
        page_count(self.lines.len(), capacity.lines_per_page)
    }

    pub fn scroll(&mut self, direction: ScrollDirection, capacity: Capacity) {
        let count = self.page_count(capacity);
        self.index = scroll(self.index.min(count), direction, count);
    }

    /// The visible page. The index is clamped again here because a resize can
    /// shrink the page count after the last scroll.
    pub fn page(&self, capacity: Capacity) -> TextPage {
        let page_count = self.page_count(capacity);
        let index = self.index.min(page_count);
        TextPage {
            lines: render_page(&self.lines, index, capacity),
            index,
            page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(chars: usize, lines: usize) -> Capacity {
        Capacity {
            chars_per_line: chars,
            lines_per_page: lines,
        }
    }

    fn text(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn capacity_from_metrics() {
        let c = Capacity::new(
            Rect::new(0, 60, 800, 420),
            TextMetrics {
                glyph_width: 19,
                line_height: 38,
            },
        );
        assert_eq!(c.chars_per_line, 42);
        assert_eq!(c.lines_per_page, 11);
    }

    #[test]
    fn capacity_minimums() {
        let c = Capacity::new(
            Rect::new(0, 0, 10, 0),
            TextMetrics {
                glyph_width: 20,
                line_height: 0,
            },
        );
        assert_eq!(c.chars_per_line, 3);
        assert_eq!(c.lines_per_page, 1);
    }

    #[test]
    fn page_count_is_floored() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(4, 5), 0);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(12, 5), 2);
    }

    #[test]
    fn scroll_clamps_at_both_ends() {
        assert_eq!(scroll(0, ScrollDirection::Up, 3), 0);
        assert_eq!(scroll(3, ScrollDirection::Down, 3), 3);
        assert_eq!(scroll(1, ScrollDirection::Down, 3), 2);
        assert_eq!(scroll(2, ScrollDirection::Up, 3), 1);
    }

    #[test]
    fn empty_content_is_one_empty_page() {
        let mut p = Paginator::new();
        let c = cap(10, 4);
        p.scroll(ScrollDirection::Down, c);
        let page = p.page(c);
        assert_eq!(page.page_count, 0);
        assert_eq!(page.index, 0);
        assert!(page.lines.is_empty());
    }

    #[test]
    fn short_lines_are_not_wrapped() {
        let rows = render_page(&text(&["abc", "defghi"]), 0, cap(10, 4));
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.wrap_in && !r.wrap_out));
        assert_eq!(rows[1].text, "defghi");
    }

    #[test]
    fn line_at_capacity_is_wrapped() {
        let rows = render_page(&text(&["abcde"]), 0, cap(5, 4));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "abcd");
        assert!(rows[0].wrap_out);
        assert_eq!(rows[1].text, "e");
        assert!(rows[1].wrap_in);
        assert!(!rows[1].wrap_out);
    }

    #[test]
    fn long_line_spans_several_rows() {
        // 5 cells: first row 4 chars, middle rows 3 chars between markers.
        let rows = render_page(&text(&["abcdefghijkl", "z"]), 0, cap(5, 10));
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "efg", "hij", "kl", "z"]);
        assert!(rows[0].wrap_out && !rows[0].wrap_in);
        assert!(rows[1].wrap_in && rows[1].wrap_out);
        assert!(rows[2].wrap_in && rows[2].wrap_out);
        assert!(rows[3].wrap_in && !rows[3].wrap_out);
        assert!(!rows[4].wrap_in);
    }

    #[test]
    fn wrapping_stops_at_page_height() {
        let rows = render_page(&text(&["abcdefghijklmnop", "next"]), 0, cap(5, 3));
        assert_eq!(rows.len(), 3);
        assert!(rows[2].wrap_in);
        assert!(rows.iter().all(|r| r.text != "next"));
    }

    #[test]
    fn pages_start_at_logical_lines() {
        let lines = text(&["0", "1", "2", "3", "4", "5", "6"]);
        let rows = render_page(&lines, 1, cap(10, 3));
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["3", "4", "5"]);
        let rows = render_page(&lines, 2, cap(10, 3));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn multibyte_characters_count_as_one_cell() {
        let rows = render_page(&text(&["Menü"]), 0, cap(5, 2));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "Menü");
    }

    #[test]
    fn set_text_resets_index() {
        let mut p = Paginator::new();
        let c = cap(10, 2);
        p.set_text(text(&["a", "b", "c", "d", "e"]));
        p.scroll(ScrollDirection::Down, c);
        p.scroll(ScrollDirection::Down, c);
        assert_eq!(p.index(), 2);
        p.set_text(text(&["x"]));
        assert_eq!(p.index(), 0);
        assert_eq!(p.lines(), &["x".to_string()]);
    }

    #[test]
    fn page_reclamps_after_capacity_change() {
        let mut p = Paginator::new();
        p.set_text(text(&["a", "b", "c", "d", "e", "f"]));
        p.scroll(ScrollDirection::Down, cap(10, 1));
        p.scroll(ScrollDirection::Down, cap(10, 1));
        p.scroll(ScrollDirection::Down, cap(10, 1));
        let page = p.page(cap(10, 6));
        assert_eq!(page.page_count, 1);
        assert_eq!(page.index, 1);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_direction() -> impl Strategy<Value = ScrollDirection> {
            prop_oneof![Just(ScrollDirection::Up), Just(ScrollDirection::Down)]
        }

        proptest! {
            #[test]
            fn index_stays_in_range(
                total in 0usize..200,
                lpp in 1usize..20,
                moves in proptest::collection::vec(arb_direction(), 0..100),
            ) {
                let mut p = Paginator::new();
                p.set_text((0..total).map(|i| i.to_string()).collect());
                let c = cap(40, lpp);
                for m in moves {
                    p.scroll(m, c);
                    prop_assert!(p.index() <= p.page_count(c));
                }
            }

            #[test]
            fn rows_never_exceed_capacity(
                lines in proptest::collection::vec("[a-z ]{0,60}", 0..30),
                cpl in 3usize..30,
                lpp in 1usize..15,
            ) {
                let c = cap(cpl, lpp);
                let rows = render_page(&lines, 0, c);
                prop_assert!(rows.len() <= lpp);
                for r in &rows {
                    let cells = r.text.chars().count()
                        + usize::from(r.wrap_in)
                        + usize::from(r.wrap_out);
                    prop_assert!(cells <= cpl);
                }
            }
        }
    }
}
