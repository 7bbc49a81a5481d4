use crate::Coord;
use crate::grid::Grid;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// A window onto a [`Grid`], drawn with braille characters. One cell is one braille dot, so each
/// character covers 2 columns by 4 rows.
pub struct Camera {
    /// The cell buffer
    cb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the cell buffer
    w: usize,

    /// Height of the cell buffer
    h: usize,

    /// Column shown at the left edge
    x: Coord,

    /// Row shown at the top edge
    y: Coord,
}

impl Camera {
    pub fn new(w: usize, h: usize) -> Self {
        // Let `w` and `h` refer to width and height of the cell buffer. Then `bw = ceil(w / 2)`
        // and `bh = ceil(h / 4)` are the width and height of braille characters of our framebuffer
        // (that is, not accounting for the trailing newlines expected at the end of each line).
        let (bw, bh) = (w.div_ceil(2), h.div_ceil(4));

        // Each braille character is 3 bytes, and newlines one byte.
        let fb = String::with_capacity(3 * (bw * bh) + bh);

        Self {
            cb: vec![false; w * h],
            fb,
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
            x: 0,
            y: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Top-left `(row, column)` of the view.
    pub fn position(&self) -> (Coord, Coord) {
        (self.y, self.x)
    }

    pub fn offset_x(&mut self, offset: Coord) {
        self.x += offset;
    }

    pub fn offset_y(&mut self, offset: Coord) {
        self.y += offset;
    }

    /// Change the size of the view, keeping its position. Clears the cell buffer.
    pub fn resize(&mut self, w: usize, h: usize) {
        let (x, y) = (self.x, self.y);

        *self = Self::new(w, h);
        self.x = x;
        self.y = y;
    }

    /// Turns on a single pixel of the framebuffer
    pub fn draw_pixel(&mut self, x: usize, y: usize) {
        assert!(x < self.w, "x is out of bounds");
        assert!(y < self.h, "y is out of bounds");

        let i = self.xy_from(x, y);

        self.cb[i] = true;
    }

    /// Draw every live cell of `grid` that falls inside the view.
    pub fn draw(&mut self, grid: &Grid) {
        for (row, column) in grid.live_cells() {
            let x = usize::try_from(column.saturating_sub(self.x));
            let y = usize::try_from(row.saturating_sub(self.y));

            match (x, y) {
                (Ok(x), Ok(y)) if x < self.w && y < self.h => self.draw_pixel(x, y),
                _ => {}
            }
        }
    }

    /// Reset the cell buffer
    pub fn reset(&mut self) {
        self.cb.fill(false);
    }

    /// Turn the cell buffer into braille text, one line per 4 rows of cells.
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(2);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.cb.iter().enumerate() {
            let (x, y) = self.xy_to(n);
            let hex = Self::get_hex_value(x, y);

            if px {
                self.cp[(y / 4) * bw + (x / 2)] += hex;
            }
        }

        // update framebuffer
        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            // Every sum of dots stays within the braille block
            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }

        if !self.cp.is_empty() {
            self.fb.push('\n');
        }

        &self.fb
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}
