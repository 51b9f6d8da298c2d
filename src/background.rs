use crate::render::{Cell, CellBuffer};
use crate::sprite::{CELL_H, CELL_W};
use crossterm::style::Color;

const WATER: Color = Color::AnsiValue(24);
const SURFACE: Color = Color::AnsiValue(31);
const SAND: Color = Color::AnsiValue(137);
const OUTSIDE: Color = Color::Black;

const SAND_ROWS: u16 = 2;

/// Static backdrop covering the tank. Its pixel size is the tank size.
#[derive(Clone, Debug)]
pub struct Background {
    width: f64,
    height: f64,
    seed: u32,
}

impl Background {
    pub fn new(width: f64, height: f64, seed: u32) -> Self {
        Self {
            width,
            height,
            seed,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn cols(&self) -> u16 {
        (self.width / CELL_W).ceil().clamp(0.0, u16::MAX as f64) as u16
    }

    pub fn rows(&self) -> u16 {
        (self.height / CELL_H).ceil().clamp(0.0, u16::MAX as f64) as u16
    }

    /// Paints every cell of `buf`; cells beyond the tank are left dark.
    pub fn draw(&self, buf: &mut CellBuffer) {
        let cols = self.cols();
        let rows = self.rows();
        for y in 0..buf.h {
            for x in 0..buf.w {
                let cell = if x >= cols || y >= rows {
                    Cell {
                        ch: ' ',
                        fg: OUTSIDE,
                        bg: OUTSIDE,
                    }
                } else {
                    self.tank_cell(x, y, rows)
                };
                buf.set(x, y, cell);
            }
        }
    }

    fn tank_cell(&self, x: u16, y: u16, rows: u16) -> Cell {
        let h = hash2(x as i32, y as i32, self.seed);
        if y == 0 {
            let ch = if h & 3 == 0 { '-' } else { '~' };
            return Cell {
                ch,
                fg: Color::AnsiValue(117),
                bg: SURFACE,
            };
        }
        if y + SAND_ROWS >= rows {
            let ch = match h & 7 {
                0 => ':',
                1 | 2 => '.',
                _ => ' ',
            };
            return Cell {
                ch,
                fg: Color::AnsiValue(180),
                bg: SAND,
            };
        }
        // Sparse specks in the water.
        let ch = if h % 97 == 0 { '.' } else { ' ' };
        Cell {
            ch,
            fg: Color::AnsiValue(67),
            bg: WATER,
        }
    }
}

// Tiny hash noise for sand and water specks.
fn hash2(mut x: i32, mut y: i32, seed: u32) -> u32 {
    x ^= (seed as i32).wrapping_mul(374761393);
    y ^= (seed as i32).wrapping_mul(668265263);
    let mut n = (x as u32).wrapping_mul(2654435761) ^ (y as u32).wrapping_mul(2246822519);
    n ^= n >> 13;
    n = n.wrapping_mul(3266489917);
    n ^= n >> 16;
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tank_covers_whole_cells() {
        let bg = Background::new(1024.0, 768.0, 1);
        assert_eq!((bg.cols(), bg.rows()), (128, 48));
        let odd = Background::new(1020.0, 770.0, 1);
        assert_eq!((odd.cols(), odd.rows()), (128, 49));
    }

    #[test]
    fn draw_paints_surface_water_sand_and_outside() {
        let bg = Background::new(80.0, 96.0, 9);
        let mut buf = CellBuffer::new(12, 8);
        bg.draw(&mut buf);
        assert_eq!(buf.get(0, 0).unwrap().bg, SURFACE);
        assert_eq!(buf.get(3, 2).unwrap().bg, WATER);
        assert_eq!(buf.get(3, 5).unwrap().bg, SAND);
        assert_eq!(buf.get(11, 2).unwrap().bg, OUTSIDE);
        assert_eq!(buf.get(3, 7).unwrap().bg, OUTSIDE);
    }

    #[test]
    fn specks_are_stable_for_a_seed() {
        let bg = Background::new(400.0, 400.0, 5);
        let mut a = CellBuffer::new(50, 25);
        let mut b = CellBuffer::new(50, 25);
        bg.draw(&mut a);
        bg.draw(&mut b);
        assert_eq!(a.cells, b.cells);
    }
}
