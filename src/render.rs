use crate::sprite::{Sprite, CELL_H, CELL_W};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::cmp::min;
use std::io::{self, Write};

pub const PANEL_FG: Color = Color::White;
pub const PANEL_BG: Color = Color::Black;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub struct CellBuffer {
    pub w: u16,
    pub h: u16,
    pub cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    pub fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.w && y < self.h {
            Some(&self.cells[self.idx(x, y)])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
        }
    }

    /// Draws the opaque glyphs of `sprite` with its top-left corner at the
    /// given world pixel. Cells keep the background already painted there.
    pub fn blit(&mut self, sprite: &Sprite, left_px: i32, top_px: i32) {
        let col0 = left_px.div_euclid(CELL_W as i32);
        let row0 = top_px.div_euclid(CELL_H as i32);
        for row in 0..sprite.rows() {
            let y = row0 + row as i32;
            if y < 0 || y >= self.h as i32 {
                continue;
            }
            for col in 0..sprite.cols() {
                let x = col0 + col as i32;
                if x < 0 || x >= self.w as i32 {
                    continue;
                }
                if let Some(ch) = sprite.glyph(col, row) {
                    let i = self.idx(x as u16, y as u16);
                    let cell = &mut self.cells[i];
                    cell.ch = ch;
                    cell.fg = sprite.fg();
                }
            }
        }
    }
}

/// World pixel at the middle of a terminal cell.
pub fn cell_center(col: u16, row: u16) -> (i32, i32) {
    (
        col as i32 * CELL_W as i32 + CELL_W as i32 / 2,
        row as i32 * CELL_H as i32 + CELL_H as i32 / 2,
    )
}

pub fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

/// Bordered panel in the middle of the buffer with a title line and body text.
pub fn draw_center_box(buf: &mut CellBuffer, title: &str, body: &str) {
    let w = buf.w;
    let h = buf.h;
    if w < 4 || h < 4 {
        return;
    }

    let longest = body.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let wanted_w = (longest.max(title.chars().count()) + 4) as u16;
    let wanted_h = body.lines().count() as u16 + 4;
    let bw = min(wanted_w.max(24), w.saturating_sub(2));
    let bh = min(wanted_h, h.saturating_sub(2));

    let x0 = (w - bw) / 2;
    let y0 = (h - bh) / 2;

    let edge = |ch| Cell {
        ch,
        fg: PANEL_FG,
        bg: PANEL_BG,
    };

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            buf.set(x, y, edge(' '));
        }
    }
    for x in x0..x0 + bw {
        buf.set(x, y0, edge('─'));
        buf.set(x, y0 + bh - 1, edge('─'));
    }
    for y in y0..y0 + bh {
        buf.set(x0, y, edge('│'));
        buf.set(x0 + bw - 1, y, edge('│'));
    }
    buf.set(x0, y0, edge('┌'));
    buf.set(x0 + bw - 1, y0, edge('┐'));
    buf.set(x0, y0 + bh - 1, edge('└'));
    buf.set(x0 + bw - 1, y0 + bh - 1, edge('┘'));

    draw_text(buf, x0 + 2, y0 + 1, title, Color::Yellow, PANEL_BG);

    let mut yy = y0 + 2;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        let room = (bw - 4) as usize;
        let clipped: String = line.chars().take(room).collect();
        draw_text(buf, x0 + 2, yy, &clipped, PANEL_FG, PANEL_BG);
        yy += 1;
    }
}

pub struct Terminal {
    pub out: io::Stdout,
    pub cols: u16,
    pub rows: u16,
    pub prev: CellBuffer,
    pub cur: CellBuffer,
    color: bool,
    active: bool,
}

impl Terminal {
    pub fn begin(color: bool) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            color,
            active: true,
        })
    }

    pub fn end(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    /// Writes changed cells inside a synchronized update.
    pub fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                let (fg, bg) = if self.color {
                    (c.fg, c.bg)
                } else {
                    (Color::Reset, Color::Reset)
                };
                if last_fg != Some(fg) {
                    queue!(self.out, SetForegroundColor(fg))?;
                    last_fg = Some(fg);
                }
                if last_bg != Some(bg) {
                    queue!(self.out, SetBackgroundColor(bg))?;
                    last_bg = Some(bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        let _ = queue!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}
