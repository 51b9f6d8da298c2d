use crossterm::style::Color;
use std::sync::OnceLock;

/// World pixels covered by one terminal cell.
pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

/// Glyph image. Each glyph covers a `CELL_W` x `CELL_H` block of pixels;
/// blanks are transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    cols: usize,
    rows: usize,
    glyphs: Vec<Option<char>>,
    fg: Color,
}

impl Sprite {
    pub fn from_art(art: &[&str], fg: Color) -> Self {
        let rows = art.len();
        let cols = art.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let mut glyphs = vec![None; cols * rows];
        for (y, line) in art.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    glyphs[y * cols + x] = Some(ch);
                }
            }
        }
        Self {
            cols,
            rows,
            glyphs,
            fg,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Width in pixels.
    pub fn width(&self) -> f64 {
        self.cols as f64 * CELL_W
    }

    /// Height in pixels.
    pub fn height(&self) -> f64 {
        self.rows as f64 * CELL_H
    }

    pub fn fg(&self) -> Color {
        self.fg
    }

    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.glyphs[row * self.cols + col]
    }

    /// Pixel transparency. Anything outside the image is transparent.
    pub fn is_transparent(&self, px: i32, py: i32) -> bool {
        if px < 0 || py < 0 {
            return true;
        }
        let col = (px as f64 / CELL_W) as usize;
        let row = (py as f64 / CELL_H) as usize;
        self.glyph(col, row).is_none()
    }

    /// Left-right mirror image, flipping direction-sensitive glyphs.
    pub fn mirrored(&self) -> Self {
        let mut glyphs = Vec::with_capacity(self.glyphs.len());
        for row in self.glyphs.chunks(self.cols.max(1)) {
            glyphs.extend(row.iter().rev().map(|g| g.map(mirror_glyph)));
        }
        Self {
            cols: self.cols,
            rows: self.rows,
            glyphs,
            fg: self.fg,
        }
    }
}

fn mirror_glyph(ch: char) -> char {
    match ch {
        '(' => ')',
        ')' => '(',
        '<' => '>',
        '>' => '<',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '/' => '\\',
        '\\' => '/',
        'd' => 'b',
        'b' => 'd',
        'p' => 'q',
        'q' => 'p',
        _ => ch,
    }
}

/// Unmirrored and mirrored images of one item kind.
#[derive(Debug)]
pub struct SpritePair {
    pub normal: Sprite,
    pub mirrored: Sprite,
}

impl SpritePair {
    pub fn new(normal: Sprite) -> Self {
        let mirrored = normal.mirrored();
        Self { normal, mirrored }
    }
}

// Fish art faces right; the mirrored image is used while swimming left.
const BETA_ART: &[&str] = &[
    r"   _/\_",
    r"><(((((o>",
    r"   `\/`",
];

const CARP_ART: &[&str] = &[
    r"    _____",
    r"|\ /~~~~~\",
    r"|=|~~~~~~o>",
    r"|/ \~~~~~/",
];

const CATFISH_ART: &[&str] = &[
    r"   ,--------.",
    r"}=(__________8=-",
    r"    ' '   ' ` ~",
];

const CASTLE_ART: &[&str] = &[
    r" |>      |>",
    r" |        |",
    r"/^\ _  _ /^\",
    r"| |[_][_]| |",
    r"| |  __  | |",
    r"|_|_|  |_|_|",
];

pub struct SpriteSheet {
    pub beta: SpritePair,
    pub carp: SpritePair,
    pub catfish: SpritePair,
    pub castle: SpritePair,
}

/// Built-in images, created on first use and shared by every item.
pub fn sheet() -> &'static SpriteSheet {
    static SHEET: OnceLock<SpriteSheet> = OnceLock::new();
    SHEET.get_or_init(|| SpriteSheet {
        beta: SpritePair::new(Sprite::from_art(BETA_ART, Color::AnsiValue(213))),
        carp: SpritePair::new(Sprite::from_art(CARP_ART, Color::AnsiValue(214))),
        catfish: SpritePair::new(Sprite::from_art(CATFISH_ART, Color::AnsiValue(180))),
        castle: SpritePair::new(Sprite::from_art(CASTLE_ART, Color::AnsiValue(250))),
    })
}
