use crate::fish::{Fish, Species};
use crate::render::CellBuffer;
use crate::sprite::{sheet, Sprite, SpritePair, CELL_H, CELL_W};
use crate::xml::{format_number, XmlElement};
use rand::rngs::StdRng;
use rand::Rng;

pub const ITEM_TAG: &str = "item";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Beta,
    Carp,
    Catfish,
    Castle,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Beta,
        ItemKind::Carp,
        ItemKind::Catfish,
        ItemKind::Castle,
    ];

    /// Value of the `type` attribute in `.aqua` files.
    pub fn type_tag(self) -> &'static str {
        match self {
            ItemKind::Beta => "beta",
            ItemKind::Carp => "carp",
            ItemKind::Catfish => "catfish",
            ItemKind::Castle => "castle",
        }
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_tag() == tag)
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Beta => "Beta Fish",
            ItemKind::Carp => "Carp Fish",
            ItemKind::Catfish => "Catfish",
            ItemKind::Castle => "Decor Castle",
        }
    }

    fn sprites(self) -> &'static SpritePair {
        let sheet = sheet();
        match self {
            ItemKind::Beta => &sheet.beta,
            ItemKind::Carp => &sheet.carp,
            ItemKind::Catfish => &sheet.catfish,
            ItemKind::Castle => &sheet.castle,
        }
    }
}

/// What an updating item can see of its aquarium.
pub struct Tank<'a> {
    pub width: f64,
    pub height: f64,
    pub rng: &'a mut StdRng,
}

/// Center position in pixels plus facing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub mirror: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Castle,
    Fish(Fish),
}

#[derive(Clone, Debug)]
pub struct Item {
    pose: Pose,
    sprites: &'static SpritePair,
    body: Body,
}

impl Item {
    /// New item at the origin. Fish draw their speed from `rng`.
    pub fn new<R: Rng + ?Sized>(kind: ItemKind, rng: &mut R) -> Self {
        let body = match kind {
            ItemKind::Beta => Body::Fish(Fish::new(Species::beta(), rng)),
            ItemKind::Carp => Body::Fish(Fish::new(Species::carp(), rng)),
            ItemKind::Catfish => Body::Fish(Fish::new(Species::catfish(), rng)),
            ItemKind::Castle => Body::Castle,
        };
        Self {
            pose: Pose::default(),
            sprites: kind.sprites(),
            body,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match &self.body {
            Body::Castle => ItemKind::Castle,
            Body::Fish(fish) => match fish.species() {
                Species::Beta => ItemKind::Beta,
                Species::Carp { .. } => ItemKind::Carp,
                Species::Catfish { .. } => ItemKind::Catfish,
            },
        }
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind().type_tag()
    }

    pub fn x(&self) -> f64 {
        self.pose.x
    }

    pub fn y(&self) -> f64 {
        self.pose.y
    }

    pub fn set_location(&mut self, x: f64, y: f64) {
        self.pose.x = x;
        self.pose.y = y;
    }

    pub fn is_mirrored(&self) -> bool {
        self.pose.mirror
    }

    pub fn set_mirror(&mut self, mirror: bool) {
        self.pose.mirror = mirror;
    }

    pub fn fish(&self) -> Option<&Fish> {
        match &self.body {
            Body::Fish(fish) => Some(fish),
            Body::Castle => None,
        }
    }

    pub fn fish_mut(&mut self) -> Option<&mut Fish> {
        match &mut self.body {
            Body::Fish(fish) => Some(fish),
            Body::Castle => None,
        }
    }

    /// Image for the current facing.
    pub fn sprite(&self) -> &'static Sprite {
        if self.pose.mirror {
            &self.sprites.mirrored
        } else {
            &self.sprites.normal
        }
    }

    /// No kind has a toggleable mode yet; the view still routes clicks here.
    pub fn is_active(&self) -> bool {
        false
    }

    pub fn toggle_state(&mut self) {}

    pub fn update(&mut self, elapsed: f64, tank: &mut Tank) {
        match &mut self.body {
            Body::Castle => {}
            Body::Fish(fish) => fish.update(elapsed, &mut self.pose, &self.sprites.normal, tank),
        }
    }

    /// Top-left corner of the image in whole pixels.
    fn top_left(&self) -> (i32, i32) {
        let sprite = self.sprite();
        let left = (self.pose.x - sprite.width() / 2.0) as i32;
        let top = (self.pose.y - sprite.height() / 2.0) as i32;
        (left, top)
    }

    /// Terminal cell holding the image's top-left glyph.
    pub fn cell_origin(&self) -> (i32, i32) {
        let (left, top) = self.top_left();
        (left.div_euclid(CELL_W as i32), top.div_euclid(CELL_H as i32))
    }

    /// Blits the image centered on the item position.
    pub fn draw(&self, buf: &mut CellBuffer) {
        let (left, top) = self.top_left();
        buf.blit(self.sprite(), left, top);
    }

    /// True when `draw` puts a glyph of this item in cell (col, row).
    pub fn hit_cell(&self, col: i32, row: i32) -> bool {
        let (col0, row0) = self.cell_origin();
        let (dc, dr) = (col - col0, row - row0);
        if dc < 0 || dr < 0 {
            return false;
        }
        self.sprite().glyph(dc as usize, dr as usize).is_some()
    }

    /// True when (x, y) lands on an opaque pixel of the image.
    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        let image = &self.sprites.normal;
        let wid = image.width();
        let hit = image.height();

        let mut test_x = x as f64 - self.pose.x + wid / 2.0;
        let test_y = y as f64 - self.pose.y + hit / 2.0;
        if self.pose.mirror {
            test_x = wid - test_x;
        }

        if test_x < 0.0 || test_y < 0.0 || test_x >= wid || test_y >= hit {
            return false;
        }
        !image.is_transparent(test_x as i32, test_y as i32)
    }

    /// Appends an `item` node to `parent` and returns it.
    pub fn xml_save<'a>(&self, parent: &'a mut XmlElement) -> &'a mut XmlElement {
        let node = parent.add_child(XmlElement::new(ITEM_TAG));
        node.set_attribute("x", format_number(self.pose.x));
        node.set_attribute("y", format_number(self.pose.y));
        node.set_attribute("type", self.type_tag());
        if let Body::Fish(fish) = &self.body {
            fish.xml_save(node);
        }
        node
    }

    pub fn xml_load(&mut self, node: &XmlElement) {
        self.pose.x = node.number("x");
        self.pose.y = node.number("y");
        if let Body::Fish(fish) = &mut self.body {
            fish.xml_load(node);
        }
    }
}
