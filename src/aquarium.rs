use crate::background::Background;
use crate::error::SceneError;
use crate::item::{Item, ItemKind, Tank, ITEM_TAG};
use crate::render::CellBuffer;
use crate::xml::{self, XmlElement};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

pub const ROOT_TAG: &str = "aqua";

/// Handle to an item owned by an [`Aquarium`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemId(u64);

#[derive(Debug)]
struct Slot {
    id: ItemId,
    item: Item,
}

/// Ordered collection of items over a background. Later items paint on top
/// and win hit-tests.
pub struct Aquarium {
    background: Background,
    items: Vec<Slot>,
    next_id: u64,
    rng: StdRng,
}

impl Aquarium {
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        Self {
            background: Background::new(width, height, seed as u32),
            items: Vec::new(),
            next_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn width(&self) -> f64 {
        self.background.width()
    }

    pub fn height(&self) -> f64 {
        self.background.height()
    }

    /// Generator shared by every item in this aquarium.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in paint order.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items.iter().map(|s| (s.id, &s.item))
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|s| s.id == id).map(|s| &s.item)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|s| s.id == id).map(|s| &mut s.item)
    }

    /// Appends `item` on top of the z-order.
    pub fn add(&mut self, item: Item) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(Slot { id, item });
        id
    }

    /// Builds a new item of `kind` with the shared generator and adds it.
    pub fn spawn(&mut self, kind: ItemKind) -> ItemId {
        let item = Item::new(kind, &mut self.rng);
        let id = self.add(item);
        debug!(kind = kind.type_tag(), ?id, "item added");
        id
    }

    /// Topmost item with an opaque pixel at (x, y).
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|s| s.item.hit_test(x, y))
            .map(|s| s.id)
    }

    /// Topmost item drawn in terminal cell (col, row).
    pub fn hit_test_cell(&self, col: i32, row: i32) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|s| s.item.hit_cell(col, row))
            .map(|s| s.id)
    }

    /// Brings `id` to the top of the z-order. Unknown ids are ignored.
    pub fn move_to_end(&mut self, id: ItemId) {
        if let Some(pos) = self.items.iter().position(|s| s.id == id) {
            let slot = self.items.remove(pos);
            self.items.push(slot);
        }
    }

    /// Moves every other item up to `distance` pixels towards `source`.
    pub fn pull_items_towards(&mut self, source: ItemId, distance: f64) {
        let Some((sx, sy)) = self.get(source).map(|s| (s.x(), s.y())) else {
            return;
        };
        for slot in self.items.iter_mut().filter(|s| s.id != source) {
            let dx = sx - slot.item.x();
            let dy = sy - slot.item.y();
            let d = dx.hypot(dy);
            if d <= 0.0 {
                continue;
            }
            let step = distance.min(d);
            let x = slot.item.x() + dx / d * step;
            let y = slot.item.y() + dy / d * step;
            slot.item.set_location(x, y);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn update(&mut self, elapsed: f64) {
        let mut tank = Tank {
            width: self.background.width(),
            height: self.background.height(),
            rng: &mut self.rng,
        };
        for slot in &mut self.items {
            slot.item.update(elapsed, &mut tank);
        }
    }

    /// Background, then items in z-order.
    pub fn draw(&self, buf: &mut CellBuffer) {
        self.background.draw(buf);
        for slot in &self.items {
            slot.item.draw(buf);
        }
    }

    pub fn to_xml(&self) -> Result<String, SceneError> {
        let mut root = XmlElement::new(ROOT_TAG);
        for slot in &self.items {
            slot.item.xml_save(&mut root);
        }
        xml::to_xml_string(&root)
    }

    /// Replaces the scene with the document in `text`. The current items are
    /// kept when the document cannot be parsed.
    pub fn load_xml(&mut self, text: &str) -> Result<(), SceneError> {
        let root = xml::parse(text)?;
        self.clear();

        for node in root.children().iter().filter(|n| n.name() == ITEM_TAG) {
            let tag = node.attribute("type").unwrap_or_default();
            let Some(kind) = ItemKind::from_type_tag(tag) else {
                debug!(item_type = tag, "skipping unknown item type");
                continue;
            };
            let id = self.spawn(kind);
            if let Some(item) = self.get_mut(id) {
                item.xml_load(node);
            }
        }
        info!(items = self.items.len(), "aquarium loaded");
        Ok(())
    }
}
