use crate::aquarium::{Aquarium, ItemId};
use crate::input::Action;
use crate::render::{cell_center, draw_center_box, draw_text, CellBuffer};
use crate::storage::with_aqua_extension;
use crossterm::style::Color;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Two presses on the same cell within this window count as a double click.
pub const DOUBLE_CLICK: Duration = Duration::from_millis(400);

pub const LOAD_FAILED: &str = "Unable to load Aquarium file";
pub const SAVE_FAILED: &str = "Write to XML failed";
pub const WELCOME: &str = "Welcome to the Aquarium!";

const HELP: &str = "\
1/b beta   2/c carp   3/f catfish   4/d castle
s, Ctrl-S  save as    o, Ctrl-F  open
x clear    ? or F1 this box    q, Alt-X quit

Drag items with the left mouse button.
Double click an item to toggle it.";

const MENU_HINT: &str = " 1 beta 2 carp 3 catfish 4 castle  s save  o open  x clear  ? about  q quit ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purpose {
    Save,
    Open,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Main,
    About,
    Prompt { purpose: Purpose, text: String },
    Message { title: &'static str, text: String },
}

pub struct AquariumView {
    aquarium: Aquarium,
    mode: Mode,
    grabbed: Option<ItemId>,
    last_press: Option<(Instant, u16, u16)>,
    current_file: Option<PathBuf>,
    status: String,
    quit: bool,
}

impl AquariumView {
    pub fn new(aquarium: Aquarium) -> Self {
        Self {
            aquarium,
            mode: Mode::Main,
            grabbed: None,
            last_press: None,
            current_file: None,
            status: String::new(),
            quit: false,
        }
    }

    pub fn aquarium(&self) -> &Aquarium {
        &self.aquarium
    }

    pub fn aquarium_mut(&mut self) -> &mut Aquarium {
        &mut self.aquarium
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn grabbed(&self) -> Option<ItemId> {
        self.grabbed
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Add(kind) => {
                self.aquarium.spawn(kind);
                self.status = format!("Added {}", kind.label());
            }
            Action::SaveAs => self.open_prompt(Purpose::Save),
            Action::Open => self.open_prompt(Purpose::Open),
            Action::Clear => {
                self.aquarium.clear();
                self.grabbed = None;
                self.status = "Cleared".to_string();
            }
            Action::About => self.mode = Mode::About,
            Action::Quit => self.quit = true,
            Action::Press { col, row } => self.press(col, row, now),
            Action::Drag { col, row } => self.drag(col, row),
            Action::Release { col, row } => self.release(col, row),
            // Motion without the button held ends any grab.
            Action::Move { .. } => self.grabbed = None,
            Action::PromptChar(ch) => {
                if let Mode::Prompt { text, .. } = &mut self.mode {
                    text.push(ch);
                }
            }
            Action::PromptBackspace => {
                if let Mode::Prompt { text, .. } = &mut self.mode {
                    text.pop();
                }
            }
            Action::PromptCommit => self.commit_prompt(),
            Action::PromptCancel | Action::Dismiss => self.mode = Mode::Main,
        }
    }

    pub fn tick(&mut self, elapsed: f64) {
        self.aquarium.update(elapsed);
    }

    /// Saves to `path`; failures switch to a message box.
    pub fn save_to(&mut self, path: &Path) -> bool {
        match self.aquarium.save(path) {
            Ok(()) => {
                self.current_file = Some(path.to_path_buf());
                self.status = format!("Saved {}", path.display());
                true
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.show_message(SAVE_FAILED);
                false
            }
        }
    }

    /// Loads `path`; failures switch to a message box and keep the scene.
    pub fn open(&mut self, path: &Path) -> bool {
        match self.aquarium.load(path) {
            Ok(()) => {
                self.grabbed = None;
                self.current_file = Some(path.to_path_buf());
                self.status = format!("Opened {}", path.display());
                true
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                self.show_message(LOAD_FAILED);
                false
            }
        }
    }

    pub fn draw(&self, buf: &mut CellBuffer) {
        self.aquarium.draw(buf);
        self.draw_status(buf);

        match &self.mode {
            Mode::Main => {}
            Mode::About => draw_center_box(buf, "About Aquarium", &format!("{WELCOME}\n\n{HELP}")),
            Mode::Prompt { purpose, text } => {
                let title = match purpose {
                    Purpose::Save => "Save Aquarium file",
                    Purpose::Open => "Load Aquarium file",
                };
                let body = format!("File: {text}_\n\nEnter accept | Esc cancel");
                draw_center_box(buf, title, &body);
            }
            Mode::Message { title, text } => {
                draw_center_box(buf, title, &format!("{text}\n\nPress any key"));
            }
        }
    }

    fn draw_status(&self, buf: &mut CellBuffer) {
        if buf.h == 0 {
            return;
        }
        let y = buf.h - 1;
        for x in 0..buf.w {
            draw_text(buf, x, y, " ", Color::White, Color::DarkGrey);
        }
        draw_text(buf, 0, y, MENU_HINT, Color::White, Color::DarkGrey);
        let right = format!(
            " {} items {} ",
            self.aquarium.len(),
            if self.status.is_empty() { "" } else { "|" }
        ) + &self.status;
        let x = MENU_HINT.chars().count() as u16;
        draw_text(buf, x, y, &right, Color::Yellow, Color::DarkGrey);
    }

    fn open_prompt(&mut self, purpose: Purpose) {
        let text = self
            .current_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.mode = Mode::Prompt { purpose, text };
    }

    fn commit_prompt(&mut self) {
        let Mode::Prompt { purpose, text } = std::mem::replace(&mut self.mode, Mode::Main) else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }
        let path = with_aqua_extension(&text);
        info!(?purpose, path = %path.display(), "file command");
        match purpose {
            Purpose::Save => {
                self.save_to(&path);
            }
            Purpose::Open => {
                self.open(&path);
            }
        }
    }

    fn show_message(&mut self, text: &str) {
        self.mode = Mode::Message {
            title: "Aquarium",
            text: text.to_string(),
        };
    }

    fn press(&mut self, col: u16, row: u16, now: Instant) {
        let double = matches!(
            self.last_press,
            Some((t, c, r)) if c == col && r == row && now.saturating_duration_since(t) <= DOUBLE_CLICK
        );
        if double {
            self.last_press = None;
            if let Some(item) = self
                .aquarium
                .hit_test_cell(col as i32, row as i32)
                .and_then(|id| self.aquarium.get_mut(id))
            {
                item.toggle_state();
            }
        } else {
            self.last_press = Some((now, col, row));
        }

        self.grabbed = self.aquarium.hit_test_cell(col as i32, row as i32);
        if let Some(id) = self.grabbed {
            self.aquarium.move_to_end(id);
        }
    }

    fn drag(&mut self, col: u16, row: u16) {
        let Some(id) = self.grabbed else {
            return;
        };
        let (x, y) = cell_center(col, row);
        match self.aquarium.get_mut(id) {
            Some(item) => item.set_location(x as f64, y as f64),
            None => self.grabbed = None,
        }
    }

    fn release(&mut self, col: u16, row: u16) {
        self.grabbed = None;
        if let Some(item) = self
            .aquarium
            .hit_test_cell(col as i32, row as i32)
            .and_then(|id| self.aquarium.get_mut(id))
        {
            if item.is_active() {
                item.toggle_state();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    fn view() -> AquariumView {
        AquariumView::new(Aquarium::new(1024.0, 768.0, 5))
    }

    fn text_of(buf: &CellBuffer) -> String {
        buf.cells.iter().map(|c| c.ch).collect()
    }

    /// Castle centered on the middle of cell (20, 10).
    fn castle_at_cell(v: &mut AquariumView) -> ItemId {
        let id = v.aquarium_mut().spawn(ItemKind::Castle);
        let (x, y) = cell_center(20, 10);
        v.aquarium_mut().get_mut(id).unwrap().set_location(x as f64, y as f64);
        id
    }

    #[test]
    fn add_commands_append_items() {
        let mut v = view();
        let now = Instant::now();
        v.apply(Action::Add(ItemKind::Beta), now);
        v.apply(Action::Add(ItemKind::Castle), now);
        let kinds: Vec<_> = v.aquarium().items().map(|(_, i)| i.kind()).collect();
        assert_eq!(kinds, vec![ItemKind::Beta, ItemKind::Castle]);
        assert_eq!(v.status(), "Added Decor Castle");
    }

    #[test]
    fn press_grabs_and_drag_moves() {
        let mut v = view();
        let now = Instant::now();
        let castle = castle_at_cell(&mut v);
        let other = v.aquarium_mut().spawn(ItemKind::Castle);

        v.apply(Action::Press { col: 20, row: 10 }, now);
        assert_eq!(v.grabbed(), Some(castle));
        let top = v.aquarium().items().last().map(|(id, _)| id);
        assert_eq!(top, Some(castle));
        assert_ne!(top, Some(other));

        v.apply(Action::Drag { col: 30, row: 12 }, now);
        let item = v.aquarium().get(castle).unwrap();
        assert_eq!((item.x(), item.y()), (244.0, 200.0));

        v.apply(Action::Release { col: 30, row: 12 }, now);
        assert_eq!(v.grabbed(), None);
        v.apply(Action::Drag { col: 40, row: 12 }, now);
        assert_eq!(v.aquarium().get(castle).unwrap().x(), 244.0);
    }

    #[test]
    fn press_on_water_grabs_nothing() {
        let mut v = view();
        castle_at_cell(&mut v);
        v.apply(Action::Press { col: 90, row: 40 }, Instant::now());
        assert_eq!(v.grabbed(), None);
    }

    #[test]
    fn press_grabs_on_every_drawn_glyph_only() {
        let mut v = view();
        let castle = v.aquarium_mut().spawn(ItemKind::Castle);
        v.aquarium_mut().get_mut(castle).unwrap().set_location(110.0, 222.0);
        let mut buf = CellBuffer::new(60, 40);
        v.aquarium().get(castle).unwrap().draw(&mut buf);

        let now = Instant::now();
        let mut drawn = 0;
        for row in 0..40 {
            for col in 0..60 {
                let glyph = buf.get(col, row).unwrap().ch != ' ';
                v.apply(Action::Press { col, row }, now);
                let expected = if glyph { Some(castle) } else { None };
                assert_eq!(v.grabbed(), expected, "cell ({col}, {row})");
                v.apply(Action::Release { col, row }, now);
                drawn += glyph as usize;
            }
        }
        assert!(drawn > 0);
    }

    #[test]
    fn moving_without_the_button_releases() {
        let mut v = view();
        castle_at_cell(&mut v);
        v.apply(Action::Press { col: 20, row: 10 }, Instant::now());
        v.apply(Action::Move { col: 21, row: 10 }, Instant::now());
        assert_eq!(v.grabbed(), None);
    }

    #[test]
    fn double_click_needs_the_same_cell_in_time() {
        let mut v = view();
        castle_at_cell(&mut v);
        let t0 = Instant::now();
        v.apply(Action::Press { col: 20, row: 10 }, t0);
        v.apply(Action::Press { col: 20, row: 10 }, t0 + Duration::from_millis(100));
        assert_eq!(v.last_press, None);
        v.apply(Action::Press { col: 20, row: 10 }, t0 + Duration::from_millis(200));
        v.apply(Action::Press { col: 20, row: 10 }, t0 + Duration::from_secs(2));
        assert!(v.last_press.is_some());
        assert!(!v.aquarium().items().any(|(_, i)| i.is_active()));
    }

    #[test]
    fn clear_drops_items_and_grab() {
        let mut v = view();
        castle_at_cell(&mut v);
        v.apply(Action::Press { col: 20, row: 10 }, Instant::now());
        v.apply(Action::Clear, Instant::now());
        assert!(v.aquarium().is_empty());
        assert_eq!(v.grabbed(), None);
    }

    #[test]
    fn prompt_edits_and_cancels() {
        let mut v = view();
        let now = Instant::now();
        v.apply(Action::SaveAs, now);
        for ch in "tanx".chars() {
            v.apply(Action::PromptChar(ch), now);
        }
        v.apply(Action::PromptBackspace, now);
        v.apply(Action::PromptChar('k'), now);
        assert_eq!(
            v.mode(),
            &Mode::Prompt {
                purpose: Purpose::Save,
                text: "tank".into()
            }
        );
        v.apply(Action::PromptCancel, now);
        assert_eq!(v.mode(), &Mode::Main);
    }

    #[test]
    fn save_prompt_writes_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = view();
        let now = Instant::now();
        v.apply(Action::Add(ItemKind::Carp), now);
        v.apply(Action::SaveAs, now);
        let name = dir.path().join("scene").display().to_string();
        for ch in name.chars() {
            v.apply(Action::PromptChar(ch), now);
        }
        v.apply(Action::PromptCommit, now);
        let saved = dir.path().join("scene.aqua");
        assert!(saved.exists());
        assert_eq!(v.current_file(), Some(saved.as_path()));
        assert_eq!(v.mode(), &Mode::Main);

        // The prompt starts from the current file next time.
        v.apply(Action::Open, now);
        assert!(matches!(v.mode(), Mode::Prompt { purpose: Purpose::Open, text } if text.ends_with("scene.aqua")));
    }

    #[test]
    fn failed_open_shows_a_message_and_keeps_the_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = view();
        castle_at_cell(&mut v);
        assert!(!v.open(&dir.path().join("missing.aqua")));
        assert_eq!(
            v.mode(),
            &Mode::Message {
                title: "Aquarium",
                text: LOAD_FAILED.into()
            }
        );
        assert_eq!(v.aquarium().len(), 1);
        v.apply(Action::Dismiss, Instant::now());
        assert_eq!(v.mode(), &Mode::Main);
    }

    #[test]
    fn failed_save_shows_a_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = view();
        assert!(!v.save_to(&dir.path().join("nope/tank.aqua")));
        assert!(matches!(v.mode(), Mode::Message { text, .. } if text == SAVE_FAILED));
        assert_eq!(v.current_file(), None);
    }

    #[test]
    fn about_box_shows_the_welcome() {
        let mut v = view();
        v.apply(Action::About, Instant::now());
        let mut buf = CellBuffer::new(100, 40);
        v.draw(&mut buf);
        assert!(text_of(&buf).contains(WELCOME));
    }

    #[test]
    fn status_bar_counts_items() {
        let mut v = view();
        v.apply(Action::Add(ItemKind::Beta), Instant::now());
        let mut buf = CellBuffer::new(120, 20);
        v.draw(&mut buf);
        let last_row: String = buf.cells[19 * 120..].iter().map(|c| c.ch).collect();
        assert!(last_row.contains("1 items"));
    }

    #[test]
    fn quit_sets_the_flag() {
        let mut v = view();
        assert!(!v.should_quit());
        v.apply(Action::Quit, Instant::now());
        assert!(v.should_quit());
    }
}
