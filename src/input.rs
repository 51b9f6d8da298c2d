use crate::item::ItemKind;
use crate::view::Mode;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Instant;

const MAX_EVENTS_PER_FRAME: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Add(ItemKind),
    SaveAs,
    Open,
    Clear,
    About,
    Quit,
    Press { col: u16, row: u16 },
    Drag { col: u16, row: u16 },
    Release { col: u16, row: u16 },
    Move { col: u16, row: u16 },
    PromptChar(char),
    PromptBackspace,
    PromptCommit,
    PromptCancel,
    Dismiss,
}

/// Waits for input until `deadline` and returns every key press and mouse
/// event that arrived.
pub fn collect_events(deadline: Instant) -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();
    loop {
        let now = Instant::now();
        if now >= deadline || out.len() >= MAX_EVENTS_PER_FRAME {
            break;
        }
        if !event::poll(deadline - now)? {
            break;
        }
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                out.push(Event::Key(k));
            }
            ev @ Event::Mouse(_) => out.push(ev),
            _ => {}
        }
    }
    Ok(out)
}

pub fn map_event(mode: &Mode, ev: &Event) -> Option<Action> {
    match ev {
        Event::Key(key) => map_key(mode, key),
        Event::Mouse(mouse) => map_mouse(mode, mouse),
        _ => None,
    }
}

fn map_key(mode: &Mode, key: &KeyEvent) -> Option<Action> {
    match mode {
        Mode::Prompt { .. } => match key.code {
            KeyCode::Enter => Some(Action::PromptCommit),
            KeyCode::Esc => Some(Action::PromptCancel),
            KeyCode::Backspace => Some(Action::PromptBackspace),
            KeyCode::Char(ch)
                if !ch.is_control() && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(Action::PromptChar(ch))
            }
            _ => None,
        },
        Mode::About | Mode::Message { .. } => Some(Action::Dismiss),
        Mode::Main => map_main_key(key),
    }
}

fn map_main_key(key: &KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::SaveAs),
            KeyCode::Char('f') | KeyCode::Char('F') => Some(Action::Open),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }
    if alt {
        return match key.code {
            KeyCode::Char('x') | KeyCode::Char('X') => Some(Action::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('1') | KeyCode::Char('b') | KeyCode::Char('B') => {
            Some(Action::Add(ItemKind::Beta))
        }
        KeyCode::Char('2') | KeyCode::Char('c') | KeyCode::Char('C') => {
            Some(Action::Add(ItemKind::Carp))
        }
        KeyCode::Char('3') | KeyCode::Char('f') | KeyCode::Char('F') => {
            Some(Action::Add(ItemKind::Catfish))
        }
        KeyCode::Char('4') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(Action::Add(ItemKind::Castle))
        }
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::SaveAs),
        KeyCode::Char('o') | KeyCode::Char('O') => Some(Action::Open),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(Action::Clear),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::About),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        _ => None,
    }
}

fn map_mouse(mode: &Mode, mouse: &MouseEvent) -> Option<Action> {
    let (col, row) = (mouse.column, mouse.row);
    match mode {
        Mode::Main => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Action::Press { col, row }),
            MouseEventKind::Drag(MouseButton::Left) => Some(Action::Drag { col, row }),
            MouseEventKind::Up(MouseButton::Left) => Some(Action::Release { col, row }),
            MouseEventKind::Moved => Some(Action::Move { col, row }),
            _ => None,
        },
        Mode::About | Mode::Message { .. } => match mouse.kind {
            MouseEventKind::Down(_) => Some(Action::Dismiss),
            _ => None,
        },
        Mode::Prompt { .. } => None,
    }
}
