#![forbid(unsafe_code)]

//! Crossterm events as they arrive from a real terminal, converted to sift
//! events.

use crossterm::event as cte;
use sift_core::event::{Event, KeyCode, KeyEventKind, Modifiers, MouseButton, MouseEventKind};

fn key(code: cte::KeyCode, modifiers: cte::KeyModifiers) -> cte::Event {
    cte::Event::Key(cte::KeyEvent::new(code, modifiers))
}

#[test]
fn typing_a_query() {
    for c in ['9', 'z', ' ', 'É'] {
        let Some(Event::Key(event)) =
            Event::from_crossterm(key(cte::KeyCode::Char(c), cte::KeyModifiers::NONE))
        else {
            panic!("char {c:?} should map to a key event");
        };
        assert_eq!(event.code, KeyCode::Char(c));
        assert_eq!(event.modifiers, Modifiers::NONE);
        assert_eq!(event.kind, KeyEventKind::Press);
    }
}

#[test]
fn ctrl_home_keeps_modifier() {
    let Some(Event::Key(event)) =
        Event::from_crossterm(key(cte::KeyCode::Home, cte::KeyModifiers::CONTROL))
    else {
        panic!("home should map");
    };
    assert_eq!(event.code, KeyCode::Home);
    assert!(event.ctrl());
}

#[test]
fn meta_and_hyper_fold_into_super() {
    let Some(Event::Key(event)) = Event::from_crossterm(key(
        cte::KeyCode::Char('k'),
        cte::KeyModifiers::META | cte::KeyModifiers::SHIFT,
    )) else {
        panic!("k should map");
    };
    assert!(event.modifiers.contains(Modifiers::SUPER | Modifiers::SHIFT));
}

#[test]
fn unmodelled_keys_are_dropped() {
    assert_eq!(
        Event::from_crossterm(key(cte::KeyCode::CapsLock, cte::KeyModifiers::NONE)),
        None
    );
    assert_eq!(
        Event::from_crossterm(key(cte::KeyCode::Null, cte::KeyModifiers::NONE)),
        None
    );
}

#[test]
fn mouse_presses_of_every_button_are_pointer_down() {
    for (button, expected) in [
        (cte::MouseButton::Left, MouseButton::Left),
        (cte::MouseButton::Right, MouseButton::Right),
        (cte::MouseButton::Middle, MouseButton::Middle),
    ] {
        let event = Event::from_crossterm(cte::Event::Mouse(cte::MouseEvent {
            kind: cte::MouseEventKind::Down(button),
            column: 12,
            row: 4,
            modifiers: cte::KeyModifiers::NONE,
        }));
        let mouse = event.as_ref().and_then(Event::as_mouse).copied();
        let Some(mouse) = mouse else {
            panic!("mouse event expected");
        };
        assert_eq!(mouse.kind, MouseEventKind::Down(expected));
        assert_eq!(mouse.position(), (12, 4));
        assert!(mouse.is_pointer_down());
    }
}

#[test]
fn wheel_is_not_pointer_down() {
    let event = Event::from_crossterm(cte::Event::Mouse(cte::MouseEvent {
        kind: cte::MouseEventKind::ScrollDown,
        column: 0,
        row: 0,
        modifiers: cte::KeyModifiers::NONE,
    }));
    let mouse = event.as_ref().and_then(Event::as_mouse).copied();
    assert!(mouse.is_some_and(|m| !m.is_pointer_down()));
}

#[test]
fn paste_resize_and_focus() {
    let Some(Event::Paste(paste)) = Event::from_crossterm(cte::Event::Paste("Option 42".into()))
    else {
        panic!("paste should map");
    };
    assert_eq!(paste.text, "Option 42");
    assert!(paste.bracketed);

    assert_eq!(
        Event::from_crossterm(cte::Event::Resize(100, 30)),
        Some(Event::Resize {
            width: 100,
            height: 30
        })
    );
    assert_eq!(
        Event::from_crossterm(cte::Event::FocusLost),
        Some(Event::Focus(false))
    );
}
