use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent,
    KeyModifiers as CrosstermKeyModifiers, MouseButton as CrosstermMouseButton,
    MouseEvent as CrosstermMouseEvent, MouseEventKind as CrosstermMouseEventKind,
};
use tuirealm::{
    Application, AttrValue, Attribute, Component, Event, EventListenerCfg, Frame, MockComponent,
    NoUserEvent, Props, State,
    command::{Cmd, CmdResult},
    event::{
        Key as RealmKey, KeyEvent as RealmKeyEvent, KeyModifiers as RealmKeyModifiers,
        MouseButton as RealmMouseButton, MouseEvent as RealmMouseEvent,
        MouseEventKind as RealmMouseEventKind,
    },
    ratatui::layout::Rect,
};

use crate::{
    app::{App, Message},
    ui,
};

pub type SharedApp = Arc<Mutex<App>>;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RootId {
    Board,
}

pub fn init_application(app: SharedApp) -> Result<Application<RootId, Message, NoUserEvent>> {
    let mut application: Application<RootId, Message, NoUserEvent> = Application::init(
        EventListenerCfg::default()
            .crossterm_input_listener(Duration::from_millis(10), 8)
            .poll_timeout(Duration::from_millis(10)),
    );

    application
        .mount(RootId::Board, Box::new(BoardComponent::new(app)), Vec::new())
        .context("failed to mount board component")?;

    application
        .active(&RootId::Board)
        .context("failed to activate board component")?;

    Ok(application)
}

pub fn apply_message(shared_app: &SharedApp, message: Message) -> Result<()> {
    let mut app = lock_app(shared_app)?;
    app.update(message)
}

pub fn should_quit(shared_app: &SharedApp) -> Result<bool> {
    let app = lock_app(shared_app)?;
    Ok(app.should_quit())
}

pub fn lock_app(shared_app: &SharedApp) -> Result<MutexGuard<'_, App>> {
    shared_app
        .lock()
        .map_err(|_| anyhow!("failed to lock app state"))
}

/// Single full-screen component; all layout and hit testing lives in `ui`.
struct BoardComponent {
    props: Props,
    app: SharedApp,
}

impl BoardComponent {
    fn new(app: SharedApp) -> Self {
        Self {
            props: Props::default(),
            app,
        }
    }
}

impl MockComponent for BoardComponent {
    fn view(&mut self, frame: &mut Frame, _area: Rect) {
        if let Ok(mut app) = self.app.lock() {
            ui::render(frame, &mut app);
        }
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::None
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Message, NoUserEvent> for BoardComponent {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Message> {
        match ev {
            Event::Keyboard(key) => convert_key_event(key).map(Message::Key),
            Event::Mouse(mouse) => convert_mouse_event(mouse).map(Message::Mouse),
            Event::WindowResize(width, height) => Some(Message::Resize(width, height)),
            _ => None,
        }
    }
}

/// Only keys the board reacts to are forwarded.
fn convert_key_event(key: RealmKeyEvent) -> Option<CrosstermKeyEvent> {
    Some(CrosstermKeyEvent::new(
        convert_key_code(key.code)?,
        convert_key_modifiers(key.modifiers),
    ))
}

fn convert_key_code(key: RealmKey) -> Option<CrosstermKeyCode> {
    match key {
        RealmKey::Backspace => Some(CrosstermKeyCode::Backspace),
        RealmKey::Enter => Some(CrosstermKeyCode::Enter),
        RealmKey::Left => Some(CrosstermKeyCode::Left),
        RealmKey::Right => Some(CrosstermKeyCode::Right),
        RealmKey::Char(ch) => Some(CrosstermKeyCode::Char(ch)),
        RealmKey::Esc => Some(CrosstermKeyCode::Esc),
        _ => None,
    }
}

fn convert_key_modifiers(modifiers: RealmKeyModifiers) -> CrosstermKeyModifiers {
    let mut converted = CrosstermKeyModifiers::empty();
    if modifiers.contains(RealmKeyModifiers::SHIFT) {
        converted.insert(CrosstermKeyModifiers::SHIFT);
    }
    if modifiers.contains(RealmKeyModifiers::CONTROL) {
        converted.insert(CrosstermKeyModifiers::CONTROL);
    }
    if modifiers.contains(RealmKeyModifiers::ALT) {
        converted.insert(CrosstermKeyModifiers::ALT);
    }
    converted
}

fn convert_mouse_event(mouse: RealmMouseEvent) -> Option<CrosstermMouseEvent> {
    Some(CrosstermMouseEvent {
        kind: convert_mouse_kind(mouse.kind)?,
        column: mouse.column,
        row: mouse.row,
        modifiers: convert_key_modifiers(mouse.modifiers),
    })
}

/// Drags are left-button gestures; other buttons are dropped here so a
/// right-click never arms a drag.
fn convert_mouse_kind(kind: RealmMouseEventKind) -> Option<CrosstermMouseEventKind> {
    let left = CrosstermMouseButton::Left;
    match kind {
        RealmMouseEventKind::Down(RealmMouseButton::Left) => {
            Some(CrosstermMouseEventKind::Down(left))
        }
        RealmMouseEventKind::Up(RealmMouseButton::Left) => Some(CrosstermMouseEventKind::Up(left)),
        RealmMouseEventKind::Drag(RealmMouseButton::Left) => {
            Some(CrosstermMouseEventKind::Drag(left))
        }
        RealmMouseEventKind::Moved => Some(CrosstermMouseEventKind::Moved),
        RealmMouseEventKind::ScrollDown => Some(CrosstermMouseEventKind::ScrollDown),
        RealmMouseEventKind::ScrollUp => Some(CrosstermMouseEventKind::ScrollUp),
        RealmMouseEventKind::ScrollLeft => Some(CrosstermMouseEventKind::ScrollLeft),
        RealmMouseEventKind::ScrollRight => Some(CrosstermMouseEventKind::ScrollRight),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, PersistenceGateway};
    use crate::settings::Settings;

    fn shared_app() -> SharedApp {
        Arc::new(Mutex::new(App::new(
            PersistenceGateway::new(MemoryStore::new()),
            Settings::default(),
            None,
        )))
    }

    #[test]
    fn test_convert_key_code() {
        assert_eq!(
            convert_key_code(RealmKey::Backspace),
            Some(CrosstermKeyCode::Backspace)
        );
        assert_eq!(convert_key_code(RealmKey::Enter), Some(CrosstermKeyCode::Enter));
        assert_eq!(convert_key_code(RealmKey::Left), Some(CrosstermKeyCode::Left));
        assert_eq!(convert_key_code(RealmKey::Right), Some(CrosstermKeyCode::Right));
        assert_eq!(convert_key_code(RealmKey::Esc), Some(CrosstermKeyCode::Esc));
        assert_eq!(
            convert_key_code(RealmKey::Char('Z')),
            Some(CrosstermKeyCode::Char('Z'))
        );
        assert_eq!(convert_key_code(RealmKey::Tab), None);
        assert_eq!(convert_key_code(RealmKey::Function(1)), None);
    }

    #[test]
    fn test_convert_key_modifiers() {
        let empty = RealmKeyModifiers::empty();
        assert_eq!(convert_key_modifiers(empty), CrosstermKeyModifiers::empty());

        let combined = RealmKeyModifiers::SHIFT | RealmKeyModifiers::CONTROL;
        let converted = convert_key_modifiers(combined);
        assert!(converted.contains(CrosstermKeyModifiers::SHIFT));
        assert!(converted.contains(CrosstermKeyModifiers::CONTROL));
        assert!(!converted.contains(CrosstermKeyModifiers::ALT));
    }

    #[test]
    fn test_convert_mouse_kind_keeps_left_button_only() {
        assert_eq!(
            convert_mouse_kind(RealmMouseEventKind::Down(RealmMouseButton::Left)),
            Some(CrosstermMouseEventKind::Down(CrosstermMouseButton::Left))
        );
        assert_eq!(
            convert_mouse_kind(RealmMouseEventKind::Drag(RealmMouseButton::Left)),
            Some(CrosstermMouseEventKind::Drag(CrosstermMouseButton::Left))
        );
        assert_eq!(
            convert_mouse_kind(RealmMouseEventKind::Down(RealmMouseButton::Right)),
            None
        );
        assert_eq!(
            convert_mouse_kind(RealmMouseEventKind::Up(RealmMouseButton::Middle)),
            None
        );
        assert_eq!(
            convert_mouse_kind(RealmMouseEventKind::ScrollLeft),
            Some(CrosstermMouseEventKind::ScrollLeft)
        );
        assert_eq!(
            convert_mouse_kind(RealmMouseEventKind::ScrollDown),
            Some(CrosstermMouseEventKind::ScrollDown)
        );
    }

    #[test]
    fn test_convert_mouse_event() {
        let realm_event = RealmMouseEvent {
            kind: RealmMouseEventKind::Up(RealmMouseButton::Left),
            column: 10,
            row: 20,
            modifiers: RealmKeyModifiers::empty(),
        };
        let crossterm_event = convert_mouse_event(realm_event).expect("left release converts");
        assert_eq!(crossterm_event.column, 10);
        assert_eq!(crossterm_event.row, 20);
        assert_eq!(
            crossterm_event.kind,
            CrosstermMouseEventKind::Up(CrosstermMouseButton::Left)
        );
    }

    #[test]
    fn test_component_maps_events_to_messages() {
        let mut component = BoardComponent::new(shared_app());
        let key = RealmKeyEvent {
            code: RealmKey::Char('n'),
            modifiers: RealmKeyModifiers::empty(),
        };
        assert!(matches!(
            component.on(Event::Keyboard(key)),
            Some(Message::Key(event)) if event.code == CrosstermKeyCode::Char('n')
        ));
        assert_eq!(
            component.on(Event::WindowResize(80, 24)),
            Some(Message::Resize(80, 24))
        );
        assert_eq!(component.on(Event::Tick), None);
    }

    #[test]
    fn test_apply_message_updates_shared_app() -> Result<()> {
        let app = shared_app();
        apply_message(
            &app,
            Message::Key(CrosstermKeyEvent::new(
                CrosstermKeyCode::Char('n'),
                CrosstermKeyModifiers::empty(),
            )),
        )?;
        assert_eq!(lock_app(&app)?.board().columns().len(), 4);
        assert!(!should_quit(&app)?);

        apply_message(
            &app,
            Message::Key(CrosstermKeyEvent::new(
                CrosstermKeyCode::Char('q'),
                CrosstermKeyModifiers::empty(),
            )),
        )?;
        assert!(should_quit(&app)?);
        Ok(())
    }
}
