use serde::{Deserialize, Serialize};

/// The DOM interaction handlers captured on the game container.
/// Generic, no game-specific semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Click,
    ContextMenu,
    DoubleClick,
    Drag,
    DragEnd,
    DragEnter,
    DragExit,
    DragLeave,
    DragOver,
    DragStart,
    Drop,
    MouseDown,
    MouseEnter,
    MouseLeave,
    MouseMove,
    MouseOut,
    MouseOver,
    MouseUp,
    Wheel,
    TouchCancel,
    TouchEnd,
    TouchMove,
    TouchStart,
    KeyDown,
    KeyPress,
    KeyUp,
}

impl InputKind {
    /// Every captured kind, in handler-name order.
    pub const ALL: [InputKind; 26] = [
        InputKind::Click,
        InputKind::ContextMenu,
        InputKind::DoubleClick,
        InputKind::Drag,
        InputKind::DragEnd,
        InputKind::DragEnter,
        InputKind::DragExit,
        InputKind::DragLeave,
        InputKind::DragOver,
        InputKind::DragStart,
        InputKind::Drop,
        InputKind::MouseDown,
        InputKind::MouseEnter,
        InputKind::MouseLeave,
        InputKind::MouseMove,
        InputKind::MouseOut,
        InputKind::MouseOver,
        InputKind::MouseUp,
        InputKind::Wheel,
        InputKind::TouchCancel,
        InputKind::TouchEnd,
        InputKind::TouchMove,
        InputKind::TouchStart,
        InputKind::KeyDown,
        InputKind::KeyPress,
        InputKind::KeyUp,
    ];

    /// The handler name JS binds on the container (`onClick`, `onKeyPress`, ...).
    pub fn handler_name(self) -> &'static str {
        match self {
            InputKind::Click => "onClick",
            InputKind::ContextMenu => "onContextMenu",
            InputKind::DoubleClick => "onDoubleClick",
            InputKind::Drag => "onDrag",
            InputKind::DragEnd => "onDragEnd",
            InputKind::DragEnter => "onDragEnter",
            InputKind::DragExit => "onDragExit",
            InputKind::DragLeave => "onDragLeave",
            InputKind::DragOver => "onDragOver",
            InputKind::DragStart => "onDragStart",
            InputKind::Drop => "onDrop",
            InputKind::MouseDown => "onMouseDown",
            InputKind::MouseEnter => "onMouseEnter",
            InputKind::MouseLeave => "onMouseLeave",
            InputKind::MouseMove => "onMouseMove",
            InputKind::MouseOut => "onMouseOut",
            InputKind::MouseOver => "onMouseOver",
            InputKind::MouseUp => "onMouseUp",
            InputKind::Wheel => "onWheel",
            InputKind::TouchCancel => "onTouchCancel",
            InputKind::TouchEnd => "onTouchEnd",
            InputKind::TouchMove => "onTouchMove",
            InputKind::TouchStart => "onTouchStart",
            InputKind::KeyDown => "onKeyDown",
            InputKind::KeyPress => "onKeyPress",
            InputKind::KeyUp => "onKeyUp",
        }
    }

    /// Look up a kind by handler name. Unknown names are not captured.
    pub fn from_handler_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.handler_name() == name)
    }

    pub fn is_keyboard(self) -> bool {
        matches!(self, InputKind::KeyDown | InputKind::KeyPress | InputKind::KeyUp)
    }
}

/// What came with the DOM event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputPayload {
    /// Pointer or touch position in world coordinates, plus mouse button.
    Pointer { x: f32, y: f32, button: u8 },
    /// A keyboard `code`, e.g. `"KeyW"` or `"Space"`.
    Key { code: String },
    Wheel { delta_x: f32, delta_y: f32 },
    None,
}

/// A captured interaction, queued until the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    pub payload: InputPayload,
}

impl InputEvent {
    pub fn new(kind: InputKind, payload: InputPayload) -> Self {
        Self { kind, payload }
    }

    pub fn pointer(kind: InputKind, x: f32, y: f32) -> Self {
        Self::new(kind, InputPayload::Pointer { x, y, button: 0 })
    }

    pub fn key(kind: InputKind, code: impl Into<String>) -> Self {
        Self::new(kind, InputPayload::Key { code: code.into() })
    }

    /// The key code, if this is a keyboard event.
    pub fn key_code(&self) -> Option<&str> {
        match &self.payload {
            InputPayload::Key { code } => Some(code),
            _ => None,
        }
    }
}

/// A queue of input events.
/// The host pushes events as they arrive. The engine drains them once per tick.
#[derive(Debug)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event.
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop pending events without handing them to anyone.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
