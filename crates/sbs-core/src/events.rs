//! Per-side event subscriptions
//!
//! Handlers are plain functions over a context `C` (the view), registered
//! once per side and event kind.

use crate::pane::PaneEvent;
use crate::side::DisplaySide;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneEventKind {
    CursorActivity,
    RenderLine,
    Scroll,
    Focus,
}

impl PaneEvent {
    pub fn kind(&self) -> PaneEventKind {
        match self {
            PaneEvent::CursorActivity => PaneEventKind::CursorActivity,
            PaneEvent::RenderLine(_) => PaneEventKind::RenderLine,
            PaneEvent::Scroll => PaneEventKind::Scroll,
            PaneEvent::Focus => PaneEventKind::Focus,
        }
    }
}

pub type Handler<C> = fn(&mut C, DisplaySide, &PaneEvent);

pub struct EventTable<C> {
    handlers: FxHashMap<(DisplaySide, PaneEventKind), Vec<Handler<C>>>,
}

impl<C> Default for EventTable<C> {
    fn default() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }
}

impl<C> std::fmt::Debug for EventTable<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort_by_key(|(side, kind)| (side.index(), format!("{kind:?}")));
        f.debug_struct("EventTable").field("subscriptions", &keys).finish()
    }
}

impl<C> EventTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, side: DisplaySide, kind: PaneEventKind, handler: Handler<C>) {
        self.handlers.entry((side, kind)).or_default().push(handler);
    }

    /// Register `handler` for `kind` on both panes
    pub fn on_both(&mut self, kind: PaneEventKind, handler: Handler<C>) {
        for side in DisplaySide::BOTH {
            self.on(side, kind, handler);
        }
    }

    /// Handlers for one event, copied out so the caller can hand the
    /// context to them mutably
    pub fn handlers(&self, side: DisplaySide, kind: PaneEventKind) -> Vec<Handler<C>> {
        self.handlers
            .get(&(side, kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn dispatch(&self, ctx: &mut C, side: DisplaySide, event: &PaneEvent) -> usize {
        let handlers = self.handlers(side, event.kind());
        for handler in &handlers {
            handler(ctx, side, event);
        }
        handlers.len()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}
