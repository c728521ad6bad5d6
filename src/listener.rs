use std::collections::HashMap;
use std::fmt;

use crate::models::{CombatLogRecord, EventType};

pub type RecordCallback = Box<dyn FnMut(&CombatLogRecord) + Send>;

/// Per-event-type hooks run by the parser as each record is accepted.
///
/// One callback per event type; registering again replaces the old one.
#[derive(Default)]
pub struct EventListener {
    callbacks: HashMap<EventType, RecordCallback>,
}

impl EventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event_listener<F>(&mut self, event: EventType, callback: F)
    where
        F: FnMut(&CombatLogRecord) + Send + 'static,
    {
        self.callbacks.insert(event, Box::new(callback));
    }

    pub fn get_mut(&mut self, event: EventType) -> Option<&mut RecordCallback> {
        self.callbacks.get_mut(&event)
    }

    pub(crate) fn dispatch(&mut self, record: &CombatLogRecord) {
        if let Some(callback) = self.callbacks.get_mut(&record.header.event_type) {
            callback(record);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("events", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}
