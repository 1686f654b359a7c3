use std::fmt;

use crate::error::{LinkError, Result};
use crate::received::Received;

/// Most handlers a table can hold: one per possible packet id.
pub const MAX_HANDLERS: usize = 256;

/// Something that reacts to a received packet.
///
/// Implemented for every `FnMut(&Received)` closure.
pub trait PacketHandler {
    fn handle(&mut self, packet: &Received<'_>);
}

impl<F> PacketHandler for F
where
    F: FnMut(&Received<'_>),
{
    fn handle(&mut self, packet: &Received<'_>) {
        self(packet)
    }
}

/// Packet-id to handler dispatch table.
#[derive(Default)]
pub struct CallbackTable {
    handlers: Vec<Option<Box<dyn PacketHandler>>>,
}

impl CallbackTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table with an ordered list; position `n` handles id `n`.
    pub fn set_ordered(&mut self, handlers: Vec<Box<dyn PacketHandler>>) -> Result<()> {
        if handlers.len() > MAX_HANDLERS {
            return Err(LinkError::InvalidCallbackList(format!(
                "{} handlers given, packet ids only cover {MAX_HANDLERS}",
                handlers.len()
            )));
        }
        self.handlers = handlers.into_iter().map(Some).collect();
        Ok(())
    }

    /// Install or replace the handler for one id.
    pub fn set(&mut self, id: u8, handler: Box<dyn PacketHandler>) {
        let idx = usize::from(id);
        if self.handlers.len() <= idx {
            self.handlers.resize_with(idx + 1, || None);
        }
        self.handlers[idx] = Some(handler);
    }

    /// Remove the handler for one id, returning it.
    pub fn remove(&mut self, id: u8) -> Option<Box<dyn PacketHandler>> {
        self.handlers.get_mut(usize::from(id)).and_then(Option::take)
    }

    /// Whether a handler exists for `id`.
    pub fn contains(&self, id: u8) -> bool {
        matches!(self.handlers.get(usize::from(id)), Some(Some(_)))
    }

    /// Remove all handlers.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Number of installed handlers.
    pub fn len(&self) -> usize {
        self.handlers.iter().filter(|h| h.is_some()).count()
    }

    /// Whether no handler is installed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the handler for the packet's id. Returns false if there is none.
    pub fn dispatch(&mut self, packet: &Received<'_>) -> bool {
        match self.handlers.get_mut(usize::from(packet.id())) {
            Some(Some(handler)) => {
                handler.handle(packet);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<usize> = self
            .handlers
            .iter()
            .enumerate()
            .filter_map(|(id, h)| h.as_ref().map(|_| id))
            .collect();
        f.debug_struct("CallbackTable").field("ids", &ids).finish()
    }
}
