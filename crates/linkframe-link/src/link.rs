use linkframe_frame::{FrameParser, FrameWriter, PayloadBuffer, Status, MAX_PAYLOAD};
use linkframe_marshal::{
    read_value, write_raw, write_value, ByteOrder, Marshal, ScalarFormat, Value, ValueType,
};
use linkframe_transport::Transport;
use tracing::{debug, error};

use crate::callbacks::{CallbackTable, PacketHandler};
use crate::config::LinkConfig;
use crate::error::Result;
use crate::received::Received;

/// One end of a packet link.
///
/// Owns a transmit and a receive payload buffer, the framing state for both
/// directions and the packet-id dispatch table. Values are staged in the
/// transmit buffer with the `write*` methods and framed with [`Link::send`];
/// incoming bytes are consumed by [`Link::service`] or [`Link::tick`] and the
/// payload of the last good frame is read back with the `read*` methods.
///
/// Nothing blocks: each servicing call drains only what the transport
/// already has ready.
pub struct Link<T> {
    transport: T,
    tx: PayloadBuffer,
    rx: PayloadBuffer,
    writer: FrameWriter,
    parser: FrameParser,
    callbacks: CallbackTable,
    status: Status,
    bytes_read: usize,
    config: LinkConfig,
}

impl<T: Transport> Link<T> {
    /// Create a link with default configuration.
    pub fn new(transport: T) -> Self {
        Self::from_parts(
            transport,
            FrameWriter::new(),
            FrameParser::new(),
            LinkConfig::default(),
        )
    }

    /// Create a link with explicit configuration.
    ///
    /// Fails only if the checksum parameters are invalid.
    pub fn with_config(transport: T, config: LinkConfig) -> Result<Self> {
        let table = config.frame.build_table()?;
        Ok(Self::from_parts(
            transport,
            FrameWriter::with_table(table.clone()),
            FrameParser::with_table(table),
            config,
        ))
    }

    fn from_parts(
        transport: T,
        writer: FrameWriter,
        parser: FrameParser,
        config: LinkConfig,
    ) -> Self {
        Self {
            transport,
            tx: [0; MAX_PAYLOAD],
            rx: [0; MAX_PAYLOAD],
            writer,
            parser,
            callbacks: CallbackTable::new(),
            status: Status::NoData,
            bytes_read: 0,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Enable or disable error logging from [`Link::tick`].
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    // ---- Transmit buffer ----

    /// Write a typed value into the transmit buffer at `start`.
    ///
    /// Returns the offset just past the value.
    pub fn write<V: Marshal>(&mut self, value: &V, start: usize) -> Result<usize> {
        self.write_value(&value.to_value(), start, None, V::scalar_format())
    }

    /// Write a dynamic value, optionally overriding byte order and format.
    pub fn write_value(
        &mut self,
        value: &Value,
        start: usize,
        order: Option<ByteOrder>,
        format: Option<ScalarFormat>,
    ) -> Result<usize> {
        let order = order.unwrap_or(self.config.byte_order);
        Ok(write_value(&mut self.tx, start, value, order, format)?)
    }

    /// Copy pre-encoded bytes into the transmit buffer at `start`.
    pub fn write_raw(&mut self, bytes: &[u8], start: usize) -> Result<usize> {
        Ok(write_raw(&mut self.tx, start, bytes)?)
    }

    /// Frame the first `len` bytes of the transmit buffer and send them.
    ///
    /// `len` is clamped to the buffer size. The transmit buffer is stuffed in
    /// place, so values must be rewritten before the next send. Returns the
    /// payload length sent.
    pub fn send(&mut self, len: usize, id: u8) -> Result<usize> {
        Ok(self
            .writer
            .send(&mut self.transport, id, &mut self.tx, len)?)
    }

    /// Transmit buffer contents.
    pub fn tx_buffer(&self) -> &[u8] {
        &self.tx
    }

    // ---- Receive side ----

    /// Drain the transport once and advance the receive state machine.
    ///
    /// Returns the number of payload bytes ready, which is non-zero only when
    /// a frame completed on this call. The classified outcome is kept in
    /// [`Link::status`].
    pub fn service(&mut self) -> Result<usize> {
        let status = self.parser.service(&mut self.transport, &mut self.rx)?;
        self.status = status;
        self.bytes_read = status.bytes_read();
        Ok(self.bytes_read)
    }

    /// Service the link and dispatch a completed packet to its handler.
    ///
    /// Returns true if a packet was received, whether or not a handler
    /// exists for its id.
    pub fn tick(&mut self) -> Result<bool> {
        if self.service()? > 0 {
            let packet = Received::new(
                self.parser.packet_id(),
                &self.rx[..self.bytes_read],
                self.config.byte_order,
            );
            if !self.callbacks.dispatch(&packet) {
                if self.config.debug {
                    error!(id = packet.id(), "no callback available for packet id");
                } else {
                    debug!(id = packet.id(), "no callback available for packet id");
                }
            }
            return Ok(true);
        }

        if self.config.debug && self.status.is_error() {
            error!("{}", self.status.as_str());
        }
        Ok(false)
    }

    /// Outcome of the most recent servicing call.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Payload length made ready by the most recent servicing call.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Id of the most recently received packet.
    pub fn packet_id(&self) -> u8 {
        self.parser.packet_id()
    }

    /// View of the last received packet.
    ///
    /// The payload is empty unless the last servicing call completed a frame.
    pub fn received(&self) -> Received<'_> {
        Received::new(
            self.parser.packet_id(),
            &self.rx[..self.bytes_read],
            self.config.byte_order,
        )
    }

    /// Read a fixed-width value from the receive buffer at `start`.
    pub fn read<V: Marshal>(&self, start: usize) -> Result<V> {
        self.read_typed(start, None)
    }

    /// Read a value spanning `byte_size` bytes (text, JSON and lists).
    pub fn read_sized<V: Marshal>(&self, start: usize, byte_size: usize) -> Result<V> {
        self.read_typed(start, Some(byte_size))
    }

    fn read_typed<V: Marshal>(&self, start: usize, byte_size: Option<usize>) -> Result<V> {
        let value = read_value(
            &self.rx,
            V::value_type(),
            start,
            byte_size,
            V::scalar_format(),
            self.config.byte_order,
        )?;
        Ok(V::from_value(value)?)
    }

    /// Read a dynamic value from the receive buffer.
    pub fn read_value(
        &self,
        ty: ValueType,
        start: usize,
        byte_size: Option<usize>,
        list_format: Option<ScalarFormat>,
        order: Option<ByteOrder>,
    ) -> Result<Value> {
        let order = order.unwrap_or(self.config.byte_order);
        Ok(read_value(&self.rx, ty, start, byte_size, list_format, order)?)
    }

    /// Receive buffer contents.
    pub fn rx_buffer(&self) -> &[u8] {
        &self.rx
    }

    // ---- Callbacks ----

    /// Install an ordered handler list; position `n` handles packet id `n`.
    pub fn set_callbacks(&mut self, handlers: Vec<Box<dyn PacketHandler>>) -> Result<()> {
        self.callbacks.set_ordered(handlers)
    }

    /// Install a closure as the handler for one packet id.
    pub fn on<F>(&mut self, id: u8, handler: F)
    where
        F: FnMut(&Received<'_>) + 'static,
    {
        self.callbacks.set(id, Box::new(handler));
    }

    /// Install a handler object for one packet id.
    pub fn set_handler(&mut self, id: u8, handler: Box<dyn PacketHandler>) {
        self.callbacks.set(id, handler);
    }

    // ---- Transport ----

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the link, returning the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("transport", &self.transport)
            .field("state", &self.parser.state())
            .field("status", &self.status)
            .field("bytes_read", &self.bytes_read)
            .field("callbacks", &self.callbacks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
