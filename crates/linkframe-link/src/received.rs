use linkframe_marshal::{read_value, ByteOrder, Marshal, Result, ScalarFormat, Value, ValueType};

/// Borrowed view of the most recently received packet.
///
/// Handed to packet handlers during [`Link::tick`](crate::Link::tick) and
/// available from [`Link::received`](crate::Link::received).
#[derive(Debug, Clone, Copy)]
pub struct Received<'a> {
    id: u8,
    payload: &'a [u8],
    order: ByteOrder,
}

impl<'a> Received<'a> {
    pub(crate) fn new(id: u8, payload: &'a [u8], order: ByteOrder) -> Self {
        Self { id, payload, order }
    }

    /// Packet id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Destuffed payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Payload length.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Read a fixed-width value at `start`.
    pub fn read<T: Marshal>(&self, start: usize) -> Result<T> {
        self.read_typed(start, None)
    }

    /// Read a value spanning `byte_size` bytes (text, JSON and lists).
    pub fn read_sized<T: Marshal>(&self, start: usize, byte_size: usize) -> Result<T> {
        self.read_typed(start, Some(byte_size))
    }

    fn read_typed<T: Marshal>(&self, start: usize, byte_size: Option<usize>) -> Result<T> {
        let value = read_value(
            self.payload,
            T::value_type(),
            start,
            byte_size,
            T::scalar_format(),
            self.order,
        )?;
        T::from_value(value)
    }

    /// Read a dynamically typed value.
    pub fn read_value(
        &self,
        ty: ValueType,
        start: usize,
        byte_size: Option<usize>,
        list_format: Option<ScalarFormat>,
    ) -> Result<Value> {
        read_value(self.payload, ty, start, byte_size, list_format, self.order)
    }
}

#[cfg(test)]
mod tests {
    use linkframe_marshal::MarshalError;

    use super::*;

    #[test]
    fn typed_reads_use_the_link_order() {
        let payload = [0x00, 0x2A, b'o', b'k', 0x00];
        let packet = Received::new(3, &payload, ByteOrder::BigEndian);

        assert_eq!(packet.id(), 3);
        assert_eq!(packet.len(), 5);
        assert_eq!(packet.read::<u16>(0).unwrap(), 42);
        assert_eq!(packet.read_sized::<String>(2, 3).unwrap(), "ok");
    }

    #[test]
    fn reads_are_bounded_by_payload() {
        let payload = [1, 2];
        let packet = Received::new(0, &payload, ByteOrder::LittleEndian);
        assert!(matches!(
            packet.read::<u32>(0),
            Err(MarshalError::OutOfBounds { capacity: 2, .. })
        ));
    }

    #[test]
    fn text_needs_a_size() {
        let packet = Received::new(0, b"hi", ByteOrder::LittleEndian);
        assert!(matches!(
            packet.read::<String>(0),
            Err(MarshalError::MissingByteSize)
        ));
    }

    #[test]
    fn dynamic_list_read() {
        let payload = [1, 2, 3];
        let packet = Received::new(0, &payload, ByteOrder::LittleEndian);
        let value = packet
            .read_value(ValueType::List, 0, Some(3), Some(ScalarFormat::U8))
            .unwrap();
        assert_eq!(value, Value::from(vec![1u8, 2, 3]));
    }
}
