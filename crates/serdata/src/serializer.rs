use crate::{ArchiveMode, Result, SerializationStream, SerializerSelector};

/// Moves one logical value of type `T` between memory and a stream.
///
/// The same method handles both directions: in [`ArchiveMode::Serialize`] the
/// slot is read and written out, in [`ArchiveMode::Deserialize`] the slot is
/// filled (or replaced) from the stream. Keeping a single code path is what
/// guarantees that both sides agree on field order and sizes.
///
/// Implementations are shared behind `Arc` and must not keep per-call state
/// once [`initialize`](DataSerializer::initialize) has run.
pub trait DataSerializer<T>: Send + Sync {
    /// Resolves the serializers this one depends on. Runs once, before any
    /// transfer; [`SerializerSelector::register`] calls it.
    fn initialize(&mut self, _selector: &SerializerSelector) -> Result<()> {
        Ok(())
    }

    /// Shape pass: writes metadata such as a length ahead of the payload, or
    /// reads it back and sizes the slot before [`serialize`](DataSerializer::serialize).
    fn pre_serialize(
        &self,
        _value: &mut T,
        _mode: ArchiveMode,
        _stream: &mut dyn SerializationStream,
    ) -> Result<()> {
        Ok(())
    }

    /// Payload pass.
    fn serialize(
        &self,
        value: &mut T,
        mode: ArchiveMode,
        stream: &mut dyn SerializationStream,
    ) -> Result<()>;

    /// Runs both passes in the stream's own mode.
    fn transfer(&self, value: &mut T, stream: &mut dyn SerializationStream) -> Result<()> {
        let mode = stream.mode();
        self.pre_serialize(value, mode, stream)?;
        self.serialize(value, mode, stream)
    }
}
