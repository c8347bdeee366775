//! Message framing
//!
//! Every message starts with a `u32` [`MessageType`] tag followed by the
//! payload of the matching [`MessageData`] implementation. There is no
//! length prefix or version field; a payload ends where its own encoding
//! says it does.

use crate::error::{BinaryError, Result};
use crate::reader::BinaryReader;
use crate::writer::{BinaryWriter, wire_len};
use meshsync_core::constants::MESSAGE_TYPE_SIZE;
use meshsync_core::{DeleteData, GetData, MeshData, MessageType};
use tracing::trace;

/// A payload that can be written to and read from the wire
pub trait MessageData: Sized {
    /// Tag written in front of this payload when framed as a [`Message`]
    const MESSAGE_TYPE: MessageType;

    /// Exact number of bytes [`serialize`](Self::serialize) writes
    fn encoded_len(&self) -> usize;

    /// [`encoded_len`](Self::encoded_len) as a `u32`.
    ///
    /// Payloads larger than `u32::MAX` bytes cannot be framed and report
    /// `u32::MAX`; [`check_size`](Self::check_size) rejects them instead.
    fn serialized_size(&self) -> u32 {
        u32::try_from(self.encoded_len()).unwrap_or(u32::MAX)
    }

    /// Exact size, or [`BinaryError::TooLarge`] when the payload does not
    /// fit `u32` length fields. Every length prefix in a payload is at most
    /// the payload size, so one check covers them all.
    fn check_size(&self) -> Result<u32> {
        wire_len(self.encoded_len())
    }

    fn serialize(&self, writer: &mut BinaryWriter);

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self>;

    /// Serialize into a fresh buffer sized up front
    fn to_payload(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::with_capacity(self.encoded_len());
        self.serialize(&mut writer);
        writer.into_inner()
    }

    /// Deserialize a payload that must span all of `data`
    fn from_payload(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let value = Self::deserialize(&mut reader)?;
        match reader.remaining() {
            0 => Ok(value),
            n => Err(BinaryError::TrailingData(n)),
        }
    }
}

/// Any message that can travel between producer and consumer
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Get(GetData),
    Delete(DeleteData),
    Mesh(MeshData),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Get(_) => GetData::MESSAGE_TYPE,
            Message::Delete(_) => DeleteData::MESSAGE_TYPE,
            Message::Mesh(_) => MeshData::MESSAGE_TYPE,
        }
    }

    /// Payload size, or [`BinaryError::TooLarge`] past the `u32` limit
    pub fn check_size(&self) -> Result<u32> {
        match self {
            Message::Get(v) => v.check_size(),
            Message::Delete(v) => v.check_size(),
            Message::Mesh(v) => v.check_size(),
        }
    }

    /// Framed size: tag plus payload
    pub fn serialized_size(&self) -> u32 {
        let payload = match self {
            Message::Get(v) => v.serialized_size(),
            Message::Delete(v) => v.serialized_size(),
            Message::Mesh(v) => v.serialized_size(),
        };
        payload.saturating_add(MESSAGE_TYPE_SIZE)
    }

    /// Append the tag and payload to `writer`
    pub fn write_to(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.message_type() as u32);
        match self {
            Message::Get(v) => v.serialize(writer),
            Message::Delete(v) => v.serialize(writer),
            Message::Mesh(v) => v.serialize(writer),
        }
    }

    /// Read one framed message, leaving the reader just past it
    pub fn read_from(reader: &mut BinaryReader<'_>) -> Result<Message> {
        let start = reader.position();
        let tag = reader.read_u32()?;
        let message = match MessageType::from_u32(tag) {
            MessageType::Get => Message::Get(GetData::deserialize(reader)?),
            MessageType::Delete => Message::Delete(DeleteData::deserialize(reader)?),
            MessageType::Mesh => Message::Mesh(MeshData::deserialize(reader)?),
            MessageType::Unknown => return Err(BinaryError::UnknownMessageType(tag)),
        };
        trace!(
            message_type = %message.message_type(),
            offset = start,
            size = reader.position() - start,
            "read message"
        );
        Ok(message)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::with_capacity(self.serialized_size() as usize);
        self.write_to(&mut writer);
        trace!(
            message_type = %self.message_type(),
            size = writer.len(),
            "wrote message"
        );
        writer.into_inner()
    }

    /// Decode exactly one message; leftover bytes are an error
    pub fn from_bytes(data: &[u8]) -> Result<Message> {
        let mut reader = BinaryReader::new(data);
        let message = Self::read_from(&mut reader)?;
        match reader.remaining() {
            0 => Ok(message),
            n => Err(BinaryError::TrailingData(n)),
        }
    }
}

impl From<GetData> for Message {
    fn from(v: GetData) -> Self {
        Message::Get(v)
    }
}

impl From<DeleteData> for Message {
    fn from(v: DeleteData) -> Self {
        Message::Delete(v)
    }
}

impl From<MeshData> for Message {
    fn from(v: MeshData) -> Self {
        Message::Mesh(v)
    }
}

/// Iterator over messages packed back to back in one buffer.
///
/// Stops after the first error, since the position of the next message is
/// unknown once a payload fails to decode.
pub struct MessageStream<'a> {
    reader: BinaryReader<'a>,
    failed: bool,
}

impl<'a> MessageStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(data),
            failed: false,
        }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }
}

impl Iterator for MessageStream<'_> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.remaining() == 0 {
            return None;
        }
        let result = Message::read_from(&mut self.reader);
        self.failed = result.is_err();
        Some(result)
    }
}

/// Concatenate the framed encodings of `messages`, rejecting any message
/// too large to frame
pub fn write_messages<'m>(messages: impl IntoIterator<Item = &'m Message>) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new();
    for message in messages {
        message.check_size()?;
        message.write_to(&mut writer);
    }
    Ok(writer.into_inner())
}
