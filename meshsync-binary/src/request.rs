//! Wire encoding of the request messages

use crate::error::Result;
use crate::message::MessageData;
use crate::reader::BinaryReader;
use crate::writer::BinaryWriter;
use meshsync_core::constants::{FLAGS_SIZE, LENGTH_PREFIX_SIZE};
use meshsync_core::{DeleteData, GetData, GetFlags, MessageType};

impl MessageData for GetData {
    const MESSAGE_TYPE: MessageType = MessageType::Get;

    fn encoded_len(&self) -> usize {
        (FLAGS_SIZE + 4) as usize
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.flags.bits());
        writer.write_f32(self.scale);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let flags = GetFlags::from_bits_retain(reader.read_u32()?);
        let scale = reader.read_f32()?;
        Ok(GetData { flags, scale })
    }
}

impl MessageData for DeleteData {
    const MESSAGE_TYPE: MessageType = MessageType::Delete;

    fn encoded_len(&self) -> usize {
        LENGTH_PREFIX_SIZE as usize + self.path.len()
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_string(&self.path);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(DeleteData {
            path: reader.read_string()?,
        })
    }
}
