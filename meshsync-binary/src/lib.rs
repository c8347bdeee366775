//! MeshSync Binary Format
//!
//! Little-endian wire encoding for the messages defined in `meshsync-core`.
//!
//! # Example
//!
//! ```rust
//! use meshsync_binary::{Message, MessageStream};
//! use meshsync_core::{DeleteData, GetData, GetFlags};
//!
//! let get = Message::from(GetData::new(GetFlags::GET_POINTS | GetFlags::GET_INDICES, 1.0));
//! let delete = Message::from(DeleteData::new("/Scene/Cube"));
//!
//! let mut bytes = get.to_bytes();
//! bytes.extend(delete.to_bytes());
//!
//! for message in MessageStream::new(&bytes) {
//!     println!("{}", message?.message_type());
//! }
//! # Ok::<(), meshsync_binary::BinaryError>(())
//! ```

pub mod error;
pub mod mesh;
pub mod message;
pub mod reader;
pub mod request;
pub mod writer;

pub use error::{BinaryError, Result};
pub use message::{Message, MessageData, MessageStream, write_messages};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;
