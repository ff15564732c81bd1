mod error;
mod feed;
mod index;
mod record;
mod response;
mod sor;

pub use error::{ErrorKind, ReplicaError};
pub use feed::{CONTENT_FIELD, ChangeEvent, ChangeFeed, EVENT_KEY_FIELD};
pub use index::ItemIndex;
pub use record::{
    COLOR_FIELD, ID_FIELD, Item, RecordKey, TEXT_FIELD, VERSION_FIELD, VersionedRecord,
    parse_document, parse_version,
};
pub use response::QueryResponse;
pub use sor::SystemOfRecord;
