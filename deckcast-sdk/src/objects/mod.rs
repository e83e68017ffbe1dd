pub mod alert;
pub mod deck;
pub mod request;
pub mod status;
pub mod stream;

pub use alert::{SlackAttachment, SlackMessage};
pub use deck::{DeckInfo, DeckSnapshot};
pub use request::{RequestEntity, RequestRef, SourceType};
pub use status::{Account, NewStatus, PostedStatus, StatusVisibility};
pub use stream::{StreamEnvelope, StreamEventName};
