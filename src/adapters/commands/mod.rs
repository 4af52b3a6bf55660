//! Inbound command handlers.

mod fetch_custom_face;
mod registry;

pub use fetch_custom_face::{FetchCustomFaceHandler, FETCH_FAV_EMOJI_LIST};
pub use registry::CommandHandlerMap;
