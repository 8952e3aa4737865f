//! Streaming XML processing for repository responses.

mod reader;
mod utils;

pub use reader::{read_response, Response, ResponseReader};
pub use utils::{get_attribute, get_attributes, get_tag_name, push_end_tag, push_start_tag, raw};
