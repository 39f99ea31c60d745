//! Terminal presentation of assistant replies.
//!
//! - [`math`]: splits message text into prose and `$`/`$$` math segments.
//! - [`render`]: turns segments into printable text, optionally flattening
//!   Markdown in the prose parts.

pub mod math;
pub mod render;
