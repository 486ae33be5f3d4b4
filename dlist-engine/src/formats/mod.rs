//! Format implementations
//!
//! Each format converts between the settled flat model and a text representation.

pub mod html;
pub mod json;
pub mod treeviz;

pub use html::{HtmlFormat, HtmlOptions};
pub use json::JsonFormat;
pub use treeviz::TreevizFormat;
