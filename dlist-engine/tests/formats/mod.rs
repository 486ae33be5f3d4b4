//! Format tests
//!
//! Markup import and export through the registered formats.

mod html;
