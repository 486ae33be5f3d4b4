//! Editing tests
//!
//! Change batches, commands and key handling through the editor facade, checked against a
//! fresh render of the model.

mod batches;
mod properties;
mod scenarios;
