//! Converters between the flat model and the nested view, and the position mapping that keeps
//! them addressable.

pub mod downcast;
pub mod mapper;
pub mod upcast;

pub use downcast::{render_model, Downcaster};
pub use mapper::{ListPositionMapper, Mapper, MappingContext, PositionOverride};
pub use upcast::Upcaster;
