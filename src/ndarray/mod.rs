//! In-memory frame model.
//!
//! - [`ArrayFrame`] - Sample buffer, shape, id, timestamp and attributes
//! - [`Attribute`] / [`AttrValue`] - Typed named scalars
//! - [`AttributeList`] - Insertion-ordered attribute collection

mod attribute;
mod frame;

pub use attribute::{AttrValue, Attribute, AttributeList};
pub use frame::ArrayFrame;
