//! Support for collapsing and expanding recursive structures by
//! repeatedly expanding or collapsing them one frame at a time.

mod collapse;
mod expand;

pub use collapse::Collapsible;
pub use expand::Expandable;
