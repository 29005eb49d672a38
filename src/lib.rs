#![warn(missing_debug_implementations)]

mod access;
mod attribute;
mod buffer;
mod class;
mod constant_pool;
mod constants;
mod error;
mod handle;
mod hierarchy;
mod member;
mod options;
mod utf8_cache;
mod visitor;

pub use access::*;
pub use attribute::*;
pub use buffer::*;
pub use class::*;
pub use constant_pool::*;
pub use constants::*;
pub use error::*;
pub use handle::*;
pub use hierarchy::*;
pub use member::*;
pub use options::*;
pub use utf8_cache::*;
pub use visitor::*;
