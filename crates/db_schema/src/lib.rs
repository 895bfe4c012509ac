#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_derive_newtype;
#[macro_use]
extern crate async_trait;

pub mod impls;
pub mod newtypes;
pub mod schema;
pub mod source;
pub mod traits;
pub mod utils;
