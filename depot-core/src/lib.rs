pub mod blocking;

mod client;
mod config;
mod engine;
mod entity;
mod error;
mod mapping;
mod metadata;
mod provider;
mod repository;
mod row;
mod statement;
mod transaction;
mod util;
mod value;

pub use client::*;
pub use config::*;
pub use engine::*;
pub use entity::*;
pub use error::*;
pub use mapping::*;
pub use metadata::*;
pub use provider::*;
pub use repository::*;
pub use row::*;
pub use statement::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
