#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod components;
mod config;
mod encoding;
mod entity;
mod error;
mod generator;
mod layout;
mod machine;
mod time;

pub use crate::components::*;
pub use crate::config::*;
pub use crate::encoding::*;
pub use crate::entity::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::machine::*;
pub use crate::time::*;
