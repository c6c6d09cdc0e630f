#![allow(dead_code)]

use wasm_bindgen::prelude::*;

mod bindings;
mod catalog;
mod media_element;
pub mod orchestrator;
mod panel;
mod playback;
mod requester;
mod source;
mod utils;

pub use utils::logger::Logger;
