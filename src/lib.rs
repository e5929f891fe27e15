#![crate_name = "quillplay"]
#![allow(dead_code)]

#[macro_use]
extern crate lazy_static;

pub mod actions;
pub mod conditions;
pub mod config;
pub mod database;
pub mod dice;
pub mod dictionary;
pub mod encoder;
pub mod error;
pub mod event;
pub mod header;
pub mod input;
pub mod inspect;
pub mod interpreter;
pub mod markup;
pub mod opcodes;
pub mod presenter;
pub mod presenter_headless;
pub mod presenter_terminal;
pub mod savegame;
pub mod snapshot;
pub mod state;
pub mod test_utils;
pub mod text;
