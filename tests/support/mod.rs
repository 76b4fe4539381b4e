#![allow(dead_code)]

pub mod env;
pub mod mp3;
pub mod wav;
