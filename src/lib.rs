pub mod braille;
pub mod config;
pub mod data;
pub mod geo;
pub mod map;
pub mod paint;
