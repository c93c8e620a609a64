#![allow(non_snake_case)]

pub mod Action;
pub mod Limiter;
