#![allow(dead_code)]

pub mod app;
pub mod gateway;
pub mod http;
