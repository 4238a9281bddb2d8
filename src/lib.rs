pub mod common;
pub mod config;
pub mod errors;
pub mod graph;
pub mod id_generator;
pub mod node_factory;

pub mod server;
pub mod services;
pub mod storage;
