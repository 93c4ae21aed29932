//! PancakeSwap v2/v3 多链报价与兑换编排。

pub mod api;
pub mod bindings;
pub mod chain;
pub mod cli;
pub mod config;
pub mod engine;
pub mod monitoring;
pub mod service;
