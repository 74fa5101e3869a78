pub mod banner;
pub mod commands;
pub mod config;
pub mod consts;
pub mod form;
pub mod history;
pub mod lookup;
pub mod navigator;
pub mod questions;
pub mod session;
pub mod spinner;
pub mod step;
pub mod store;
pub mod trace;
