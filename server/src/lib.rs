// orderdesk/src/lib.rs

//! REST backend for placing orders against tracked product stock.
//!
//! The interesting path is [`services::order_service::place_order`]: it runs the
//! registered place-order pipeline, which validates the request, compares it
//! with current stock, and commits the order together with conditional stock
//! decrements through a [`store::Store`].

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
