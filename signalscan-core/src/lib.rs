//! signalscan core: daily bars, indicator engine, buy-signal detection,
//! company-name resolution, market data and order placement.
//!
//! - Domain types (bars, validated series)
//! - Single-pass EWMA and exponentially weighted band accumulators
//! - Buy rules over the augmented series, evaluated bar by bar
//! - Fuzzy company-name to ticker lookup
//! - Alpha Vantage provider, flat-file store, synthetic fallback
//! - Bracket order encoding and the Alpaca gateway

pub mod broker;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod signals;
pub mod symbols;
