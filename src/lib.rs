//! Reftally - Referral Performance Aggregation Engine
//!
//! Tracks affiliate referrals as one record per (wallet, project) pair with
//! append-only event sub-collections, recomputes performance rollups and XP
//! scores from those raw events, and refreshes cached social-engagement
//! counters from the platform's metrics endpoint on a schedule.

pub mod adapter;
pub mod bootstrap;
pub mod config;
pub mod engagement;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod rollup;
pub mod scoring;
pub mod services;
pub mod storage;
