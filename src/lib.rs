//! Clinical Assessment - Adaptive differential-diagnosis dialogue engine
//!
//! This crate runs a question-and-answer assessment over a clinical
//! knowledge base: it keeps posterior beliefs over candidate conditions,
//! screens every answer for red flags, picks the most informative next
//! question and stops with either a ranked diagnosis or an urgent referral.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
