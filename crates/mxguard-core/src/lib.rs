//! mxguard Core Types and Definitions
//!
//! This crate provides the foundational data model shared by every mxguard
//! crate. It includes:
//!
//! - **Styles**: the ordered `key=value` property bag of a cell ([`style::StyleMap`])
//! - **Points**: normalized connection point sets and their repair ([`points`] module)
//! - **Cells**: typed diagram nodes and edges ([`cell`] module)

pub mod cell;
pub mod points;
pub mod style;
