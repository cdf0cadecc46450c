//! Data service for the kid snack generator.
//!
//! Stores the roster of children (with their ingredient exclusions) and the
//! snacks saved for each of them, and answers snack-suggestion requests
//! through a pluggable generator.

pub mod db;
pub mod domain;
pub mod rest;
pub mod suggest;
