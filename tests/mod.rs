//! Test suite for the discussion board
//!
//! This module organizes all tests

pub mod common;
pub mod integration;
pub mod property;
