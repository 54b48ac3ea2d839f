pub mod clear;
pub mod setup;
