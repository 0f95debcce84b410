mod build_tests;
mod common;
mod export_tests;
