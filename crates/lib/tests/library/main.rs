mod cmake_tests;
mod common;
