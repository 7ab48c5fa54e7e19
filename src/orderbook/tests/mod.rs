
mod finder_tests;
