// Veratag's Test Infrastructure
//
// Scenario tests drive whole extractors over realistic source snippets and
// assert on the emitted tag records. Unit tests for the smaller pieces live
// in #[cfg(test)] modules next to the code they cover.

pub mod vera_tests;
