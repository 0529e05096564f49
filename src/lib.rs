// Library root
// -----------
// This crate exposes a small library surface for the superuser console.
// The binary (`main.rs`) uses these modules to implement the interactive CLI.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the OpsHub backend (one
//   method per superuser action) and the request payload types.
// - `response`: Classifies every server response into a typed outcome
//   (success / operational error / validation error / protocol violation)
//   so nothing downstream inspects raw string prefixes.
// - `retry`: The retry-or-abort convention shared by every remote action.
//   The "ask a human" policy is a trait so tests can script decisions.
// - `logs`: The local log console: line parsing, tail/filter queries and
//   the console command grammar.
// - `ui`: Implements the terminal-based flows (startup handshake, menu,
//   per-action prompts) and delegates requests to `api`.
//
// Keeping this separation makes it easier to test the classification and
// log-query logic without a terminal or a live backend.
pub mod api;
pub mod logs;
pub mod response;
pub mod retry;
pub mod ui;
