// Library root
// -----------
// This crate exposes the library surface behind the `pinboard` binary.
// `main.rs` wires these modules together for a single invocation.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the pinboard.in v1 API
//   (request building, transport, JSON decoding).
// - `filter`: Local search over an already-fetched bookmark list.
// - `config`: Loads the auth token and user name from a TOML file.
// - `error`: Typed failures raised by `api` and `config`.
// - `cli` / `commands`: Argument definitions and the command layer that
//   maps each subcommand onto `api` and `filter`.
// - `ui`: Terminal rendering (colors, columns, note formats, prompts).
//
// Keeping the network behind `api::Transport` makes the client testable
// without touching the real service.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod ui;
