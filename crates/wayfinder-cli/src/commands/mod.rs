// Module exports for CLI subcommands
//
// Each module handles one subcommand; main.rs only parses arguments and
// dispatches to these handlers.

pub mod buildings;
pub mod import;
pub mod route;
