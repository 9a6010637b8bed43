//! # Tile Sandbox Entry Point
//!
//! Calls into the library's `run()` function and turns a failure into a non-zero exit code.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match tile_sandbox::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{}", error);
            eprintln!("tile-sandbox: {}", error);
            ExitCode::FAILURE
        }
    }
}
