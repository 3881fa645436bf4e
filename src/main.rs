//! Viewer binary.
//!
//! Controls:
//!   W/A/S/D or arrows - pan the shape
//!   Escape            - exit

use std::process;

use polygon_viewer::{run, ViewerConfig};

fn main() {
    env_logger::init();

    let config = ViewerConfig::default();
    log::info!("starting {}", config.title);

    if let Err(e) = run(config) {
        eprintln!("{e}");
        process::exit(-1);
    }
}
