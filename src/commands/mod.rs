//! CLI command implementations.
//!
//! - **calibrate**: calibrate every metrics file under a directory
//! - **init**: write a default `.slidecal.toml`

pub mod calibrate;
pub mod init;

pub use calibrate::{
    calibrate_file, handle_calibrate, prompt_for_root, run, run_with_config, CalibrateConfig,
};
pub use init::init_config;
