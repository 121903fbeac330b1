//! Generates the `expr` and `stmt` modules into `OUT_DIR`.

use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let grammars = lox_astgen::grammars::lox()?;
    lox_astgen::generate(&grammars, &out_dir)?;

    Ok(())
}
