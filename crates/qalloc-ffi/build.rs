//! Generates `include/qalloc.h` from the exported `extern "C"` items.

use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let config_path = crate_dir.join("cbindgen.toml");
    println!("cargo:rerun-if-changed={}", config_path.display());
    println!("cargo:rerun-if-changed=src");

    let include_dir = crate_dir.join("include");
    std::fs::create_dir_all(&include_dir)?;

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(cbindgen::Config::from_file(&config_path)?)
        .generate()?;
    bindings.write_to_file(include_dir.join("qalloc.h"));
    Ok(())
}
