use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Sources whose `#[repr(C)]` items end up in the generated header.
const HEADER_INPUTS: &[&str] = &[
    "src/ffi.rs",
    "src/ffi/types.rs",
    "src/ffi/functions.rs",
    "cbindgen.toml",
];

fn main() -> Result<(), Box<dyn Error>> {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    for input in HEADER_INPUTS {
        println!("cargo::rerun-if-changed={input}");
    }
    write_header(&crate_dir, &crate_dir.join("include").join("isp_aec.h"))
}

fn write_header(crate_dir: &Path, header: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = header.parent() {
        fs::create_dir_all(dir)?;
    }
    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml"))?;
    cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()?
        .write_to_file(header);
    Ok(())
}
