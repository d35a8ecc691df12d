use std::env;
use std::path::{Path, PathBuf};

const HEADER: &str = "vellum.h";

fn main() {
    let crate_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default());
    let config_path = crate_dir.join("cbindgen.toml");

    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed={}", config_path.display());

    // Header failures are warnings; the library still builds.
    if let Err(message) = write_header(&crate_dir, &config_path) {
        println!("cargo:warning=include/{HEADER} not regenerated: {message}");
    }
}

fn write_header(crate_dir: &Path, config_path: &Path) -> Result<(), String> {
    let config = cbindgen::Config::from_file(config_path)
        .map_err(|e| format!("reading {}: {e}", config_path.display()))?;

    let output_dir = crate_dir.join("include");
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| format!("creating {}: {e}", output_dir.display()))?;

    let bindings = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()
        .map_err(|e| e.to_string())?;
    bindings.write_to_file(output_dir.join(HEADER));
    Ok(())
}
