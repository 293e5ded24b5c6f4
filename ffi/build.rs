use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=ANVIL_FFI_HEADER_DIR");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let out = out_dir.join("anvil_ffi.h");

    let result = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("ANVIL_FFI_H")
        .with_no_includes()
        .with_sys_include("stdbool.h")
        .with_sys_include("stdint.h")
        .generate();

    let bindings = match result {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=header generation skipped: {e}");
            return;
        }
    };
    bindings.write_to_file(&out);
    println!("cargo:rustc-env=ANVIL_FFI_HEADER={}", out.display());

    // Firmware builds that want the header next to their sources opt in here.
    if let Some(dir) = std::env::var_os("ANVIL_FFI_HEADER_DIR") {
        let dir = PathBuf::from(dir);
        if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| std::fs::copy(&out, dir.join("anvil_ffi.h"))) {
            println!("cargo:warning=cannot copy header to {}: {e}", dir.display());
        }
    }
}
