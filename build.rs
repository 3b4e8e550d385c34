//! Build script for the handset firmware
//!
//! Handles memory layout configuration for the embedded target.

fn main() {
    // Tell Cargo to re-run this if the linker script changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    // Link memory.x from the project directory when building the firmware image
    if std::env::var("CARGO_FEATURE_EMBEDDED").is_ok() {
        println!(
            "cargo:rustc-link-search={}",
            std::env::var("CARGO_MANIFEST_DIR").unwrap()
        );
    }
}
