fn main() {
    // frontend/dist is embedded with include_dir!, which cargo does not
    // track on its own.
    println!("cargo:rerun-if-changed=frontend/dist");
    println!("cargo:rerun-if-changed=build.rs");
}
