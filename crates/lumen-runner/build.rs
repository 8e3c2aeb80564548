//! Build script: rebuild when the release pipeline changes the stamped version.

fn main() {
    println!("cargo:rerun-if-env-changed=LUMEN_BUILD_VERSION");
}
