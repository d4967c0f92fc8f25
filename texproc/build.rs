fn main() {
    // intel_tex_2's prebuilt ISPC kernels reference C++ runtime symbols
    // (e.g. __gxx_personality_v0); link libstdc++ so binaries/tests link.
    println!("cargo:rustc-link-lib=dylib=stdc++");
}
