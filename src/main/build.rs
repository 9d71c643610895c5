fn main() {
    // Compile-time defaults are read from cfg.toml by toml-cfg
    println!("cargo:rerun-if-changed=cfg.toml");
}
