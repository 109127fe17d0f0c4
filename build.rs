fn main() {
    // cfg.toml の変更で再ビルド（toml-cfg はビルド時に値を埋め込む）
    println!("cargo:rerun-if-changed=cfg.toml");
    embuild::espidf::sysenv::output();
}
