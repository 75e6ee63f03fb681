fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR");
    let proto_path = format!("{manifest_dir}/proto/fleetmon.proto");
    let proto_dir = format!("{manifest_dir}/proto");

    tonic_build::configure()
        .compile_protos(&[proto_path], &[proto_dir])
        .expect("failed to compile proto files with tonic-build");

    println!("cargo:rerun-if-changed={manifest_dir}/proto/fleetmon.proto");
}
