// Build script for pulsedb-grpc
// Compiles protobuf definitions using tonic-build

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    let out_dir = std::env::var("OUT_DIR")?;

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir(&out_dir)
        .compile_protos(&["proto/pulsedb.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/pulsedb.proto");
    Ok(())
}
