fn main() {
    println!("cargo:rerun-if-changed=schema/laboratory.graphql");

    cynic_codegen::register_schema("laboratory")
        .from_sdl_file("schema/laboratory.graphql")
        .expect("laboratory schema must be readable")
        .as_default()
        .expect("laboratory schema must be registrable as default");
}
