use vergen_gitcl::{Build, Emitter, Gitcl};

// Embeds the git revision and build time reported by the server's health
// endpoint and in startup logs.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = Build::builder().build_timestamp(true).build();
    let git = Gitcl::builder().branch(true).sha(true).dirty(true).build();

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&git)?
        .emit()?;

    Ok(())
}
