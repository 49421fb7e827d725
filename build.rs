use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cargo = CargoBuilder::default().target_triple(true).build()?;
	// `sha(short)`: enables VERGEN_GIT_SHA; `false` keeps the full SHA.
	let gitcl = GitclBuilder::default().sha(false).build()?;

	Emitter::default().add_instructions(&cargo)?.add_instructions(&gitcl)?.emit()?;

	Ok(())
}
