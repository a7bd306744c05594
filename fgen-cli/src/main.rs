//! Command line synthesis tool of four-bar function generators.
mod cli;

fn main() {
    cli::Entry::main();
}
