//! Alternate binary name (`dt`) that forwards to the `desk_tools` library.
//! Keeping the alias as a real binary avoids shell alias requirements.

fn main() {
    if let Err(err) = desk_tools::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
