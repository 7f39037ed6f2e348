fn main() {
    if let Err(err) = desk_tools::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
