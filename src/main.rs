use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    deekseep::cli::main()
}
