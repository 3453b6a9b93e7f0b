//! Entry point for the `bcsbuffer` command.
#![forbid(unsafe_code)]

fn main() {
    env_logger::init();
    if let Err(err) = bcs_cli::run() {
        eprintln!("bcsbuffer: {err}");
        std::process::exit(1);
    }
}
