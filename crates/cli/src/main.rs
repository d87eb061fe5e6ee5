use std::process::ExitCode;

fn main() -> ExitCode {
    estimo_cli::run()
}
