use std::process::ExitCode;

fn main() -> ExitCode {
    pharmabot_cli::run()
}
