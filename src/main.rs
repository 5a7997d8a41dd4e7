use std::process::ExitCode;

fn main() -> ExitCode {
    match zk_schools::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
