use std::process::ExitCode;

use gbif_occ::ui::output;

fn main() -> ExitCode {
    match gbif_occ::cli::run() {
        Ok(code) => code,
        Err(e) => {
            output::error(&mut std::io::stderr(), format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
