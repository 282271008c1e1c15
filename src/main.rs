//! rpomolog main entrypoint.

use rpomolog::run;
use rpomolog::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        tracing::error!(error = %e, "command failed");
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
