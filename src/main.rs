use std::process;

use action_locator::STATUS_SUCCESS;
use droidlocate_cli::cli;

#[tokio::main]
async fn main() {
    match cli::run().await {
        Ok(status) if status == STATUS_SUCCESS => {}
        // The response is already printed; a failure status maps to exit code 2.
        Ok(_) => process::exit(2),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}
