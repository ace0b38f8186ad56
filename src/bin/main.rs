use clap::Parser;
use dotenvy::dotenv;
use halgen::{Cli, handle_error, run_generate_command};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage mistakes are reported, not treated as failures
            let _ = err.print();
            return;
        }
    };

    run_generate_command(cli)
        .await
        .unwrap_or_else(handle_error);
}
