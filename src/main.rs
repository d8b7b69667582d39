#[tokio::main]
async fn main() {
    // Every path through the CLI goes through the same exit-code mapping
    // in cli::run; main only converts it for the OS.
    let code = coinforge::cli::run().await;
    std::process::exit(code.as_i32());
}
