use clap::Parser;
use leetob::app::Application;
use leetob::cli::Args;
use leetob::init_logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args = Args::parse();
    let mut app = Application::new(args)?;
    app.run().await?;

    Ok(())
}
