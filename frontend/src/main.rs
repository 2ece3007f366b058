use aula_client_core::ClientError;
use aula_frontend::cli::Cli;
use aula_frontend::commands;
use aula_frontend::config::Config;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aula_client_core=info,aula_frontend=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }
    info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "starting");

    let ctx = aula_client_core::connect(config.client_config()?, &config.data_dir)?;

    match commands::run(cli.command, &ctx).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(err) => {
            match err.downcast_ref::<ClientError>() {
                Some(client_err) => {
                    if client_err.is_auth_failure() {
                        if let Err(e) = ctx.session.sign_out() {
                            error!(error = %e, "failed to clear session");
                        }
                    }
                    eprintln!("{}", client_err.user_message());
                }
                None => eprintln!("{:#}", err),
            }
            ctx.close_all();
            std::process::exit(1);
        }
    }
}
