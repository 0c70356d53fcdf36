use std::sync::Arc;

use anyhow::bail;
use clap::Parser;

mod classify;
mod cli;
mod config;
mod dispatcher;
mod gateway;
mod links;
mod session;
#[cfg(test)]
mod tests;

use config::Config;
use dispatcher::{Dispatch, DisplayState, InputDispatcher};
use gateway::{HttpTransport, RequestGateway};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = cli::Args::parse();

    let config = Config::load();
    let transport = Arc::new(HttpTransport::new()?);
    let gateway = Arc::new(RequestGateway::new(config.api.gateway_config(), transport));

    match args.command {
        cli::Command::Go { text } => {
            let text = text.join(" ");
            let session = session::fetch_session(&gateway);
            let mut dispatcher = InputDispatcher::new(gateway.clone(), session);

            match dispatcher.submit(&text) {
                Dispatch::Started(job) => {
                    let outcome = dispatcher.run(&job);
                    dispatcher.settle(outcome);

                    if let Some(notice) = dispatcher.notice() {
                        bail!("{notice}");
                    }

                    match dispatcher.display() {
                        DisplayState::Reference(reference) => {
                            println!("{}", serde_json::to_string_pretty(reference).unwrap())
                        }
                        DisplayState::Results(results) => {
                            println!("{}", serde_json::to_string_pretty(results).unwrap())
                        }
                        DisplayState::Empty => {}
                    }
                    Ok(())
                }
                Dispatch::LoginRedirect(url) => {
                    println!("Sign in first: {url}");
                    Ok(())
                }
                Dispatch::EmptyInput => bail!("nothing to submit"),
            }
        }

        cli::Command::Add { url } => {
            let reference = gateway.create_reference(&url)?;
            println!("{}", serde_json::to_string_pretty(&reference).unwrap());
            Ok(())
        }

        cli::Command::Search { query } => {
            let results = gateway.search(&query.join(" "))?;
            println!("{}", serde_json::to_string_pretty(&results).unwrap());
            Ok(())
        }

        cli::Command::List {} => {
            let links = gateway.list_references()?;
            println!("{}", serde_json::to_string_pretty(&links).unwrap());
            Ok(())
        }

        cli::Command::Login {} => {
            println!("{}", gateway.login_url());
            Ok(())
        }

        cli::Command::Logout {} => {
            gateway.logout()?;
            println!("signed out");
            Ok(())
        }

        cli::Command::Whoami {} => {
            let session = session::fetch_session(&gateway);
            match session.user {
                Some(user) => println!("{}", serde_json::to_string_pretty(&user).unwrap()),
                None => println!("not signed in"),
            }
            Ok(())
        }
    }
}
