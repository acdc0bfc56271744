use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::error::Error;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };
use weather_playground::cli::ChatArgs;
use weather_playground::client::{ ChatSession, HttpChatTransport, SendOutcome };

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = ChatArgs::parse();
    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let transport = HttpChatTransport::new(&args.endpoint)?;
    info!("Chatting via {}", transport.chat_url());
    let mut session = ChatSession::new(transport);

    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Weather Assistant - ask me about weather, forecasts, climate or meteorology.\n").await?;
    stdout.write_all(b"Type /quit to leave.\n").await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        if session.send(&line).await == SendOutcome::Ignored {
            continue;
        }
        if let Some(reply) = session.messages().last() {
            stdout.write_all(format!("{}\n", reply.content).as_bytes()).await?;
        }
    }

    Ok(())
}
