//! Terminal chat client
//!
//! Run with: cargo run --features cli --bin chat-cli
//!
//! Every stdin line is sent as a chat message. `/quit`, `/disconnect` or EOF
//! ends the session. Endpoint comes from `CHAT_WS` / `CHAT_CONFIG`.

#[cfg(not(target_arch = "wasm32"))]
use chat_channel::{Command, CommandChannel, NativeWsClient};

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use chat_channel::{ClientConfig, NativeConnector, WsState};
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tracing::info;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chat_channel=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = ClientConfig::from_env()?;

    let (mut connector, mut events) = NativeConnector::new();
    let mut channel = CommandChannel::new(config.endpoint);
    channel.on_state_change(|state| match state {
        WsState::Open => info!("Connected, type a message (/quit to leave)"),
        WsState::Closed => info!("Disconnected from the server"),
        _ => {}
    });
    channel.on_message(|text| println!("< {text}"));
    // A failed start leaves the channel closed, which ends the loop below
    let _ = channel.open(&mut connector);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    // Input ended before the handshake finished
    let mut quit_when_open = false;

    while !channel.state().is_terminal() {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                channel.handle_event(event);
                if quit_when_open && channel.state().is_open() {
                    let _ = channel.disconnect();
                }
            }
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(line) => handle_line(&mut channel, &line),
                    None => {
                        input_open = false;
                        if channel.state() == WsState::Connecting {
                            quit_when_open = true;
                        } else {
                            let _ = channel.disconnect();
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn handle_line(channel: &mut CommandChannel<NativeWsClient>, line: &str) {
    use tracing::debug;

    // Rejections are logged by the channel; nothing else to do with them here
    let result = match line.trim() {
        "/quit" | "/disconnect" => channel.disconnect(),
        _ => Command::chat(line).and_then(|cmd| channel.send(cmd)),
    };
    if let Err(e) = result {
        debug!(error = %e, "Line not sent");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
