//! RPG Game Server
//!
//! Reads `<player_id> /<command> [args]` lines from stdin and prints the
//! result, standing in for the chat transport.

use log::{error, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use rpg_server::commands::parse_and_execute;
use rpg_server::persistence::{self, InMemoryRepository, JsonStore};
use rpg_server::{Game, GameConfig};
use rpg_shared::Catalog;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::from_env();
    info!("Starting RPG server...");
    info!("Save file: {}", config.save_file.display());

    let store = JsonStore::new(config.save_file.clone());
    let players = match tokio::task::spawn_blocking({
        let store = store.clone();
        move || store.load_all_players()
    })
    .await
    {
        Ok(players) => players,
        Err(e) => {
            error!("Loading players did not complete: {}", e);
            return;
        }
    };

    let persistence = persistence::init(store);
    let catalog = Catalog::builtin();
    info!(
        "Catalog: {} weapons, {} armors, {} maps",
        catalog.weapons().len(),
        catalog.armors().len(),
        catalog.maps().len()
    );

    let autosave_interval = config.autosave_interval.max(std::time::Duration::from_secs(1));
    let mut game = Game::new(InMemoryRepository::with_players(players), catalog, config)
        .with_persistence(persistence.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut autosave = tokio::time::interval(autosave_interval);
    autosave.tick().await;

    info!("Ready. Type `<player_id> /help` for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                };

                if let Some(result) = parse_and_execute(&line, &mut game) {
                    let prefix = if result.success { "" } else { "! " };
                    let output = format!("{}{}\n", prefix, result.message);
                    if let Err(e) = stdout.write_all(output.as_bytes()).await {
                        error!("Failed to write output: {}", e);
                        break;
                    }
                    let _ = stdout.flush().await;
                }
            }
            _ = autosave.tick() => {
                game.request_save();
            }
        }
    }

    info!("Input closed, saving players...");
    game.request_save();
    persistence.shutdown().await;
    info!("Server stopped");
}
