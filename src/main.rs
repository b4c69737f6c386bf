use log::{error, info, warn};
use std::env;
use std::process;
use std::time::Instant;
use tokio::io::{stdin, stdout, BufReader};

use overkill_bot::bot::Bot;
use overkill_bot::config::Config;
use overkill_bot::debug_logger::DebugLogger;
use overkill_bot::protocol::Connection;
use overkill_bot::session::Session;
use overkill_bot::topology::GridTopology;

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead. env_logger writes to stderr, stdout belongs to the game.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    if let Err(e) = run().await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    info!("Starting Halite bot...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    let mut connection = Connection::new(BufReader::new(stdin()), stdout());

    let init = connection.read_init().await?;
    info!(
        "GAME START: player {} on a {}x{} map",
        init.my_id, init.width, init.height
    );

    // The distance table is the one expensive step, it has to fit the init window
    let start_time = Instant::now();
    let (width, height) = (init.width, init.height);
    let topology = tokio::task::spawn_blocking(move || GridTopology::build(width, height))
        .await
        .map_err(|e| format!("Topology precompute failed: {}", e))?;
    let elapsed = start_time.elapsed().as_millis();
    if elapsed as u64 > config.timing.init_budget_ms {
        warn!(
            "Topology precompute took {}ms, over the {}ms init budget",
            elapsed, config.timing.init_budget_ms
        );
    } else {
        info!("Topology precomputed in {}ms", elapsed);
    }

    let debug_logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let bot = Bot::new(config);
    connection.send_init(bot.name()).await?;

    let mut session = Session::new(bot, topology, init.production, init.my_id, debug_logger);

    while let Some(frame) = connection.read_frame(width, height).await? {
        let moves = tokio::task::block_in_place(|| session.play_turn(&frame));
        connection.send_moves(&moves).await?;
    }

    // Drains the debug log before the runtime shuts down
    session.finish().await;
    Ok(())
}
