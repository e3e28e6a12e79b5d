//! # FlippyFlop Headless
//!
//! Runs the full client against a simulated entity source with an
//! in-memory backend. No window, no GPU.
//!
//! ```bash
//! LOG_LEVEL=debug flippyflop_headless [config.toml]
//! ```

use std::time::Instant;

use alloy_primitives::Address;
use flippyflop::chain::{SimulatedSource, User};
use flippyflop::rendering::HeadlessBackend;
use flippyflop::shared::{Team, Tile, Vec3};
use flippyflop::{init_telemetry, ClientResult, FlipClient, GameConfig, SimulatedFlipper};

const FRAMES: u32 = 600;
const DT: f32 = 1.0 / 60.0;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ClientResult<()> {
    init_telemetry(true);

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let dims = config.dims()?;

    // A few rival tiles so the board isn't blank.
    let rival = Address::repeat_byte(0x22);
    let source = SimulatedSource::with_tiles((0..dims.world_size()).step_by(7).map(|i| {
        Tile::unowned(i, (i * 3) % dims.world_size()).flipped_to(rival, Team(1))
    }));
    let player = Address::repeat_byte(0xAB);
    source.publish_user(&User { address: player, team: Team(0), name: "headless".to_string() });

    let mut client = FlipClient::connect(&source, config, HeadlessBackend::new(), Some(player)).await?;
    let mut flipper = SimulatedFlipper::new(source.clone(), player, Team(0));

    let started = Instant::now();
    for frame in 0..FRAMES {
        // Pan slowly east and click the tile under the camera every 20 frames.
        let x = frame as f32 * 0.1;
        client.set_camera(Vec3::new(x, 15.0, 5.5));
        if frame % 20 == 0 {
            client.set_pointer(Some((x, 5.5)));
            client.click(x, 5.5, &mut flipper)?;
        }
        if frame % 90 == 45 {
            let tile = Tile::unowned((frame / 3) % dims.world_size(), 4).flipped_to(rival, Team(1));
            source.publish_tile(tile);
        }

        client.frame(DT)?;

        for indicator in client.take_score_indicators() {
            tracing::info!("+{} at {}", indicator.points, indicator.key);
        }
        for notification in client.take_notifications() {
            tracing::warn!("{:?}", notification);
        }
    }

    client.unsubscribe();
    let stats = client.stats();
    let chunks = client.chunks().stats();
    tracing::info!(
        "{} frames in {:.2?}: {} flips requested, {} flips animated, {} chunks active, {} uploads ({} KiB)",
        stats.frames,
        started.elapsed(),
        flipper.submitted(),
        chunks.flips,
        chunks.active_chunks,
        client.backend().uploads(),
        client.backend().bytes_uploaded() / 1024
    );
    tracing::debug!("owned tiles: {}", client.state().tiles().owned_count());
    Ok(())
}
