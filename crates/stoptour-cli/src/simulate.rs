use std::path::Path;

use stoptour_core::{
    load_page, AppConfig, AudioCue, AudioTrack, ChannelLocationSource, Coordinate, EnterEvent,
    SessionOutcome,
};
use tokio::sync::oneshot;

/// Stands in for the audio player by printing what it would play.
struct ConsoleCue;

impl AudioCue for ConsoleCue {
    fn play(&self, track: &AudioTrack, event: &EnterEvent) {
        println!(
            "sample {}: inside ({:.1} m from center), playing '{}' <{}>",
            event.sample_number, event.distance_meters, track.title, track.url
        );
    }
}

/// Feed `samples` in order to a fresh geofence session for the page at
/// `path`. Ctrl-C ends the session as if the page were closed.
///
/// # Errors
///
/// Returns an error if the page cannot be loaded or has no audio file.
pub(crate) async fn run_simulate(
    config: &AppConfig,
    path: &Path,
    samples: &[Coordinate],
) -> anyhow::Result<()> {
    let Some((first, rest)) = samples.split_first() else {
        anyhow::bail!("at least one position sample is required");
    };
    let page = load_page(path)?;
    let fence = page.geofence();
    let session = page
        .start_session()
        .ok_or_else(|| anyhow::anyhow!("page '{}' has no audio file to trigger", page.title))?;

    for (i, sample) in samples.iter().enumerate() {
        println!(
            "sample {}: ({}, {}) is {:.1} m from center (radius {} m)",
            i + 1,
            sample.latitude,
            sample.longitude,
            fence.distance_from_center(sample),
            fence.radius_meters
        );
    }

    let (mut source, feed) = ChannelLocationSource::new(config.location_buffer);
    let (close_tx, close_rx) = oneshot::channel();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = close_tx.send(());
        }
    });

    // `join!` polls the session first, so it has subscribed before the
    // first push. A failed push means the session is already over.
    let producer = async {
        if feed.push(*first).await {
            for sample in rest {
                if !feed.push(*sample).await {
                    break;
                }
            }
        }
        feed.close();
    };

    let (outcome, ()) = tokio::join!(session.run(&mut source, &ConsoleCue, close_rx), producer);

    match outcome {
        SessionOutcome::Triggered {
            event,
            triggered_at,
        } => println!(
            "triggered once on sample {} at {}",
            event.sample_number,
            triggered_at.to_rfc3339()
        ),
        SessionOutcome::SourceEnded { last_position } => println!(
            "never entered the geofence; last position {}",
            describe(last_position)
        ),
        SessionOutcome::Closed { last_position } => println!(
            "interrupted before arrival; last position {}",
            describe(last_position)
        ),
    }
    Ok(())
}

fn describe(position: Option<Coordinate>) -> String {
    position.map_or_else(
        || "unknown".to_string(),
        |p| format!("({}, {})", p.latitude, p.longitude),
    )
}
