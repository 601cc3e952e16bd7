use std::sync::Arc;

use framesync::{
    Affine, Canvas, FrameBuilder, Fps, ManualClock, MovieBuilder, PlaybackDriver, PlaybackOpts,
    SceneBuilder, SimulatedAudio, sound_definition, start_sound,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let movie = MovieBuilder::new(
        Fps::new(12, 1)?,
        Canvas {
            width: 550,
            height: 400,
        },
    )
    .sound("theme", sound_definition("theme.mp3", 44_100))?
    .sound("pop", sound_definition("pop.wav", 22_050))?
    .scene(
        SceneBuilder::new()
            .name("intro")
            .frame(
                FrameBuilder::new()
                    .place(1, 1, Affine::IDENTITY)
                    .stream("theme", 0)
                    .build(),
            )
            .blank_frames(11)
            .build(),
    )
    .scene(
        SceneBuilder::new()
            .name("credits")
            .frame(FrameBuilder::new().event(start_sound(0.0, "pop")).build())
            .blank_frames(5)
            .build(),
    )
    .build()?;

    let clock = ManualClock::new();
    let audio = SimulatedAudio::new();
    let mut driver = PlaybackDriver::new(Arc::new(movie), PlaybackOpts::default())
        .with_time_source(Box::new(clock.clone()))
        .with_audio_output(Box::new(audio.clone()));
    driver.on_did_display(|n| {
        println!("frame {} ({})", n.position, n.scene.name().unwrap_or("-"));
    });

    driver.play();
    while !driver.is_finished() {
        clock.advance(1.0 / 60.0);
        audio.advance_secs(1.0 / 60.0);
        driver.tick();
    }
    for command in audio.commands() {
        println!("{}", serde_json::to_string(&command)?);
    }
    Ok(())
}
