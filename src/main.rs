use anyhow::Context;
use clap::Parser;

use plomsound::audio;
use plomsound::audio_api::CancelToken;
use plomsound::cli::Args;
use plomsound::pipeline::{clock_seed, rng_from_seed, Composer};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("installing the interrupt handler")?;

    let mut output = audio::start_output(args.sink_target(), args.wav_path())
        .context("setting up audio output")?;

    let seed = args.seed.unwrap_or_else(clock_seed);
    log::info!("composing with the {} policy, seed {seed}", args.policy.label());
    let mut composer = Composer::new(args.policy, rng_from_seed(seed));

    let played = composer.run(&mut output, &cancel).context("composition loop")?;

    let done = output.finish().context("shutting down audio output")?;
    log::info!("stopped after {played} tones, {} bytes of pcm", done.pcm_written);
    Ok(())
}
