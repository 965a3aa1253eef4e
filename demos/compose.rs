//! Two-step composition example.
//!
//! Run with: `cargo run --example compose -- avatar.png shirt.jpg pants.jpg`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use blendviz::{Composer, Config, InputSet};

#[tokio::main]
async fn main() -> blendviz::Result<()> {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    let inputs = InputSet::load(paths.as_slice())?;

    let config = Config::from_env()?;
    let composer = Composer::two_step(Box::new(config.describer()?), Box::new(config.imagen()?));

    let result = composer.compose(&inputs).await?;
    if let Some(prompt) = &result.prompt {
        println!("Prompt: {prompt}");
    }
    result.image.save("generated_result.png")?;
    println!(
        "Composite saved to generated_result.png ({} bytes)",
        result.image.size()
    );

    Ok(())
}
