//! CLI for BlendViz - compose a new image from one to three input images.

use blendviz::{default_output_path, Composer, Config, InputSet, Stage, Strategy};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blendviz")]
#[command(about = "Compose a new image from 1-3 input images via Gemini and Imagen")]
#[command(version)]
#[command(after_help = "Example: blendviz avatar.png shirt.jpg pants.jpg")]
struct Cli {
    /// Input images (one to three; .png, .jpg, .jpeg or .webp)
    #[arg(required = true, num_args = 1..=3, value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// Output file path (default: generated_result.png, or generated_style.<ext> in direct mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Composition strategy
    #[arg(short, long, value_enum, default_value = "two-step")]
    mode: ModeArg,

    /// Replace the describe instruction sent with the images (two-step only)
    #[arg(long)]
    instruction: Option<String>,

    /// Replace the composition prompt sent with the images (direct only)
    #[arg(long)]
    prompt: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Describe with Gemini, then render with Imagen
    TwoStep,
    /// Single call to an image-output Gemini model
    Direct,
}

impl From<ModeArg> for Strategy {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::TwoStep => Strategy::TwoStep,
            ModeArg::Direct => Strategy::Direct,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    compose(cli).await
}

fn validate_args(cli: &Cli) -> anyhow::Result<()> {
    match cli.mode {
        ModeArg::TwoStep => {
            if cli.prompt.is_some() {
                anyhow::bail!("--prompt only applies to --mode direct (use --instruction)");
            }
        }
        ModeArg::Direct => {
            if cli.instruction.is_some() {
                anyhow::bail!("--instruction only applies to --mode two-step (use --prompt)");
            }
        }
    }
    Ok(())
}

fn build_composer(config: &Config, cli: &Cli) -> anyhow::Result<Composer> {
    let mut composer = match Strategy::from(cli.mode) {
        Strategy::TwoStep => {
            Composer::two_step(Box::new(config.describer()?), Box::new(config.imagen()?))
        }
        Strategy::Direct => Composer::direct(Box::new(config.gemini_image()?)),
    };
    if let Some(text) = &cli.instruction {
        composer = composer.with_instruction(text);
    }
    if let Some(text) = &cli.prompt {
        composer = composer.with_prompt(text);
    }
    Ok(composer)
}

/// Loads the inputs, then the configuration, so a bad path is reported
/// before a missing key.
fn prepare(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<(InputSet, Config)> {
    validate_args(cli)?;
    let inputs = InputSet::load(cli.images.as_slice())?;
    let config = Config::from_lookup(lookup)?;
    Ok((inputs, config))
}

async fn compose(cli: Cli) -> anyhow::Result<()> {
    let (inputs, config) = prepare(&cli, |name| std::env::var(name).ok())?;
    let composer = build_composer(&config, &cli)?;
    let strategy = composer.strategy();
    let quiet = cli.json;

    let result = composer
        .compose_with_progress(&inputs, |stage| {
            if !quiet {
                print_stage(strategy, &stage);
            }
        })
        .await?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(strategy, result.image.format));
    result.image.save(&output)?;
    tracing::debug!(path = %output.display(), bytes = result.image.size(), "saved image");

    if cli.json {
        let summary = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": result.image.size(),
            "format": result.image.format.extension(),
            "provider": result.image.provider.to_string(),
            "model": result.image.metadata.model,
            "prompt": result.prompt,
            "duration_ms": result.image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Image generated and saved to {} ({} bytes) via {}",
            output.display(),
            result.image.size(),
            result.image.provider
        );
    }

    Ok(())
}

fn print_stage(strategy: Strategy, stage: &Stage) {
    match (strategy, stage) {
        (Strategy::TwoStep, Stage::Describing { model }) => {
            println!("[1/3] Sending images to {model} for prompt generation...");
        }
        (_, Stage::Prompt(prompt)) => {
            println!("[2/3] Generated prompt:");
            println!("{prompt}");
        }
        (Strategy::TwoStep, Stage::Generating { provider }) => {
            println!("[3/3] Sending prompt to {provider} for image generation...");
        }
        (Strategy::Direct, Stage::Generating { provider }) => {
            println!("Sending images and prompt to {provider}. This may take a moment...");
        }
        (Strategy::Direct, Stage::Describing { .. }) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blendviz::BlendError;
    use clap::error::ErrorKind;
    use std::ffi::OsStr;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_no_images_is_a_usage_error() {
        let err = Cli::try_parse_from(["blendviz"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("Usage:"));
    }

    #[test]
    fn test_four_images_is_a_usage_error() {
        let err = Cli::try_parse_from(["blendviz", "a.png", "b.png", "c.png", "d.png"])
            .unwrap_err();
        assert!(err.to_string().contains("Usage:"));
    }

    #[test]
    fn test_one_to_three_images_parse() {
        for n in 1..=3 {
            let mut args = vec!["blendviz".to_string()];
            args.extend((0..n).map(|i| format!("img{i}.jpg")));
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.images.len(), n);
            assert_eq!(cli.mode, ModeArg::TwoStep);
        }
    }

    #[test]
    fn test_flags_after_images() {
        let cli = Cli::try_parse_from([
            "blendviz",
            "avatar.png",
            "shirt.jpg",
            "--mode",
            "direct",
            "-o",
            "out.png",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.images.len(), 2);
        assert_eq!(cli.mode, ModeArg::Direct);
        assert_eq!(cli.output, Some(PathBuf::from("out.png")));
        assert!(cli.json);
    }

    #[test]
    fn test_prompt_flag() {
        let cli =
            Cli::try_parse_from(["blendviz", "a.png", "--mode", "direct", "--prompt", "x"])
                .unwrap();
        assert_eq!(cli.prompt.as_deref(), Some("x"));
        assert!(validate_args(&cli).is_ok());

        let cli = Cli::try_parse_from(["blendviz", "a.png", "--instruction", "y"]).unwrap();
        assert_eq!(cli.instruction.as_deref(), Some("y"));
        assert!(validate_args(&cli).is_ok());
    }

    #[test]
    fn test_flag_mode_mismatch() {
        let cli = Cli::try_parse_from(["blendviz", "a.png", "--prompt", "x"]).unwrap();
        assert!(validate_args(&cli).is_err());

        let cli =
            Cli::try_parse_from(["blendviz", "a.png", "--mode", "direct", "--instruction", "y"])
                .unwrap();
        assert!(validate_args(&cli).is_err());
    }

    #[test]
    fn test_missing_input_reported_before_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("new_clothing.jpg");
        let cli = Cli::try_parse_from([OsStr::new("blendviz"), missing.as_os_str()]).unwrap();

        let err = prepare(&cli, no_env).unwrap_err();
        match err.downcast_ref::<BlendError>() {
            Some(BlendError::MissingInput(path)) => assert_eq!(path, &missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_key_after_inputs_load() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("avatar.png");
        std::fs::write(&present, b"png").unwrap();
        let cli = Cli::try_parse_from([OsStr::new("blendviz"), present.as_os_str()]).unwrap();

        let err = prepare(&cli, no_env).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlendError>(),
            Some(BlendError::Auth(_))
        ));

        let (inputs, config) = prepare(&cli, |name| {
            (name == "GOOGLE_API_KEY").then(|| "k".to_string())
        })
        .unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(config.api_key, "k");
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
