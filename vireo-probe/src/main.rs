//! # vireo probe
//!
//! Prints the loaded engine's version strings and enumerates the audio and
//! video filter modules it was built with.
//!
//! ## Usage
//! ```bash
//! # Human-readable listing
//! vireo-probe
//!
//! # JSON snapshot
//! vireo-probe --json
//!
//! # Point the engine at its plugin directory, pass engine arguments
//! vireo-probe --plugin-path /usr/lib/vlc/plugins -- --no-audio
//! ```

use anyhow::{bail, Result};
use vireo_core::{set_plugin_search_path, Instance, LogLevel};

#[derive(Debug, Default)]
struct ProbeOptions {
    json: bool,
    plugin_path: Option<String>,
    engine_args: Vec<String>,
}

impl ProbeOptions {
    fn from_args(args: &[String]) -> Result<Self> {
        let mut options = ProbeOptions::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--json" => options.json = true,
                "--plugin-path" => match iter.next() {
                    Some(path) => options.plugin_path = Some(path.clone()),
                    None => bail!("--plugin-path needs a directory argument"),
                },
                "--" => {
                    options.engine_args = iter.cloned().collect();
                    break;
                }
                other => bail!("unknown argument: {}", other),
            }
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("vireo=info")
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = ProbeOptions::from_args(&args)?;
    tracing::debug!("options: {:?}", options);

    if let Some(path) = &options.plugin_path {
        tracing::info!("plugin search path: {}", path);
        set_plugin_search_path(path);
    }

    let version = Instance::version();
    let compiler = Instance::compiler();
    let changeset = Instance::changeset();

    let engine_args: Vec<&str> = options.engine_args.iter().map(String::as_str).collect();
    let Some(instance) = Instance::new(&engine_args) else {
        bail!(
            "engine instance construction declined - is the VLC engine \
             installed, and does it accept the given arguments?"
        );
    };
    instance.enable_logging(LogLevel::Warning);

    let audio = instance.audio_filters();
    let video = instance.video_filters();

    if options.json {
        let snapshot = serde_json::json!({
            "engine": {
                "version": version,
                "compiler": compiler,
                "changeset": changeset,
            },
            "audio_filters": audio,
            "video_filters": video,
        });
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("engine version : {}", version.as_deref().unwrap_or("unknown"));
    println!("compiler       : {}", compiler.as_deref().unwrap_or("unknown"));
    println!("changeset      : {}", changeset.as_deref().unwrap_or("unknown"));

    println!("\naudio filters ({}):", audio.len());
    for filter in &audio {
        println!("  {}", filter);
    }
    println!("\nvideo filters ({}):", video.len());
    for filter in &video {
        println!("  {}", filter);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("vireo-probe")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_default_options() {
        let options = ProbeOptions::from_args(&args(&[])).unwrap();
        assert!(!options.json);
        assert_eq!(options.plugin_path, None);
        assert!(options.engine_args.is_empty());
    }

    #[test]
    fn test_full_argument_set() {
        let options = ProbeOptions::from_args(&args(&[
            "--json",
            "--plugin-path",
            "/opt/vlc/plugins",
            "--",
            "--no-audio",
            "--no-xlib",
        ]))
        .unwrap();
        assert!(options.json);
        assert_eq!(options.plugin_path.as_deref(), Some("/opt/vlc/plugins"));
        assert_eq!(options.engine_args, vec!["--no-audio", "--no-xlib"]);
    }

    #[test]
    fn test_unknown_argument_rejected() {
        assert!(ProbeOptions::from_args(&args(&["--frobnicate"])).is_err());
        assert!(ProbeOptions::from_args(&args(&["--plugin-path"])).is_err());
    }
}
