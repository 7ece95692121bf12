/// Command-line configuration for the terminal viewer.
use std::path::PathBuf;

use anyhow::{bail, Context};

pub const USAGE: &str = "\
Usage: sr3d-terminal [options]

Options:
  --model <file.obj>   Load an OBJ model (repeatable, replaces the built-in scene)
  --fov <degrees>      Vertical field of view (default 55)
  --near <distance>    Near clip distance (default 0.1)
  --far <distance>     Far clip distance (default 100)
  --fps <rate>         Target frame rate (default 30)
  --log-file <path>    Write logs to a file (RUST_LOG selects the level)
  --no-spin            Start with the models standing still
  --help               Show this message";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub models: Vec<PathBuf>,
    pub fov_degrees: f32,
    pub near_z: f32,
    pub far_z: f32,
    pub fps: u32,
    pub log_file: Option<PathBuf>,
    pub spin: bool,
    pub show_help: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            fov_degrees: 55.0,
            near_z: 0.1,
            far_z: 100.0,
            fps: 30,
            log_file: None,
            spin: true,
            show_help: false,
        }
    }
}

impl AppConfig {
    /// Parse arguments, not including the program name.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cfg = AppConfig::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = || args.next().with_context(|| format!("{arg} needs a value"));

            match arg.as_str() {
                "--model" => cfg.models.push(PathBuf::from(value()?)),
                "--fov" => cfg.fov_degrees = parse_number(&arg, &value()?)?,
                "--near" => cfg.near_z = parse_number(&arg, &value()?)?,
                "--far" => cfg.far_z = parse_number(&arg, &value()?)?,
                "--fps" => cfg.fps = parse_number(&arg, &value()?)?,
                "--log-file" => cfg.log_file = Some(PathBuf::from(value()?)),
                "--no-spin" => cfg.spin = false,
                "--help" | "-h" => cfg.show_help = true,
                other => bail!("unknown argument {other:?}\n\n{}", USAGE),
            }
        }

        if cfg.fps == 0 {
            bail!("--fps must be positive");
        }
        Ok(cfg)
    }
}

fn parse_number<T>(flag: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value {value:?} for {flag}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<AppConfig> {
        AppConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_all_options() {
        let cfg = parse(&[
            "--model", "a.obj", "--model", "b.obj", "--fov", "70", "--near", "0.5", "--far", "50",
            "--fps", "60", "--log-file", "sr3d.log", "--no-spin",
        ])
        .unwrap();

        assert_eq!(cfg.models, vec![PathBuf::from("a.obj"), PathBuf::from("b.obj")]);
        assert_eq!(cfg.fov_degrees, 70.0);
        assert_eq!((cfg.near_z, cfg.far_z), (0.5, 50.0));
        assert_eq!(cfg.fps, 60);
        assert_eq!(cfg.log_file, Some(PathBuf::from("sr3d.log")));
        assert!(!cfg.spin);
    }

    #[test]
    fn test_errors() {
        assert!(parse(&["--fov"]).is_err());
        assert!(parse(&["--fov", "wide"]).is_err());
        assert!(parse(&["--fps", "0"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--help"]).unwrap().show_help);
    }
}
