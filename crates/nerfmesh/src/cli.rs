//! Command-line interfaces for the `extract-mesh` and `remove-background` binaries.

use std::path::PathBuf;

use clap::Parser;
use nerfmesh_core::{BoundingBox, Error, ExtractionConfig, Result};
use nerfmesh_segment::{RemovalOptions, COCO_CHAIR, DEFAULT_SCORE_THRESHOLD};

/// Extract a triangle mesh from a radiance-field checkpoint
#[derive(Parser, Debug)]
#[command(name = "extract-mesh", version, about)]
pub struct ExtractArgs {
    /// JSON configuration file; flags below override its fields
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Field checkpoint (JSON blob list)
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<PathBuf>,

    /// Scene name; the mesh is written to <SCENE>.dae
    #[arg(long, value_name = "SCENE")]
    pub scene_name: Option<String>,

    /// Nodes per axis of the sampling lattice
    #[arg(short = 'n', long, value_name = "N")]
    pub resolution: Option<u32>,

    /// Density level of the extracted surface
    #[arg(short, long, value_name = "SIGMA")]
    pub threshold: Option<f32>,

    /// Maximum points per model call
    #[arg(long, value_name = "COUNT")]
    pub chunk_size: Option<usize>,

    /// Sampled box as xmin,xmax,ymin,ymax,zmin,zmax
    #[arg(long, value_name = "RANGES", value_delimiter = ',', allow_hyphen_values = true)]
    pub bounds: Option<Vec<f32>>,

    /// Directory the mesh is written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose logging (can be repeated: -v, -vv)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ExtractArgs {
    /// Builds the run configuration: file (or defaults) first, then flags.
    pub fn to_config(&self) -> Result<ExtractionConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractionConfig::from_json_file(path)?,
            None => ExtractionConfig::default(),
        };
        if let Some(checkpoint) = &self.checkpoint {
            config.checkpoint.clone_from(checkpoint);
        }
        if let Some(name) = &self.scene_name {
            config.scene_name.clone_from(name);
        }
        if let Some(n) = self.resolution {
            config.resolution = n;
        }
        if let Some(t) = self.threshold {
            config.density_threshold = t;
        }
        if let Some(chunk) = self.chunk_size {
            config.chunk_size = chunk;
        }
        match self.bounds.as_deref() {
            None => {}
            Some(&[x0, x1, y0, y1, z0, z1]) => {
                config.bounds = BoundingBox::from_ranges((x0, x1), (y0, y1), (z0, z1));
            }
            Some(other) => {
                return Err(Error::invalid_config(format!(
                    "--bounds takes 6 values, got {}",
                    other.len()
                )));
            }
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        Ok(config)
    }
}

/// Cut the requested objects out of every image and place them on white
#[derive(Parser, Debug)]
#[command(name = "remove-background", version, about)]
pub struct RemoveArgs {
    /// COCO class id to keep; repeat to give fallbacks in order
    #[arg(
        long = "coco-class",
        alias = "coco_class",
        value_name = "ID",
        default_values_t = vec![COCO_CHAIR]
    )]
    pub coco_class: Vec<u32>,

    /// Output crop size (not used by the current pipeline)
    #[arg(short = 's', long, default_value_t = 256)]
    pub size: u32,

    /// Crop scale around the object (not used by the current pipeline)
    #[arg(short = 'S', long, default_value_t = 2.5)]
    pub scale: f32,

    /// Major-axis scale of the crop (not used by the current pipeline)
    #[arg(short = 'M', long, alias = "major_scale", default_value_t = 0.8)]
    pub major_scale: f32,

    /// Pad crops with a constant colour instead of replicating edges
    #[arg(long, alias = "const_border")]
    pub const_border: bool,

    /// Directory of source images
    #[arg(long, default_value = "input", value_name = "DIR")]
    pub input: PathBuf,

    /// Directory composited images are written to
    #[arg(long, default_value = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// Directory of precomputed mask manifests
    #[arg(long, default_value = "masks", value_name = "DIR")]
    pub masks: PathBuf,

    /// Minimum detection score
    #[arg(long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
    pub score_threshold: f32,

    /// Also write the selected masks to this directory
    #[arg(long, value_name = "DIR")]
    pub save_masks: Option<PathBuf>,

    /// Verbose logging (can be repeated: -v, -vv)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl RemoveArgs {
    pub fn removal_options(&self) -> RemovalOptions {
        RemovalOptions {
            classes: self.coco_class.clone(),
            score_threshold: self.score_threshold,
            save_masks: self.save_masks.clone(),
        }
    }

    /// Crop flags that were accepted but have no effect.
    pub fn ignored_flags(&self) -> Vec<String> {
        vec![
            format!("--size {}", self.size),
            format!("--scale {}", self.scale),
            format!("--major-scale {}", self.major_scale),
            format!("--const-border {}", self.const_border),
        ]
    }
}

/// Get the default log filter from verbosity
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initializes `env_logger`; `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: u8) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(get_log_level(verbose)),
    )
    .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerfmesh_core::Vec3;

    #[test]
    fn test_log_level() {
        assert_eq!(get_log_level(0), "info");
        assert_eq!(get_log_level(1), "debug");
        assert_eq!(get_log_level(2), "trace");
        assert_eq!(get_log_level(255), "trace");
    }

    #[test]
    fn test_extract_defaults() {
        let args = ExtractArgs::try_parse_from(["extract-mesh"]).unwrap();
        assert_eq!(args.to_config().unwrap(), ExtractionConfig::default());
    }

    #[test]
    fn test_extract_flags_override() {
        let args = ExtractArgs::try_parse_from([
            "extract-mesh",
            "-n",
            "64",
            "--threshold",
            "3.5",
            "--bounds",
            "-1,1,-2,2,-3,3",
            "--scene-name",
            "stool",
            "-vv",
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.resolution, 64);
        assert_eq!(config.density_threshold, 3.5);
        assert_eq!(config.bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(config.bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.output_path(), PathBuf::from("./stool.dae"));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_extract_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"resolution": 32, "chunk_size": 100}"#).unwrap();
        let args = ExtractArgs::try_parse_from([
            "extract-mesh",
            "--config",
            path.to_str().unwrap(),
            "--chunk-size",
            "7",
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.resolution, 32);
        assert_eq!(config.chunk_size, 7);
    }

    #[test]
    fn test_bounds_need_six_values() {
        let args = ExtractArgs::try_parse_from(["extract-mesh", "--bounds", "0,1,0,1"]).unwrap();
        assert!(matches!(args.to_config(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_remove_defaults() {
        let args = RemoveArgs::try_parse_from(["remove-background"]).unwrap();
        assert_eq!(args.coco_class, vec![COCO_CHAIR]);
        assert_eq!(args.size, 256);
        assert_eq!(args.scale, 2.5);
        assert_eq!(args.major_scale, 0.8);
        assert!(!args.const_border);
        assert_eq!(args.input, PathBuf::from("input"));
        assert_eq!(args.output, PathBuf::from("output"));
        let options = args.removal_options();
        assert_eq!(options.score_threshold, 0.5);
        assert!(options.save_masks.is_none());
    }

    #[test]
    fn test_remove_repeated_classes() {
        let args = RemoveArgs::try_parse_from([
            "remove-background",
            "--coco-class",
            "3",
            "--coco-class",
            "56",
            "-s",
            "128",
            "-S",
            "2.0",
            "-M",
            "0.5",
            "--const-border",
        ])
        .unwrap();
        assert_eq!(args.coco_class, vec![3, 56]);
        assert_eq!(args.size, 128);
        assert!(args.const_border);
        assert!(args.ignored_flags()[0].contains("128"));
    }

    #[test]
    fn test_remove_underscore_aliases() {
        let args = RemoveArgs::try_parse_from([
            "remove-background",
            "--coco_class",
            "2",
            "--coco-class",
            "56",
            "--major_scale",
            "1",
            "--const_border",
        ])
        .unwrap();
        assert_eq!(args.coco_class, vec![2, 56]);
        assert_eq!(args.major_scale, 1.0);
        assert!(args.const_border);
    }
}
