//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{AnalysisConfig, Calibratable, EventKind};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    segmentation: SegmentationInfo,
    aeb: AebInfo,
    fcw: FcwInfo,
    round_decimals: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    calibrations: Vec<CalibrationInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    schema: Vec<ColumnInfo>,
}

#[derive(Serialize)]
struct SegmentationInfo {
    aeb_policy: String,
    aeb_padding_s: (f64, f64),
    fcw_padding_s: (f64, f64),
    fcw_merge_window_s: f64,
}

#[derive(Serialize)]
struct AebInfo {
    pb_tgt_decel: f64,
    fb_tgt_decel: f64,
    end_policy: String,
    onset_method: String,
    pb_truncate_at_fb: bool,
}

#[derive(Serialize)]
struct FcwInfo {
    jerk_threshold_mode: String,
    speed_band_kph: (f64, f64),
    ttc_max_s: f64,
}

#[derive(Serialize)]
struct CalibrationInfo {
    name: String,
    points: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

#[derive(Serialize)]
struct ColumnInfo {
    name: String,
    display_name: String,
    ty: String,
    feature: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)?;

    if args.json {
        let info = build_config_info(&config, args)?;
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args)?;
    }

    Ok(())
}

fn build_config_info(config: &AnalysisConfig, args: &InfoArgs) -> Result<ConfigInfo> {
    let p = &config.params;

    let calibrations = if args.calibration {
        config
            .calibration
            .iter()
            .map(|(name, table)| CalibrationInfo {
                name: name.clone(),
                points: table.x.len(),
                x_range: range(&table.x),
                y_range: range(&table.y),
            })
            .collect()
    } else {
        Vec::new()
    };

    let schema = if args.schema {
        config
            .schema()
            .context("Invalid KPI schema")?
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                display_name: c.display_name(),
                ty: format!("{:?}", c.ty),
                feature: format!("{:?}", c.feature),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(ConfigInfo {
        version: format!("{:?}", config.version),
        segmentation: SegmentationInfo {
            aeb_policy: format!("{:?}", p.segmentation.aeb_policy),
            aeb_padding_s: (p.segmentation.aeb_pre_time, p.segmentation.aeb_post_time),
            fcw_padding_s: (p.segmentation.fcw_pre_time, p.segmentation.fcw_post_time),
            fcw_merge_window_s: p.segmentation.fcw_merge_window,
        },
        aeb: AebInfo {
            pb_tgt_decel: p.aeb.pb_tgt_decel,
            fb_tgt_decel: p.aeb.fb_tgt_decel,
            end_policy: format!("{:?}", p.aeb.end_policy),
            onset_method: format!("{:?}", p.aeb.onset_method),
            pb_truncate_at_fb: p.aeb.pb_truncate_at_fb,
        },
        fcw: FcwInfo {
            jerk_threshold_mode: format!("{:?}", p.fcw.jerk_threshold_mode),
            speed_band_kph: (p.fcw.brakejerk_min_speed, p.fcw.brakejerk_max_speed),
            ttc_max_s: p.fcw.ttc_max,
        },
        round_decimals: p.round_decimals,
        calibrations,
        schema,
    })
}

fn range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

fn print_config_info(config: &AnalysisConfig, args: &InfoArgs) -> Result<()> {
    let p = &config.params;

    println!("=== KPI Extractor Configuration ===\n");
    println!("Version: {:?}", config.version);

    println!("\nSegmentation");
    println!("   ├─ AEB policy: {:?}", p.segmentation.aeb_policy);
    println!(
        "   ├─ AEB padding: {} s / {} s",
        p.segmentation.aeb_pre_time, p.segmentation.aeb_post_time
    );
    println!(
        "   ├─ FCW padding: {} s / {} s",
        p.segmentation.fcw_pre_time, p.segmentation.fcw_post_time
    );
    println!("   └─ FCW merge window: {} s", p.segmentation.fcw_merge_window);

    println!("\nAEB");
    println!("   ├─ PB / FB target: {} / {} m/s²", p.aeb.pb_tgt_decel, p.aeb.fb_tgt_decel);
    println!("   ├─ End policy: {:?}", p.aeb.end_policy);
    println!("   ├─ Onset method: {:?}", p.aeb.onset_method);
    println!("   └─ Truncate PB at FB: {}", p.aeb.pb_truncate_at_fb);

    println!("\nFCW");
    println!("   ├─ Jerk threshold: {:?}", p.fcw.jerk_threshold_mode);
    println!("   ├─ Speed band: {} - {} kph", p.fcw.brakejerk_min_speed, p.fcw.brakejerk_max_speed);
    println!("   └─ TTC max: {} s", p.fcw.ttc_max);

    println!("\nCalibrations ({})", config.calibration.len());
    if args.calibration {
        for cal in Calibratable::ALL {
            match config.calibration.get(cal) {
                Some(table) => println!(
                    "   ├─ {}: {} points, x {:?}",
                    cal.key(),
                    table.x.len(),
                    range(&table.x)
                ),
                None => println!("   ├─ {}: (missing)", cal.key()),
            }
        }
    }

    if args.schema {
        let schema = config.schema().context("Invalid KPI schema")?;
        for kind in EventKind::ALL {
            let columns = schema.for_kind(kind);
            println!("\n{} KPI columns ({})", kind, columns.len());
            for column in columns.columns() {
                println!("   ├─ {} ({:?})", column.display_name(), column.ty);
            }
        }
    }

    println!();
    Ok(())
}
