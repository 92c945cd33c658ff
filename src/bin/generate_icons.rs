use anyhow::{anyhow, Context};
use fallback_png::{
    icons::{Capability, IconSet, RendererChoice, SolidFill, STANDARD_SIZES, VUE_GREEN},
    Rgb,
};
use log::info;
use std::{fs, path::PathBuf};

/// Usage: generate-icons [-v] [--color RRGGBB] [OUTPUT_DIR]
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let mut verbosity = log::LevelFilter::Error;
    let mut color = VUE_GREEN;
    let mut output_dir = PathBuf::from("public/icons");
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => verbosity = log::LevelFilter::Info,
            "--color" => {
                let hex = args.next().context("--color needs a value")?;
                color = Rgb::from_hex(&hex).ok_or_else(|| anyhow!("invalid color {hex:?}"))?;
            }
            _ => output_dir = PathBuf::from(arg),
        }
    }
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    // No drawing backend ships with this tool.
    let renderer = RendererChoice {
        capability: Capability::FallbackOnly,
        rich: None,
        fallback: &SolidFill { color },
    };
    let set = IconSet::generate(&renderer, &STANDARD_SIZES)?;

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    for icon in &set.icons {
        let path = output_dir.join(icon.file_name());
        fs::write(&path, &icon.png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("wrote {} ({} bytes)", path.display(), icon.png.len());
    }

    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;
    let manifest = serde_json::json!({
        "generated": now,
        "icons": set.manifest("icons"),
    });
    let manifest_path = output_dir.join("icons.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    info!("wrote {}", manifest_path.display());
    Ok(())
}
