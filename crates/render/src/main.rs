//! Render a patient chart to an SVG preview of both arches.
//!
//! ```text
//! render_chart [--chart chart.json] [--config scene.json] [--select N]
//!              [--frames N] [--out arch.svg] [--obj arch.obj]
//! ```

mod svg;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arch_kernel::TriangleMesh;
use chart_types::{Chart, ChartError, ToothNumber};
use dental_chart::{ArchScene, DrawEntry, DrawKind, SceneConfig, SceneError};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum RenderError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("bad argument: {0}")]
    Usage(String),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[derive(Debug)]
struct Args {
    chart: Option<PathBuf>,
    config: Option<PathBuf>,
    select: Option<ToothNumber>,
    frames: u32,
    out: PathBuf,
    obj: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, RenderError> {
    let mut parsed = Args {
        chart: None,
        config: None,
        select: None,
        frames: 30,
        out: PathBuf::from("arch.svg"),
        obj: None,
    };
    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| RenderError::Usage(format!("{flag} needs a value")))
        };
        match flag.as_str() {
            "--chart" => parsed.chart = Some(value()?.into()),
            "--config" => parsed.config = Some(value()?.into()),
            "--out" => parsed.out = value()?.into(),
            "--obj" => parsed.obj = Some(value()?.into()),
            "--select" => {
                let raw = value()?;
                parsed.select = Some(ToothNumber::parse_key(&raw)?);
            }
            "--frames" => {
                let raw = value()?;
                parsed.frames = raw
                    .parse()
                    .map_err(|_| RenderError::Usage(format!("--frames expects a count, got {raw}")))?;
            }
            other => return Err(RenderError::Usage(format!("unknown argument {other}"))),
        }
    }
    Ok(parsed)
}

fn read(path: &Path) -> Result<String, RenderError> {
    fs::read_to_string(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), RenderError> {
    fs::write(path, contents).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// One OBJ object per draw entry, baked into world space.
fn draw_list_to_obj(entries: &[DrawEntry]) -> String {
    let mut out = String::new();
    let mut world = TriangleMesh::new();
    for (i, entry) in entries.iter().enumerate() {
        let name = match (entry.kind, entry.tooth) {
            (DrawKind::Gum { arch }, _) => format!("gum_{arch:?}").to_lowercase(),
            (DrawKind::ToothBody, Some(t)) => format!("tooth_{t}"),
            (DrawKind::Cusp { index }, Some(t)) => format!("tooth_{t}_cusp_{index}"),
            (DrawKind::Marker { surface }, Some(t)) => format!("tooth_{t}_marker_{surface:?}").to_lowercase(),
            _ => format!("entry_{i}"),
        };
        let mesh = entry.geometry.mesh.transformed(&entry.transform.matrix());
        let base = world.vertex_count() as u32;
        world.merge(&mesh);
        let _ = writeln!(out, "o {name}");
        for t in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (base + t[0] + 1, base + t[1] + 1, base + t[2] + 1);
            let _ = writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}");
        }
    }
    let mut vertices = String::new();
    for p in world.positions.chunks_exact(3) {
        let _ = writeln!(vertices, "v {} {} {}", p[0], p[1], p[2]);
    }
    for n in world.normals.chunks_exact(3) {
        let _ = writeln!(vertices, "vn {} {} {}", n[0], n[1], n[2]);
    }
    vertices + &out
}

fn run(args: Args) -> Result<(), RenderError> {
    let config = match &args.config {
        Some(path) => SceneConfig::from_json(&read(path)?)?,
        None => SceneConfig::default(),
    };
    let chart = match &args.chart {
        Some(path) => Chart::from_json(&read(path)?)?,
        None => Chart::new(),
    };

    let mut scene = ArchScene::new(config)?;
    scene.load_chart(chart, args.select)?;
    let fps = scene.config().animation.reference_fps;
    for _ in 0..args.frames {
        scene.advance(1.0 / fps);
    }

    let stats = scene.stats();
    let summary = scene.summary();
    info!(
        entries = stats.draw_entries,
        markers = stats.markers,
        animating = stats.animating,
        treatments = summary.treatments,
        "scene assembled"
    );

    let list = scene.draw_list();
    let title = match args.select {
        Some(t) => format!("Dental chart (tooth {t} selected)"),
        None => "Dental chart".to_string(),
    };
    write(&args.out, &svg::draw_list_to_svg(&list, 1000.0, 700.0, &title))?;
    info!(path = %args.out.display(), "wrote svg preview");

    if let Some(path) = &args.obj {
        write(path, &draw_list_to_obj(&list))?;
        info!(path = %path.display(), "wrote obj");
    }

    for (condition, count) in &summary.conditions {
        println!("  {:<12} {count}", condition.name());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "render_chart=info,dental_chart=info".into()),
        )
        .init();

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dental_chart::build_scene;

    fn args(list: &[&str]) -> Result<Args, RenderError> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.frames, 30);
        assert_eq!(parsed.out, PathBuf::from("arch.svg"));
        assert!(parsed.chart.is_none());
    }

    #[test]
    fn test_flags() {
        let parsed = args(&["--chart", "c.json", "--select", "14", "--frames", "5", "--obj", "a.obj"]).unwrap();
        assert_eq!(parsed.chart, Some(PathBuf::from("c.json")));
        assert_eq!(parsed.select.map(|t| t.get()), Some(14));
        assert_eq!(parsed.frames, 5);
        assert_eq!(parsed.obj, Some(PathBuf::from("a.obj")));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(args(&["--select", "40"]), Err(RenderError::Chart(_))));
        assert!(matches!(args(&["--frames", "many"]), Err(RenderError::Usage(_))));
        assert!(matches!(args(&["--out"]), Err(RenderError::Usage(_))));
        assert!(matches!(args(&["--verbose"]), Err(RenderError::Usage(_))));
    }

    #[test]
    fn test_obj_has_object_per_entry() {
        let list = build_scene(Chart::new(), None, SceneConfig::low_detail()).unwrap();
        let obj = draw_list_to_obj(&list);
        assert_eq!(obj.matches("\no ").count() + usize::from(obj.starts_with("o ")), list.len());
        assert!(obj.contains("o tooth_1\n"));
        assert!(obj.contains("o gum_upper\n"));
        let vertices: usize = list.iter().map(|e| e.geometry.mesh.vertex_count()).sum();
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), vertices);
    }
}
