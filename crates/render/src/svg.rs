//! Flat-shaded SVG preview of a draw list.

use std::fmt::Write as _;

use arch_kernel::{Point3d, Vec3};
use dental_chart::{DrawEntry, Rgb};

/// Elevated front view: the arches are seen from in front of the mouth and
/// slightly above.
fn project(p: &Point3d) -> (f64, f64, f64) {
    let elevation: f64 = 0.45;
    let (s, c) = elevation.sin_cos();
    let y = p.y * c - p.z * s;
    let depth = p.y * s + p.z * c;
    (p.x, -y, depth)
}

struct Tri {
    points: [(f64, f64); 3],
    depth: f64,
    color: Rgb,
    opacity: f32,
}

fn shade(color: Rgb, emissive: Rgb, intensity: f32, brightness: f32) -> Rgb {
    Rgb {
        r: color.r * brightness + emissive.r * intensity,
        g: color.g * brightness + emissive.g * intensity,
        b: color.b * brightness + emissive.b * intensity,
    }
}

fn collect_triangles(entries: &[DrawEntry]) -> Vec<Tri> {
    let light = Vec3::new(0.3, 0.8, 0.5).normalize_or(Vec3::Y);
    let mut tris = Vec::new();
    for entry in entries {
        let world = entry.geometry.mesh.transformed(&entry.transform.matrix());
        let material = &entry.material;
        for t in world.indices.chunks_exact(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| world.position(i as usize));
            let normal = (b - a).cross(&(c - a)).normalize_or(Vec3::Y);
            let brightness = 0.35 + 0.65 * normal.dot(&light).max(0.0) as f32;
            let [pa, pb, pc] = [a, b, c].map(|p| project(&p));
            tris.push(Tri {
                points: [(pa.0, pa.1), (pb.0, pb.1), (pc.0, pc.1)],
                depth: (pa.2 + pb.2 + pc.2) / 3.0,
                color: shade(
                    material.color,
                    material.emissive,
                    material.emissive_intensity,
                    brightness,
                ),
                opacity: material.opacity,
            });
        }
    }
    // Painter's order: farthest first.
    tris.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    tris
}

/// Render the draw list as an SVG document of depth-sorted polygons.
pub fn draw_list_to_svg(entries: &[DrawEntry], width: f64, height: f64, title: &str) -> String {
    let tris = collect_triangles(entries);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" style=\"background:#1a1a2e\">\n\
         <text x=\"{}\" y=\"20\" font-family=\"monospace\" font-size=\"13\" fill=\"#8892b0\" text-anchor=\"middle\">{title}</text>\n",
        width / 2.0
    );
    if tris.is_empty() {
        svg.push_str("</svg>\n");
        return svg;
    }

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for &(x, y) in tris.iter().flat_map(|t| t.points.iter()) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let padding = 40.0;
    let avail_w = width - 2.0 * padding;
    let avail_h = height - 2.0 * padding - 25.0;
    let data_w = (max_x - min_x).max(0.001);
    let data_h = (max_y - min_y).max(0.001);
    let scale = (avail_w / data_w).min(avail_h / data_h);
    let offset_x = padding + (avail_w - data_w * scale) / 2.0;
    let offset_y = padding + 25.0 + (avail_h - data_h * scale) / 2.0;
    let to_screen = |(x, y): (f64, f64)| ((x - min_x) * scale + offset_x, (y - min_y) * scale + offset_y);

    for tri in &tris {
        let [(x0, y0), (x1, y1), (x2, y2)] = tri.points.map(to_screen);
        let fill = tri.color.to_css();
        let edge = tri.color.lerp(&Rgb::BLACK, 0.4).to_css();
        let _ = write!(
            svg,
            "  <polygon points=\"{x0:.1},{y0:.1} {x1:.1},{y1:.1} {x2:.1},{y2:.1}\" fill=\"{fill}\" stroke=\"{edge}\" stroke-width=\"0.2\""
        );
        if tri.opacity < 1.0 {
            let _ = write!(svg, " fill-opacity=\"{:.2}\"", tri.opacity);
        }
        svg.push_str("/>\n");
    }

    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"{}\" font-family=\"monospace\" font-size=\"10\" fill=\"#5a6080\" \
         text-anchor=\"middle\">{} draw entries, {} triangles</text>",
        width / 2.0,
        height - 8.0,
        entries.len(),
        tris.len()
    );
    svg.push_str("</svg>\n");
    svg
}
