use curve_morph::geom::{
    AnchorCurve, BezierAnchor, BezierCurveEvaluator, CurveEvaluator, CurvePath, GeomMesh,
    MorphDiagnostics, MorphSegment, Point3, PolylineCurveEvaluator, Quat, TransformAnchor, Vec3,
    distribute_along_curve, morph_mesh, placement_parameters,
};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_QUANTIZE: f64 = 1e-6;
const SNAPSHOT_DECIMALS: usize = 6;
const DEFAULT_EVAL_SAMPLES: usize = 11;

const USAGE: &str = r#"morph_cli (curve-morph)

USAGE:
  morph_cli list
  morph_cli run <scenario|all> [options]
  morph_cli eval <curve.json> [--samples N]

SCENARIOS:
  bezier_arc_column
  bezier_s_curve_scaled
  polyline_twist_column
  polyline_corner_column
  place_boxes_along_arc

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.obj and/or <scenario>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ (single scenario only)
  --snap <path>      Write snapshot (single scenario only)
  --no-obj           Skip OBJ when using --out-dir
  --no-snap          Skip snapshot when using --out-dir
  --overwrite        Overwrite existing output files
  -h, --help         Show this help

OPTIONS (eval):
  --samples <N>      Number of evenly spaced parameters to print (default 11)

Set RUST_LOG=debug to see curve construction details.
"#;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("morph_cli error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut args = Args::new(args);

    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "list" => {
            print_scenarios();
            Ok(())
        }
        "run" => cmd_run(&mut args),
        "eval" => cmd_eval(&mut args),
        "-h" | "--help" | "help" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
    }
}

fn print_usage() {
    println!("{USAGE}");
}

fn print_scenarios() {
    for scenario in Scenario::ALL {
        println!("{}", scenario.name());
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_run(args: &mut Args) -> Result<(), String> {
    let scenario_name = args.next().ok_or("missing scenario name")?;

    let mut out_dir: Option<PathBuf> = None;
    let mut obj_path: Option<PathBuf> = None;
    let mut snap_path: Option<PathBuf> = None;
    let mut overwrite = false;
    let mut write_obj = true;
    let mut write_snap = true;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
            "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
            "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
            "--overwrite" => overwrite = true,
            "--no-obj" => write_obj = false,
            "--no-snap" => write_snap = false,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    if let Some(dir) = out_dir.as_ref() {
        if obj_path.is_some() || snap_path.is_some() {
            return Err("use either --out-dir or --obj/--snap (not both)".to_string());
        }
        if !write_obj && !write_snap {
            return Err("nothing to write (both --no-obj and --no-snap set)".to_string());
        }

        fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

        if scenario_name == "all" {
            for scenario in Scenario::ALL {
                run_one_scenario_to_dir(*scenario, dir, write_obj, write_snap, overwrite)?;
            }
            return Ok(());
        }

        let scenario = Scenario::from_str(scenario_name.as_str())
            .ok_or_else(|| unknown_scenario(&scenario_name))?;
        return run_one_scenario_to_dir(scenario, dir, write_obj, write_snap, overwrite);
    }

    if scenario_name == "all" {
        return Err("`run all` requires --out-dir".to_string());
    }

    let scenario = Scenario::from_str(scenario_name.as_str())
        .ok_or_else(|| unknown_scenario(&scenario_name))?;
    let output = run_scenario(scenario)?;

    if let Some(path) = snap_path.as_deref() {
        write_text_file(path, &output.snapshot, overwrite)?;
        eprintln!("wrote {}", path.display());
    } else {
        print!("{}", output.snapshot);
    }

    if let Some(path) = obj_path.as_deref() {
        write_obj_file(path, &output.mesh, output.name, overwrite)?;
        eprintln!("wrote {}", path.display());
    }

    print_summary(&output);
    Ok(())
}

fn run_one_scenario_to_dir(
    scenario: Scenario,
    dir: &Path,
    write_obj: bool,
    write_snap: bool,
    overwrite: bool,
) -> Result<(), String> {
    let output = run_scenario(scenario)?;

    if write_snap {
        let path = dir.join(format!("{}.snap", output.name));
        write_text_file(&path, &output.snapshot, overwrite)?;
        eprintln!("wrote {}", path.display());
    }

    if write_obj {
        let path = dir.join(format!("{}.obj", output.name));
        write_obj_file(&path, &output.mesh, output.name, overwrite)?;
        eprintln!("wrote {}", path.display());
    }

    print_summary(&output);
    Ok(())
}

fn print_summary(output: &ScenarioOutput) {
    match output.morph_diag.as_ref() {
        Some(diag) => eprintln!(
            "{}: vertices={} triangles={} | max_displacement={:.6} extrapolated={} warnings={}",
            output.name,
            output.mesh.vertex_count(),
            output.mesh.triangle_count(),
            diag.max_displacement,
            diag.extrapolated_vertex_count,
            diag.warnings.len()
        ),
        None => eprintln!(
            "{}: vertices={} triangles={}",
            output.name,
            output.mesh.vertex_count(),
            output.mesh.triangle_count()
        ),
    }
}

fn cmd_eval(args: &mut Args) -> Result<(), String> {
    let path = PathBuf::from(args.next().ok_or("missing curve document path")?);
    let mut samples = DEFAULT_EVAL_SAMPLES;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--samples" => {
                let raw = args.value("--samples")?;
                samples = raw
                    .parse()
                    .map_err(|e| format!("invalid --samples value `{raw}`: {e}"))?;
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    let text = fs::read_to_string(&path).map_err(|e| format!("read {}: {e}", path.display()))?;
    let document = CurvePath::from_json(&text).map_err(|e| e.to_string())?;
    let curve = document.evaluator().map_err(|e| e.to_string())?;

    let kind = match curve {
        AnchorCurve::Bezier(_) => "bezier",
        AnchorCurve::Polyline(_) => "polyline",
    };

    let mut out = String::new();
    let _ = writeln!(out, "kind {kind}");
    let _ = writeln!(out, "anchors {}", curve.anchor_count());
    let _ = write!(out, "length ");
    write_f64(&mut out, curve.total_length());
    out.push('\n');
    write_frames(&mut out, &distribute_along_curve(&curve, samples), samples);
    print!("{out}");
    Ok(())
}

// ============================================================================
// File output
// ============================================================================

fn unknown_scenario(name: &str) -> String {
    let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
    for scenario in Scenario::ALL {
        let _ = writeln!(msg, "  {}", scenario.name());
    }
    msg
}

fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), String> {
    if path.exists() && !overwrite {
        return Err(format!(
            "refusing to overwrite existing file {} (use --overwrite)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
    }
    Ok(())
}

fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
    ensure_writable(path, overwrite)?;
    fs::write(path, normalize_snapshot_text(text))
        .map_err(|e| format!("write {}: {e}", path.display()))
}

fn write_obj_file(path: &Path, mesh: &GeomMesh, name: &str, overwrite: bool) -> Result<(), String> {
    mesh.validate().map_err(|e| format!("mesh validation failed: {e}"))?;
    ensure_writable(path, overwrite)?;

    let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_obj(&mut w, mesh, name).map_err(|e| format!("write obj: {e}"))?;
    w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
}

fn write_obj(w: &mut impl Write, mesh: &GeomMesh, name: &str) -> std::io::Result<()> {
    writeln!(w, "# curve-morph morph_cli")?;
    writeln!(w, "o {name}")?;

    for p in &mesh.positions {
        writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
    }
    if let Some(uvs) = mesh.uvs.as_ref() {
        for uv in uvs {
            writeln!(w, "vt {} {}", uv[0], uv[1])?;
        }
    }
    if let Some(normals) = mesh.normals.as_ref() {
        for n in normals {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
        }
    }

    let has_uvs = mesh.uvs.is_some();
    let has_normals = mesh.normals.is_some();
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
        match (has_uvs, has_normals) {
            (true, true) => writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?,
            (true, false) => writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}")?,
            (false, true) => writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}")?,
            (false, false) => writeln!(w, "f {a} {b} {c}")?,
        }
    }
    Ok(())
}

// ============================================================================
// Snapshot text
// ============================================================================

fn normalize_snapshot_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    if normalized.ends_with('\n') {
        normalized
    } else {
        format!("{normalized}\n")
    }
}

fn quantize_f64(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
    // Fold -0.0 into 0.0 so snapshots stay stable.
    if q == 0.0 { 0.0 } else { q }
}

fn write_f64(out: &mut String, value: f64) {
    let value = quantize_f64(value);
    let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
}

fn write_values_line(out: &mut String, prefix: &str, values: &[f64]) {
    out.push_str(prefix);
    for &v in values {
        out.push(' ');
        write_f64(out, v);
    }
    out.push('\n');
}

fn write_frames(out: &mut String, frames: &[TransformAnchor], requested: usize) {
    let _ = writeln!(out, "frames {}", frames.len());
    for (t, frame) in placement_parameters(requested).into_iter().zip(frames) {
        write_values_line(out, "t", &[t]);
        write_values_line(out, "  position", &frame.position.to_array());
        let q = frame.rotation;
        write_values_line(out, "  rotation", &[q.x, q.y, q.z, q.w]);
        write_values_line(out, "  scale", &frame.scale.to_array());
    }
}

fn write_morph_diagnostics(out: &mut String, diag: &MorphDiagnostics) {
    let _ = writeln!(out, "morph_diag.vertex_count {}", diag.vertex_count);
    let _ = writeln!(out, "morph_diag.triangle_count {}", diag.triangle_count);
    write_values_line(out, "morph_diag.min_displacement", &[diag.min_displacement]);
    write_values_line(out, "morph_diag.max_displacement", &[diag.max_displacement]);
    write_values_line(out, "morph_diag.avg_displacement", &[diag.avg_displacement]);
    let _ = writeln!(
        out,
        "morph_diag.extrapolated_vertex_count {}",
        diag.extrapolated_vertex_count
    );
    match diag.bounds {
        Some(bounds) => {
            write_values_line(out, "morph_diag.bounds.min", &bounds.min.to_array());
            write_values_line(out, "morph_diag.bounds.max", &bounds.max.to_array());
        }
        None => {
            let _ = writeln!(out, "morph_diag.bounds none");
        }
    }
    let _ = writeln!(out, "morph_diag.warning_count {}", diag.warnings.len());
    for (idx, warning) in diag.warnings.iter().enumerate() {
        let _ = writeln!(out, "morph_diag.warning.{idx} {warning}");
    }
}

fn write_mesh(out: &mut String, mesh: &GeomMesh) {
    let _ = writeln!(out, "mesh.vertex_count {}", mesh.positions.len());
    let _ = writeln!(out, "mesh.triangle_count {}", mesh.indices.len() / 3);
    let _ = writeln!(out, "mesh.has_uvs {}", mesh.uvs.is_some());
    let _ = writeln!(out, "mesh.has_normals {}", mesh.normals.is_some());
    let _ = writeln!(out, "mesh.has_tangents {}", mesh.tangents.is_some());

    let _ = writeln!(out, "mesh.positions {}", mesh.positions.len());
    for p in &mesh.positions {
        write_values_line(out, "p", p);
    }

    let _ = writeln!(out, "mesh.indices {}", mesh.indices.len());
    for tri in mesh.indices.chunks_exact(3) {
        let _ = writeln!(out, "i {} {} {}", tri[0], tri[1], tri[2]);
    }

    if let Some(normals) = mesh.normals.as_ref() {
        let _ = writeln!(out, "mesh.normals {}", normals.len());
        for n in normals {
            write_values_line(out, "n", n);
        }
    } else {
        let _ = writeln!(out, "mesh.normals none");
    }

    if let Some(tangents) = mesh.tangents.as_ref() {
        let _ = writeln!(out, "mesh.tangents {}", tangents.len());
        for t in tangents {
            write_values_line(out, "t", t);
        }
    } else {
        let _ = writeln!(out, "mesh.tangents none");
    }
}

fn snapshot(op: &str, sections: impl FnOnce(&mut String)) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# curve-morph snapshot v1");
    let _ = writeln!(out, "op {op}");
    let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
    sections(&mut out);
    normalize_snapshot_text(&out)
}

// ============================================================================
// Scenarios
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    BezierArcColumn,
    BezierSCurveScaled,
    PolylineTwistColumn,
    PolylineCornerColumn,
    PlaceBoxesAlongArc,
}

impl Scenario {
    const ALL: &'static [Scenario] = &[
        Scenario::BezierArcColumn,
        Scenario::BezierSCurveScaled,
        Scenario::PolylineTwistColumn,
        Scenario::PolylineCornerColumn,
        Scenario::PlaceBoxesAlongArc,
    ];

    fn name(self) -> &'static str {
        match self {
            Scenario::BezierArcColumn => "bezier_arc_column",
            Scenario::BezierSCurveScaled => "bezier_s_curve_scaled",
            Scenario::PolylineTwistColumn => "polyline_twist_column",
            Scenario::PolylineCornerColumn => "polyline_corner_column",
            Scenario::PlaceBoxesAlongArc => "place_boxes_along_arc",
        }
    }

    fn from_str(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

struct ScenarioOutput {
    name: &'static str,
    mesh: GeomMesh,
    morph_diag: Option<MorphDiagnostics>,
    snapshot: String,
}

fn run_scenario(scenario: Scenario) -> Result<ScenarioOutput, String> {
    match scenario {
        Scenario::BezierArcColumn => {
            let curve = quarter_arc(4.0)?;
            morph_scenario(scenario.name(), &column_mesh(0.5, 16), &curve)
        }
        Scenario::BezierSCurveScaled => {
            let curve = BezierCurveEvaluator::new(
                Vec3::Y,
                &[
                    BezierAnchor::at(Point3::new(0.0, 0.0, 0.0))
                        .with_control_offset(Vec3::new(0.0, 0.0, 2.0)),
                    BezierAnchor::at(Point3::new(2.0, 0.0, 4.0))
                        .with_control_offset(Vec3::new(0.0, 0.0, 2.0))
                        .with_scale(Vec3::new(2.0, 2.0, 1.0)),
                    BezierAnchor::at(Point3::new(0.0, 0.0, 8.0))
                        .with_control_offset(Vec3::new(0.0, 0.0, 2.0))
                        .with_scale(Vec3::new(0.5, 0.5, 1.0)),
                ],
            )
            .map_err(|e| e.to_string())?;
            morph_scenario(scenario.name(), &column_mesh(0.5, 24), &curve)
        }
        Scenario::PolylineTwistColumn => {
            let anchors: Vec<TransformAnchor> = (0..=4)
                .map(|i| {
                    let angle = f64::from(i) * std::f64::consts::FRAC_PI_4;
                    let rotation = Quat::from_axis_angle(Vec3::Z, angle).unwrap_or_default();
                    TransformAnchor::at(Point3::new(0.0, 0.0, f64::from(i) * 1.5))
                        .with_rotation(rotation)
                })
                .collect();
            let curve = PolylineCurveEvaluator::new(&anchors).map_err(|e| e.to_string())?;
            morph_scenario(scenario.name(), &column_mesh(0.75, 12), &curve)
        }
        Scenario::PolylineCornerColumn => {
            // Turn a quarter towards +X halfway along the path.
            let facing_x = Quat::look_rotation(Vec3::X, Vec3::Y);
            let curve = PolylineCurveEvaluator::new(&[
                TransformAnchor::at(Point3::new(0.0, 0.0, 0.0)),
                TransformAnchor::at(Point3::new(0.0, 0.0, 3.0)),
                TransformAnchor::at(Point3::new(3.0, 0.0, 3.0)).with_rotation(facing_x),
            ])
            .map_err(|e| e.to_string())?;
            // Vertices beyond the segment ends stay pinned to the end frames.
            let segment =
                MorphSegment::new(Point3::new(0.0, 0.0, -0.25), Point3::new(0.0, 0.0, 0.25));
            morph_scenario_with_segment(scenario.name(), &column_mesh(0.5, 8), segment, &curve)
        }
        Scenario::PlaceBoxesAlongArc => scenario_place_boxes_along_arc(),
    }
}

fn morph_scenario(
    name: &'static str,
    mesh: &GeomMesh,
    curve: &dyn CurveEvaluator,
) -> Result<ScenarioOutput, String> {
    morph_scenario_with_segment(name, mesh, MorphSegment::default(), curve)
}

fn morph_scenario_with_segment(
    name: &'static str,
    mesh: &GeomMesh,
    segment: MorphSegment,
    curve: &dyn CurveEvaluator,
) -> Result<ScenarioOutput, String> {
    let (morphed, diag) = morph_mesh(mesh, segment, curve).map_err(|e| e.to_string())?;

    let snap = snapshot(name, |out| {
        write_values_line(out, "curve.length", &[curve.total_length()]);
        write_morph_diagnostics(out, &diag);
        write_mesh(out, &morphed);
    });

    Ok(ScenarioOutput {
        name,
        mesh: morphed,
        morph_diag: Some(diag),
        snapshot: snap,
    })
}

fn scenario_place_boxes_along_arc() -> Result<ScenarioOutput, String> {
    const COUNT: usize = 6;
    let curve = quarter_arc(4.0)?;
    let frames = distribute_along_curve(&curve, COUNT);
    let unit = column_mesh(0.2, 1);

    let mut mesh = GeomMesh::default();
    for frame in &frames {
        let base = mesh.positions.len() as u32;
        let placed = unit.points().map(|p| frame.transform_point(p.to_vec3()));
        mesh.positions.extend(placed.map(Point3::to_array));
        mesh.indices.extend(unit.indices.iter().map(|i| i + base));
    }
    mesh.recompute_normals();

    let name = Scenario::PlaceBoxesAlongArc.name();
    let snap = snapshot(name, |out| {
        write_frames(out, &frames, COUNT);
        write_mesh(out, &mesh);
    });

    Ok(ScenarioOutput {
        name,
        mesh,
        morph_diag: None,
        snapshot: snap,
    })
}

/// Quarter circle in the XZ plane from the origin to `(radius, 0, radius)`.
fn quarter_arc(radius: f64) -> Result<BezierCurveEvaluator, String> {
    let handle = 0.552_284_749_8 * radius;
    BezierCurveEvaluator::new(
        Vec3::Y,
        &[
            BezierAnchor::at(Point3::ORIGIN).with_control_offset(Vec3::new(0.0, 0.0, handle)),
            BezierAnchor::at(Point3::new(radius, 0.0, radius))
                .with_control_offset(Vec3::new(handle, 0.0, 0.0)),
        ],
    )
    .map_err(|e| e.to_string())
}

/// Square column around the default morph segment: `[-w/2, w/2]` in X/Y,
/// `[-0.5, 0.5]` in Z, cut into `rings` slices, with capped ends and UVs.
fn column_mesh(width: f64, rings: u32) -> GeomMesh {
    let h = width * 0.5;
    let corners = [[-h, -h], [h, -h], [h, h], [-h, h]];
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    for ring in 0..=rings {
        let v = f64::from(ring) / f64::from(rings);
        for (i, c) in corners.iter().enumerate() {
            positions.push([c[0], c[1], v - 0.5]);
            uvs.push([i as f64 / 4.0, v]);
        }
    }

    let mut indices = Vec::new();
    for ring in 0..rings {
        for side in 0..4 {
            let a = ring * 4 + side;
            let b = ring * 4 + (side + 1) % 4;
            indices.extend_from_slice(&[a, b, b + 4, a, b + 4, a + 4]);
        }
    }
    let top = rings * 4;
    indices.extend_from_slice(&[0, 2, 1, 0, 3, 2]);
    indices.extend_from_slice(&[top, top + 1, top + 2, top, top + 2, top + 3]);

    let mut mesh = GeomMesh::with_attributes(positions, indices, Some(uvs), None);
    mesh.recompute_derived();
    mesh
}

// ============================================================================
// Args
// ============================================================================

struct Args {
    args: Vec<String>,
    pos: usize,
}

impl Args {
    fn new(args: Vec<String>) -> Self {
        Self { args, pos: 0 }
    }

    fn next(&mut self) -> Option<String> {
        let arg = self.args.get(self.pos)?.clone();
        self.pos += 1;
        Some(arg)
    }

    fn value(&mut self, flag: &str) -> Result<String, String> {
        self.next().ok_or_else(|| format!("missing value for {flag}"))
    }
}
