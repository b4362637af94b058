//! End-to-end runs of the `agrorisk` binary on small generated TIFFs

use std::io::Cursor;
use std::path::Path;
use std::process::Command;
use tiff::encoder::colortype::RGBA16;
use tiff::encoder::TiffEncoder;

const ROWS: u32 = 40;
const COLS: u32 = 48;

/// Four-band cube: vegetation on the left half, bare soil on the right
fn write_field(path: &Path) {
    let mut samples = Vec::with_capacity((ROWS * COLS * 4) as usize);
    for _ in 0..ROWS {
        for c in 0..COLS {
            if c < COLS / 2 {
                samples.extend_from_slice(&[400, 800, 600, 4000]);
            } else {
                samples.extend_from_slice(&[1500, 1800, 2200, 2000]);
            }
        }
    }
    let mut buf = Vec::new();
    {
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
        encoder.write_image::<RGBA16>(COLS, ROWS, &samples).unwrap();
    }
    std::fs::write(path, buf).unwrap();
}

fn agrorisk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_agrorisk"))
}

#[test]
fn info_prints_band_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("field.tif");
    write_field(&input);

    let out = agrorisk().arg("info").arg(&input).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Bands: 4"), "{}", stdout);
}

#[test]
fn indices_skips_unavailable_bands() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("field.tif");
    let out_dir = dir.path().join("out");
    write_field(&input);

    // SWIR defaults to band 5, which this cube lacks: MSI is skipped
    let out = agrorisk()
        .args(["indices"])
        .arg(&input)
        .arg(&out_dir)
        .args(["--red-edge", "1", "--preview"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    assert!(out_dir.join("ndvi.tif").exists());
    assert!(out_dir.join("ndre.tif").exists());
    assert!(out_dir.join("savi.tif").exists());
    assert!(out_dir.join("ndvi_rgb.tif").exists());
    assert!(out_dir.join("health_map.tif").exists());
    assert!(!out_dir.join("msi.tif").exists());
}

#[test]
fn indices_rejects_unknown_name() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("field.tif");
    write_field(&input);

    let out = agrorisk()
        .arg("indices")
        .arg(&input)
        .arg(dir.path())
        .args(["--index", "evi"])
        .output()
        .unwrap();
    assert!(!out.status.success());
}

#[test]
fn analyze_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("field.tif");
    let signatures = dir.path().join("signatures.json");
    let report = dir.path().join("report.json");
    let maps = dir.path().join("maps");
    write_field(&input);

    std::fs::write(&signatures, SIGNATURES).unwrap();

    let out = agrorisk()
        .arg("analyze")
        .arg(&input)
        .arg("--signatures")
        .arg(&signatures)
        .arg("--output")
        .arg(&report)
        .arg("--maps-dir")
        .arg(&maps)
        .args(["--patch-size", "8"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["dimensions"]["height"], ROWS);
    assert_eq!(json["dimensions"]["width"], COLS);
    assert_eq!(json["risk_map"].as_array().unwrap().len(), ROWS as usize);
    assert_eq!(json["risk_map"][0][0], 0);
    assert_eq!(json["risk_map"][0][COLS as usize - 1], 1);

    let alerts = json["alerts"].as_array().unwrap();
    assert!(alerts.iter().any(|a| a["risk_type"] == "stress"));

    assert!(maps.join("risk_map.tif").exists());
    assert!(maps.join("confidence_map.tif").exists());
    assert!(maps.join("risk_rgb.tif").exists());
}

const SIGNATURES: &str = r#"{
    "temperature": 200.0,
    "signatures": [
        {"name": "healthy",   "mean": [400, 800, 600, 4000]},
        {"name": "stress",    "mean": [1500, 1800, 2200, 2000]},
        {"name": "pest_risk", "mean": [3000, 3000, 3000, 3000]},
        {"name": "disease",   "mean": [0, 0, 0, 0]}
    ]
}"#;

#[test]
fn analyze_rejects_out_of_range_min_area() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("field.tif");
    let signatures = dir.path().join("signatures.json");
    let report = dir.path().join("report.json");
    write_field(&input);
    std::fs::write(&signatures, SIGNATURES).unwrap();

    for bad in ["--min-area=-1", "--min-area=1.5", "--min-area=NaN"] {
        let out = agrorisk()
            .arg("analyze")
            .arg(&input)
            .arg("--signatures")
            .arg(&signatures)
            .arg("--output")
            .arg(&report)
            .arg(bad)
            .output()
            .unwrap();
        assert!(!out.status.success(), "{}", bad);
        assert!(String::from_utf8_lossy(&out.stderr).contains("min-area"), "{}", bad);
        assert!(!report.exists());
    }
}

#[test]
fn analyze_rejects_mismatched_signatures() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("field.tif");
    let signatures = dir.path().join("signatures.json");
    write_field(&input);

    std::fs::write(
        &signatures,
        r#"{"signatures": [
            {"name": "healthy", "mean": [0, 0, 0, 0]},
            {"name": "frost",   "mean": [1, 1, 1, 1]}
        ]}"#,
    )
    .unwrap();

    let out = agrorisk()
        .arg("analyze")
        .arg(&input)
        .arg("--signatures")
        .arg(&signatures)
        .output()
        .unwrap();
    assert!(!out.status.success());
}
