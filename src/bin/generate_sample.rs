use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Grid of points shared by every file so searches hit across scenarios.
fn grid() -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    for i in 0..4 {
        for j in 0..4 {
            points.push((10.0 + i as f64 * 0.5, 20.0 + j as f64 * 0.5));
        }
    }
    points
}

/// Write one scenario file; `attrs` are `(column, value)` in filename order.
fn write_scenario(
    dir: &Path,
    prefix: &str,
    attrs: &[(&str, &str)],
    severity: f64,
    rng: &mut SimpleRng,
) -> Result<()> {
    let mut name = prefix.to_string();
    for (_, value) in attrs {
        name.push('_');
        name.push_str(value);
    }
    name.push_str(".csv");
    let path = dir.join(name);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["Latitude", "Longitude"];
    header.extend(attrs.iter().map(|(col, _)| *col));
    header.push("InundationDepth");
    writer.write_record(&header)?;

    for (lat, lon) in grid() {
        let depth = (severity * rng.next_f64() * 100.0).round() / 100.0;
        let mut record = vec![format!("{lat:?}"), format!("{lon:?}")];
        record.extend(attrs.iter().map(|(_, v)| v.to_string()));
        record.push(format!("{depth:?}"));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut rng = SimpleRng::new(42);
    let mut written = 0usize;

    // ---- Coastal ----
    let coastal = out_dir.join("Coastal");
    std::fs::create_dir_all(&coastal).context("creating Coastal directory")?;
    for (scenario, severity) in [("historical", 0.8), ("rcp4p5", 1.2), ("rcp8p5", 1.8)] {
        for subsidence in ["nosub", "wtsub"] {
            for year in ["2030", "2050"] {
                for return_period in ["rp0010", "rp0100"] {
                    for slr in ["0", "5_perc_50"] {
                        write_scenario(
                            &coastal,
                            "inuncoast",
                            &[
                                ("ClimateScenario", scenario),
                                ("Subsidence", subsidence),
                                ("Year", year),
                                ("ReturnPeriod", return_period),
                                ("SeaLevelRiseScenario", slr),
                            ],
                            severity,
                            &mut rng,
                        )?;
                        written += 1;
                    }
                }
            }
        }
    }
    // Stray file with too few name tokens; the indexer skips it.
    std::fs::write(coastal.join("inuncoast_notes.csv"), "Latitude,Longitude\n")
        .context("writing stray file")?;

    // ---- Riverine ----
    let riverine = out_dir.join("Riverine");
    std::fs::create_dir_all(&riverine).context("creating Riverine directory")?;
    for (scenario, severity) in [("historical", 1.0), ("rcp8p5", 2.0)] {
        for gcm in ["GFDL-ESM2M", "HadGEM2-ES", "000000000WATCH"] {
            for year in ["1980", "2050"] {
                for return_period in ["rp00010", "rp00100"] {
                    write_scenario(
                        &riverine,
                        "inunriver",
                        &[
                            ("ClimateScenario", scenario),
                            ("GlobalCirculationModel", gcm),
                            ("Year", year),
                            ("ReturnPeriod", return_period),
                        ],
                        severity,
                        &mut rng,
                    )?;
                    written += 1;
                }
            }
        }
    }

    println!(
        "Wrote {written} scenario files ({} points each) under {}",
        grid().len(),
        out_dir.display()
    );
    Ok(())
}
