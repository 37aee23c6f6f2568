//! Writes synthetic per-region solar measurement files into `data/` (or the
//! directory given as the first argument).

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use solar_dashboard::data::model::Region;

const HEADER: [&str; 17] = [
    "Timestamp", "GHI", "DNI", "DHI", "ModA", "ModB", "Tamb", "RH", "WS", "WSgust", "WD", "BP",
    "Cleaning", "Precipitation", "TModA", "TModB", "GHI_zscore",
];

const DAYS: i64 = 7;
const STEP_MINUTES: i64 = 10;

/// Per-site climate: peak GHI, direct fraction, base temperature, humidity.
struct Site {
    region: Region,
    start: (i32, u32, u32),
    peak_ghi: f64,
    direct_fraction: f64,
    base_temp: f64,
    humidity: f64,
}

const SITES: [Site; 3] = [
    Site {
        region: Region::Benin,
        start: (2021, 8, 9),
        peak_ghi: 950.0,
        direct_fraction: 0.62,
        base_temp: 26.0,
        humidity: 55.0,
    },
    Site {
        region: Region::SierraLeone,
        start: (2021, 10, 30),
        peak_ghi: 820.0,
        direct_fraction: 0.48,
        base_temp: 23.5,
        humidity: 78.0,
    },
    Site {
        region: Region::Togo,
        start: (2021, 10, 25),
        peak_ghi: 900.0,
        direct_fraction: 0.58,
        base_temp: 25.0,
        humidity: 61.0,
    },
];

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

struct Observation {
    timestamp: NaiveDateTime,
    values: [f64; 15],
    cleaning: u8,
}

fn simulate(site: &Site, rng: &mut SimpleRng) -> Result<Vec<Observation>> {
    let (y, m, d) = site.start;
    let start = NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let steps = DAYS * 24 * 60 / STEP_MINUTES;
    let mut out = Vec::with_capacity(steps as usize);
    for i in 0..steps {
        let timestamp = start + Duration::minutes(i * STEP_MINUTES);
        let hour = timestamp.hour() as f64 + timestamp.minute() as f64 / 60.0;

        // Daylight between 06:00 and 18:00, with passing clouds.
        let sun = if (6.0..18.0).contains(&hour) {
            (PI * (hour - 6.0) / 12.0).sin()
        } else {
            0.0
        };
        let cloud = (1.0 - rng.next_f64() * 0.35).min(1.0);
        let ghi = if sun > 0.0 {
            (site.peak_ghi * sun * cloud + rng.gauss(0.0, 8.0)).max(0.0)
        } else {
            rng.gauss(-0.8, 0.4).min(0.0)
        };
        let dni = (ghi * site.direct_fraction * cloud).max(0.0);
        let dhi = (ghi - dni * sun).max(0.0);
        let tamb = site.base_temp + 6.0 * sun + rng.gauss(0.0, 0.4);
        let rh = (site.humidity - 15.0 * sun + rng.gauss(0.0, 2.0)).clamp(5.0, 100.0);
        let ws = rng.gauss(2.5, 0.8).max(0.0);
        let tmod_a = tamb + ghi * 0.025;

        out.push(Observation {
            timestamp,
            values: [
                ghi,
                dni,
                dhi,
                ghi * 0.97,
                ghi * 0.95,
                tamb,
                rh,
                ws,
                ws + rng.next_f64() * 1.5,
                rng.next_f64() * 360.0,
                rng.gauss(996.0, 1.5),
                if rng.next_f64() < 0.01 { rng.next_f64() * 2.0 } else { 0.0 },
                tmod_a,
                tmod_a - 1.5,
                0.0,
            ],
            cleaning: u8::from(i == steps / 2),
        });
    }

    // Standard score of GHI over the whole file.
    let n = out.len() as f64;
    let mean = out.iter().map(|o| o.values[0]).sum::<f64>() / n;
    let var = out.iter().map(|o| (o.values[0] - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    for o in &mut out {
        o.values[14] = if std > 0.0 { (o.values[0] - mean) / std } else { 0.0 };
    }
    Ok(out)
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    for site in &SITES {
        let rows = simulate(site, &mut rng)?;
        let path = out_dir.join(site.region.file_name());
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(HEADER)?;

        for o in &rows {
            let mut record = vec![o.timestamp.format("%Y-%m-%d %H:%M").to_string()];
            // Values are laid out in header order, with Cleaning spliced in.
            for (idx, v) in o.values.iter().enumerate() {
                if idx == 11 {
                    record.push(o.cleaning.to_string());
                }
                record.push(format!("{v:.2}"));
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;

        println!(
            "Wrote {} rows for {} to {}",
            rows.len(),
            site.region.label(),
            path.display()
        );
    }
    Ok(())
}
