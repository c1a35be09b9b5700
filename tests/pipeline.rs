//! End-to-end runs over WAV files written to the system temp dir.

use freqgraph::report::{self, text};
use freqgraph::{AnalysisConfig, AnalysisDriver, Error, SpectrumMethod, Summary, WavSource};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("freqgraph-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn wav(&self, name: &str, sample_rate: u32, samples: &[i16]) -> PathBuf {
        let path = self.dir.join(name);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        path
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

fn tone(freq: f64, amplitude: f64, sample_rate: u32, len: usize) -> Vec<i16> {
    (0..len)
        .map(|t| {
            let phase = 2.0 * PI * freq * t as f64 / sample_rate as f64;
            (amplitude * phase.sin()).round() as i16
        })
        .collect()
}

/// 8 kHz with a 10 Hz step: 800-sample windows, bins 10..=500 Hz.
fn voice_config() -> AnalysisConfig {
    AnalysisConfig::new()
        .with_sample_rate(8000)
        .with_frequency_step(10)
        .with_max_frequency(500)
}

fn analyze(path: &Path, config: AnalysisConfig) -> freqgraph::Report {
    let mut source = WavSource::open(path).unwrap();
    AnalysisDriver::new(config).unwrap().run(&mut source).unwrap()
}

// ==========================================================================
// FULL PIPELINE
// ==========================================================================

#[test]
fn test_tone_file_report() {
    let fixture = Fixture::new("tone");
    let path = fixture.wav("tone.wav", 8000, &tone(200.0, 16384.0, 8000, 2000));
    let report = analyze(&path, voice_config());

    assert_eq!(report.total_samples, 2000);
    assert_eq!(report.window_length, 800);
    let offsets: Vec<u64> = report.blocks.iter().map(|b| b.sample_offset).collect();
    assert_eq!(offsets, vec![0, 800, 1600]);

    for block in &report.blocks[..2] {
        assert_eq!(block.bins.len(), 1, "block #{}", block.sample_offset);
        assert_eq!(block.bins[0].frequency, 200);
        assert!((block.bins[0].magnitude - PI / 2.0).abs() < 1e-2);
    }

    // The padded 400-sample tail still peaks at the tone
    let tail = &report.blocks[2];
    let peak = tail
        .bins
        .iter()
        .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
        .unwrap();
    assert_eq!(peak.frequency, 200);
}

#[test]
fn test_silent_file_report() {
    let fixture = Fixture::new("silent");
    let path = fixture.wav("silent.wav", 8000, &vec![0; 1700]);
    let report = analyze(&path, voice_config());

    assert_eq!(text::render(&report), "1700\n800\n#0\n\n#800\n\n#1600\n\n");
    let summary = Summary::from_report(&report);
    assert_eq!(summary.windows, 3);
    assert_eq!(summary.silent_windows, 3);
    assert!(summary.peak.is_none());
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let fixture = Fixture::new("repeat");
    let mut samples = tone(120.0, 9000.0, 8000, 3000);
    for (i, s) in samples.iter_mut().enumerate() {
        *s = s.saturating_add(((i * 7919) % 2001) as i16 - 1000);
    }
    let path = fixture.wav("noisy.wav", 8000, &samples);

    let first = text::render(&analyze(&path, voice_config()));
    let second = text::render(&analyze(&path, voice_config()));
    assert_eq!(first, second);
}

#[test]
fn test_streamed_output_matches_rendered_report() {
    let fixture = Fixture::new("stream");
    let path = fixture.wav("tone.wav", 8000, &tone(330.0, 12000.0, 8000, 2500));
    let driver = AnalysisDriver::new(voice_config()).unwrap();

    let mut streamed = Vec::new();
    let windows = driver
        .run_to_writer(&mut WavSource::open(&path).unwrap(), &mut streamed)
        .unwrap();
    let report = driver.run(&mut WavSource::open(&path).unwrap()).unwrap();

    assert_eq!(windows, report.blocks.len());
    assert_eq!(String::from_utf8(streamed).unwrap(), text::render(&report));
}

#[test]
fn test_generate_then_parse() {
    let fixture = Fixture::new("parse");
    let path = fixture.wav("tone.wav", 8000, &tone(450.0, 20000.0, 8000, 4000));
    let report = analyze(&path, voice_config());

    let out = fixture.dir.join("tone.freq");
    report::generate(&out, &report).unwrap();
    let file = std::io::BufReader::new(std::fs::File::open(&out).unwrap());
    let parsed = text::parse(file).unwrap();

    assert_eq!(parsed.total_samples, report.total_samples);
    assert_eq!(parsed.window_length, report.window_length);
    assert_eq!(parsed.blocks.len(), report.blocks.len());
    for (a, b) in parsed.blocks.iter().zip(&report.blocks) {
        assert_eq!(a.sample_offset, b.sample_offset);
        assert_eq!(a.bins.len(), b.bins.len());
        for (x, y) in a.bins.iter().zip(&b.bins) {
            assert_eq!(x.frequency, y.frequency);
            // Six decimals in the text format
            assert!((x.magnitude - y.magnitude).abs() < 1e-6);
        }
    }
}

// ==========================================================================
// CONFIGURATION EFFECTS
// ==========================================================================

#[test]
fn test_methods_agree_on_power_of_two_windows() {
    let fixture = Fixture::new("methods");
    let samples: Vec<i16> = tone(96.0, 15000.0, 1024, 300)
        .iter()
        .zip(tone(208.0, 6000.0, 1024, 300))
        .map(|(a, b)| a.saturating_add(b))
        .collect();
    let path = fixture.wav("mix.wav", 1024, &samples);

    let base = AnalysisConfig::new()
        .with_sample_rate(1024)
        .with_frequency_step(16)
        .with_max_frequency(256)
        // Keep every bin so the three reports line up one to one
        .with_amplitude_threshold(-1.0);
    let direct = analyze(&path, base.clone());
    let fft = analyze(&path, base.clone().with_method(SpectrumMethod::Fft));
    let per_bin = analyze(&path, base.with_method(SpectrumMethod::FftPerBin));

    assert_eq!(direct.window_length, 64);
    assert_eq!(fft.window_length, 64);
    for ((d, f), p) in direct.blocks.iter().zip(&fft.blocks).zip(&per_bin.blocks) {
        assert_eq!(d.sample_offset, f.sample_offset);
        assert_eq!(d.bins.len(), 16);
        assert_eq!(f.bins.len(), 16);
        assert_eq!(p.bins.len(), 16);
        for ((x, y), z) in d.bins.iter().zip(&f.bins).zip(&p.bins) {
            assert_eq!(x.frequency, y.frequency);
            assert_eq!(y.frequency, z.frequency);
            assert!((x.magnitude - y.magnitude).abs() < 1e-9);
            assert!((y.magnitude - z.magnitude).abs() < 1e-9);
        }
    }
}

#[test]
fn test_max_samples_bounds_the_run() {
    let fixture = Fixture::new("bound");
    let path = fixture.wav("long.wav", 8000, &tone(200.0, 16384.0, 8000, 8000));
    let report = analyze(&path, voice_config().with_max_samples(Some(1600)));

    assert_eq!(report.total_samples, 8000);
    assert_eq!(report.blocks.len(), 2);
}

#[test]
fn test_sample_rate_mismatch_rejected() {
    let fixture = Fixture::new("rate");
    let path = fixture.wav("cd.wav", 44100, &vec![0; 100]);
    let mut source = WavSource::open(&path).unwrap();
    let driver = AnalysisDriver::new(voice_config()).unwrap();

    assert!(matches!(driver.run(&mut source), Err(Error::InvalidConfig(_))));
}
