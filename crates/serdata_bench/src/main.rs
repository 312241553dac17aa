use std::time::{Duration, Instant};

use anyhow::{Result, ensure};
use rand::Rng;
use serdata::{
    ArrayOptions, ArraySerializer, CompressedTimeSpan, DataSerializer, Keyframe,
    KeyframeSerializer, SerializerSelector,
};

const ROUNDS: u32 = 5;

struct BenchConfig {
    lengths: Vec<usize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            lengths: vec![16, 1_024, 65_536, 1_048_576],
        }
    }
}

#[derive(Default)]
struct Timings {
    write: Duration,
    read: Duration,
    bytes: usize,
}

fn random_keyframes(len: usize) -> Vec<Keyframe<f32>> {
    let mut rng = rand::rng();
    let mut ticks = 0;
    (0..len)
        .map(|_| {
            ticks += rng.random_range(1..100);
            Keyframe::new(CompressedTimeSpan(ticks), rng.random::<f32>())
        })
        .collect()
}

fn measure(serializer: &ArraySerializer<Keyframe<f32>>, keys: &[Keyframe<f32>]) -> Result<Timings> {
    let mut timings = Timings::default();

    for _ in 0..ROUNDS {
        let mut values = keys.to_vec();

        let start = Instant::now();
        let bytes = serdata::to_bytes(serializer, &mut values)?;
        timings.write += start.elapsed();

        let start = Instant::now();
        let decoded: Vec<Keyframe<f32>> = serdata::from_bytes(serializer, &bytes)?;
        timings.read += start.elapsed();

        ensure!(decoded == keys, "decoded keyframes differ from the input");
        timings.bytes = bytes.len();
    }

    timings.write /= ROUNDS;
    timings.read /= ROUNDS;
    Ok(timings)
}

fn run(config: &BenchConfig) -> Result<()> {
    let selector = SerializerSelector::with_primitives();
    selector.register(KeyframeSerializer::<f32>::new())?;

    let mut block = ArraySerializer::<Keyframe<f32>>::blittable();
    let mut elementwise = ArraySerializer::<Keyframe<f32>>::blittable()
        .with_options(ArrayOptions::new().with_fast_path(false));
    block.initialize(&selector)?;
    elementwise.initialize(&selector)?;

    if !block.uses_fast_path() {
        println!("Block path unavailable on this target, both rows use element-wise transfer.");
    }

    println!(
        "{:>10} {:>12} {:>14} {:>14} {:>8}",
        "len", "bytes", "path", "write", "read"
    );
    for &len in &config.lengths {
        let keys = random_keyframes(len);
        for (name, serializer) in [("block", &block), ("element", &elementwise)] {
            let timings = measure(serializer, &keys)?;
            println!(
                "{:>10} {:>12} {:>14} {:>14?} {:>8?}",
                len, timings.bytes, name, timings.write, timings.read
            );
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    run(&BenchConfig::default())
}
