use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::{Value, json};

/// One block declaration for the benchmark rule set.
pub struct BlockDecl {
    pub name: String,
    pub elems: Vec<String>,
    pub mods: Vec<(String, String)>,
    pub shortcut: Value,
}

/// Generate n random block declarations to compile in the benchmark
pub fn generate_random_blocks(n: usize) -> Vec<BlockDecl> {
    let mut rng = StdRng::seed_from_u64(42); // Fixed seed for reproducibility
    let mut blocks = Vec::with_capacity(n);

    for _ in 0..n {
        let name = random_string(&mut rng, 4, 10);

        let elems_count = rng.random_range(1..6);
        let elems = (0..elems_count)
            .map(|_| random_string(&mut rng, 3, 8))
            .collect();

        let mods_count = rng.random_range(0..4);
        let mods = (0..mods_count)
            .map(|_| (random_string(&mut rng, 3, 6), random_string(&mut rng, 1, 4)))
            .collect();

        let shortcut = json!({
            "tag": if rng.random_bool(0.5) { "div" } else { "span" },
            "attrs": { "role": random_string(&mut rng, 3, 8) },
            "js": rng.random_bool(0.3),
        });

        blocks.push(BlockDecl {
            name,
            elems,
            mods,
            shortcut,
        });
    }

    blocks
}

/// Generate a random string with length between min and max
fn random_string(rng: &mut StdRng, min_len: usize, max_len: usize) -> String {
    let charset = b"abcdefghijklmnopqrstuvwxyz";
    let len = rng.random_range(min_len..=max_len);

    (0..len)
        .map(|_| char::from(charset[rng.random_range(0..charset.len())]))
        .collect()
}

// Print binary size information - can be used from individual benchmarks
pub fn print_binary_size() {
    let binary_path = std::env::current_exe().unwrap();
    let metadata = std::fs::metadata(binary_path.clone()).unwrap();
    let size_bytes = metadata.len();
    let size_kb = size_bytes as f64 / 1024.0;
    let size_mb = size_kb / 1024.0;

    println!(
        "Binary size: {:.2} MB ({:.2} KB, {} bytes)",
        size_mb, size_kb, size_bytes
    );
    println!("Binary path: {}", binary_path.display());
}
