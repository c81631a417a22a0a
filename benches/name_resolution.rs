use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dumper_7_names::engine::name::NameTable;
use dumper_7_names::platform::{MemoryReader, PlatformError};
use dumper_7_names::{to_valid_string, EngineVariantConfig, FlagDomain, FunctionFlags, PropertyFlags};

const POOL: usize = 0x1000;
const BLOCK: usize = 0x2000;

/// A pool header followed by one block, backed by a flat buffer
struct FlatPool {
    memory: Vec<u8>,
}

impl FlatPool {
    fn new(names: &[&str]) -> (Self, Vec<u32>) {
        let mut memory = vec![0u8; BLOCK];
        memory[POOL + 0x10..POOL + 0x18].copy_from_slice(&(BLOCK as u64).to_le_bytes());

        let mut indices = Vec::new();
        for name in names {
            indices.push(((memory.len() - BLOCK) / 2) as u32);
            memory.extend_from_slice(&((name.len() as u16) << 6).to_le_bytes());
            memory.extend_from_slice(name.as_bytes());
            if memory.len() % 2 != 0 {
                memory.push(0);
            }
        }

        (Self { memory }, indices)
    }
}

impl MemoryReader for FlatPool {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, PlatformError> {
        self.memory
            .get(address..address + size)
            .map(<[u8]>::to_vec)
            .ok_or(PlatformError::InvalidAddress(address))
    }

    fn is_valid_address(&self, address: usize) -> bool {
        address < self.memory.len()
    }
}

fn bench_flags(c: &mut Criterion) {
    let function = FunctionFlags::FINAL | FunctionFlags::NATIVE | FunctionFlags::EVENT | FunctionFlags::BLUEPRINT_CALLABLE;
    let property = PropertyFlags::from_raw(0x0010_0000_0000_0215);

    c.bench_function("stringify_function_flags", |b| b.iter(|| black_box(function).stringify(", ")));
    c.bench_function("stringify_property_flags", |b| b.iter(|| black_box(property).stringify(", ")));
}

fn bench_sanitise(c: &mut Criterion) {
    let names = ["PlayerController", "3D Widget (Copy)", "bool", "Größe+Weite", "Default__BP_Hero_C"];

    c.bench_function("to_valid_string", |b| {
        b.iter(|| {
            for name in names {
                black_box(to_valid_string(black_box(name)));
            }
        })
    });
}

fn bench_pool_traversal(c: &mut Criterion) {
    let (pool, indices) = FlatPool::new(&["None", "ByteProperty", "PlayerController", "Default__Object", "K2_GetActorLocation"]);
    let config = EngineVariantConfig {
        use_name_pool: true,
        ..Default::default()
    };
    let table = NameTable::from_config(POOL, &config);

    c.bench_function("pool_read_name", |b| {
        b.iter(|| {
            for &index in &indices {
                black_box(table.read_name(&pool, &config, black_box(index), 0));
            }
        })
    });
}

criterion_group!(benches, bench_flags, bench_sanitise, bench_pool_traversal);
criterion_main!(benches);
