use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ember_core::math::{Rgba8, Vec2, Vec3, VertexPcutbn};
use ember_io::{BufferParser, BufferWriter, Endianness};

fn mesh(count: usize) -> Vec<VertexPcutbn> {
    (0..count)
        .map(|i| {
            let f = i as f32;
            VertexPcutbn::new(Vec3::new(f, f * 0.5, -f), Rgba8::WHITE, Vec2::new(f, 1.0 - f))
        })
        .collect()
}

fn bench_vertices(c: &mut Criterion) {
    let vertices = mesh(10_000);

    let mut group = c.benchmark_group("Buffer Codec");

    for order in [Endianness::Native, Endianness::Big] {
        group.bench_function(format!("Append 10k PCUTBN ({order:?})"), |b| {
            let mut buffer = Vec::with_capacity(vertices.len() * 60);
            b.iter(|| {
                buffer.clear();
                let mut writer = BufferWriter::new(&mut buffer, order);
                for vertex in &vertices {
                    writer.append_vertex_pcutbn(vertex);
                }
                black_box(writer.len());
            });
        });

        let mut encoded = Vec::new();
        let mut writer = BufferWriter::new(&mut encoded, order);
        for vertex in &vertices {
            writer.append_vertex_pcutbn(vertex);
        }

        group.bench_function(format!("Parse 10k PCUTBN ({order:?})"), |b| {
            b.iter(|| {
                let mut parser = BufferParser::new(&encoded, order);
                while !parser.is_at_end() {
                    black_box(parser.parse_vertex_pcutbn());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vertices);
criterion_main!(benches);
