// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Ember sandbox
// Builds terrain chunk meshes on the job system, then saves and reloads them
// through the buffer codec.

use anyhow::{anyhow, bail, ensure, Context, Result};
use ember_core::math::{IntVec2, Rgba8, Vec2, Vec3, VertexPcu};
use ember_core::Job;
use ember_io::{BufferParser, BufferWriter, Endianness};
use ember_jobs::{JobSystem, JobSystemConfig};

const CONFIG_ENV: &str = "EMBER_JOBS_CONFIG";
const SAVE_MAGIC: &[u8; 4] = b"EMBR";
const SAVE_VERSION: u16 = 1;
const CHUNK_SIZE: i32 = 8;
const CHUNKS_PER_SIDE: i32 = 4;
const QUAD_CORNERS: [(f32, f32); 6] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
];

/// Generates a flat quad grid for one terrain chunk.
struct ChunkMeshJob {
    coords: IntVec2,
    vertices: Vec<VertexPcu>,
}

impl ChunkMeshJob {
    fn new(coords: IntVec2) -> Self {
        Self {
            coords,
            vertices: Vec::new(),
        }
    }
}

impl Job for ChunkMeshJob {
    fn execute(&mut self) {
        let origin = Vec2::new(
            (self.coords.x * CHUNK_SIZE) as f32,
            (self.coords.y * CHUNK_SIZE) as f32,
        );
        let shade = (self.coords.taxicab_length() * 16).clamp(0, 255) as u8;
        let color = Rgba8::rgb(shade, 160, 255 - shade);

        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let corner = origin + Vec2::new(x as f32, y as f32);
                for (dx, dy) in QUAD_CORNERS {
                    let position = Vec3::new(corner.x + dx, corner.y + dy, 0.0);
                    self.vertices
                        .push(VertexPcu::new(position, color, Vec2::new(dx, dy)));
                }
            }
        }
    }

    fn name(&self) -> &str {
        "chunk-mesh"
    }
}

fn load_config() -> Result<JobSystemConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => JobSystemConfig::load(&path)
            .with_context(|| format!("failed to load job system config from {CONFIG_ENV}")),
        None => Ok(JobSystemConfig::default()),
    }
}

fn build_chunks(jobs: &JobSystem) -> Result<Vec<ChunkMeshJob>> {
    let mut queued = 0;
    for cy in 0..CHUNKS_PER_SIDE {
        for cx in 0..CHUNKS_PER_SIDE {
            jobs.queue(ChunkMeshJob::new(IntVec2::new(cx, cy)))
                .map_err(|rejected| anyhow!("{rejected}"))?;
            queued += 1;
        }
    }
    log::info!("Queued {queued} chunk mesh jobs");

    jobs.wait_until_idle();

    let mut chunks = Vec::with_capacity(queued);
    for job in jobs.retrieve_completed_jobs() {
        match job.downcast::<ChunkMeshJob>() {
            Ok(chunk) => chunks.push(*chunk),
            Err(other) => bail!("unexpected job in completed queue: {other:?}"),
        }
    }
    ensure!(
        chunks.len() == queued,
        "expected {queued} chunks, retrieved {}",
        chunks.len()
    );
    Ok(chunks)
}

fn save_chunks(chunks: &[ChunkMeshJob], endianness: Endianness) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut writer = BufferWriter::new(&mut bytes, endianness);

    writer.append_bytes(SAVE_MAGIC);
    writer.append_bool(endianness == Endianness::Big);
    writer.append_u16(SAVE_VERSION);
    writer.append_string_with_length("terrain");
    writer.append_u32(chunks.len() as u32);
    for chunk in chunks {
        writer.append_int_vec2(chunk.coords);
        writer.append_u32(chunk.vertices.len() as u32);
        for vertex in &chunk.vertices {
            writer.append_vertex_pcu(vertex);
        }
    }
    bytes
}

fn load_chunks(bytes: &[u8]) -> Result<Vec<ChunkMeshJob>> {
    let mut parser = BufferParser::new(bytes, Endianness::Little);
    ensure!(
        parser.parse_bytes(SAVE_MAGIC.len()) == SAVE_MAGIC,
        "not an ember save file"
    );

    // Everything after the order flag is in the order it names.
    let big = parser.parse_bool();
    parser.set_endianness(if big { Endianness::Big } else { Endianness::Little });
    let version = parser.parse_u16();
    ensure!(version == SAVE_VERSION, "unsupported save version {version}");

    let label = parser.parse_string_with_length();
    let count = parser.parse_u32() as usize;
    log::debug!("Loading {count} chunks from '{label}'");

    let mut chunks = Vec::with_capacity(count);
    for _ in 0..count {
        let coords = parser.parse_int_vec2();
        let vertex_count = parser.parse_u32() as usize;
        let vertices = (0..vertex_count)
            .map(|_| parser.parse_vertex_pcu())
            .collect();
        chunks.push(ChunkMeshJob { coords, vertices });
    }
    ensure!(parser.is_at_end(), "{} trailing bytes", parser.remaining());
    Ok(chunks)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let mut jobs = JobSystem::startup(config).context("failed to start the job system")?;

    let chunks = build_chunks(&jobs)?;
    let stats = jobs.stats();
    log::info!(
        "Job system stats: queued={}, completed={}, retrieved={}",
        stats.queued,
        stats.completed,
        stats.retrieved
    );
    jobs.shutdown();

    for endianness in [Endianness::Little, Endianness::Big] {
        let bytes = save_chunks(&chunks, endianness);
        let reloaded = load_chunks(&bytes)?;
        ensure!(reloaded.len() == chunks.len(), "chunk count mismatch");
        for (saved, loaded) in chunks.iter().zip(&reloaded) {
            ensure!(saved.coords == loaded.coords, "chunk coordinates mismatch");
            ensure!(saved.vertices == loaded.vertices, "vertex data mismatch");
        }
        log::info!(
            "{endianness:?} save: {} bytes, {} chunks verified",
            bytes.len(),
            reloaded.len()
        );
    }

    Ok(())
}
