//! GPU-based particle simulation manager
//!
//! Owns the position and velocity storage buffers and the integration compute
//! pipeline. The position buffer doubles as the renderer's instance buffer, so
//! the host must record the compute pass before the render pass that reads it
//! (same encoder or an earlier submission). wgpu inserts the storage-to-vertex
//! barrier between the two passes.

use crate::error::SimulationError;
use crate::IntegrationParams;
use glam::UVec3;
use particle_physics::{
    check_buffer_limits, ForceField, GridDims, ParticleStore, Slot, TileSize, WorldInfo,
    SLOT_BYTES,
};
use std::sync::mpsc;
use wgpu::util::DeviceExt;

/// Source of the integration kernel, shared with tests that check the
/// workgroup size against [`TileSize::INTEGRATION`].
pub const INTEGRATE_SHADER: &str = include_str!("shaders/integrate.wgsl");

/// GPU-based particle integration
pub struct ParticleSimulation {
    device: wgpu::Device,
    queue: wgpu::Queue,

    // Buffers
    position_buffer: wgpu::Buffer,
    velocity_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,

    integrate_pipeline: wgpu::ComputePipeline,
    integrate_bind_group: wgpu::BindGroup,

    params: IntegrationParams,
    dims: GridDims,
    workgroups: UVec3,
}

impl ParticleSimulation {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        store: &ParticleStore,
        field: &ForceField,
    ) -> Result<Self, SimulationError> {
        log::info!("Initializing ParticleSimulation...");
        let dims = store.dims();
        dims.check_count(store.len())?;

        let limits = device.limits();
        let workgroups = dims.checked_workgroup_count(
            TileSize::INTEGRATION,
            limits.max_compute_workgroups_per_dimension,
        )?;
        check_buffer_limits(
            dims,
            u64::from(limits.max_storage_buffer_binding_size),
            limits.max_buffer_size,
        )?;
        log::info!(
            "Grid {} ({} particles), {}x{}x{} workgroups of {} invocations",
            dims,
            dims.count(),
            workgroups.x,
            workgroups.y,
            workgroups.z,
            TileSize::INTEGRATION.invocations()
        );

        // Positions are also read as per-instance vertex data by the renderer
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Position Buffer"),
            contents: bytemuck::cast_slice(store.positions()),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let velocity_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Velocity Buffer"),
            contents: bytemuck::cast_slice(store.velocities()),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let params = IntegrationParams::new(WorldInfo::default(), field, dims);
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Integration Params Buffer"),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Readback layout: [positions | velocities]
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Staging Buffer"),
            size: 2 * SLOT_BYTES * store.len() as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!("Buffers created");

        let integrate_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Integration Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(INTEGRATE_SHADER.into()),
        });

        let integrate_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Integration Bind Group Layout"),
                entries: &[
                    // Positions (read_write) - Binding 0
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Velocities (read_write) - Binding 1
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Params (uniform) - Binding 2
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let integrate_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Integration Pipeline Layout"),
                bind_group_layouts: &[&integrate_bind_group_layout],
                push_constant_ranges: &[],
            });

        let integrate_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Integration Pipeline"),
            layout: Some(&integrate_pipeline_layout),
            module: &integrate_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        log::info!("Pipelines created");

        let integrate_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Integration Bind Group"),
            layout: &integrate_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: velocity_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        log::info!("Bind groups created");

        Ok(Self {
            device,
            queue,
            position_buffer,
            velocity_buffer,
            params_buffer,
            staging_buffer,
            integrate_pipeline,
            integrate_bind_group,
            params,
            dims,
            workgroups,
        })
    }

    /// Upload the timing for the next tick.
    pub fn update_world(&mut self, world: WorldInfo) {
        self.params.set_world(world);
        self.write_params();
    }

    /// Upload new force field parameters.
    pub fn update_force(&mut self, field: &ForceField) {
        self.params.set_force(field);
        self.write_params();
    }

    fn write_params(&self) {
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[self.params]));
    }

    /// Record one integration tick into `encoder`.
    pub fn encode_step(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Integration Compute Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.integrate_pipeline);
        compute_pass.set_bind_group(0, &self.integrate_bind_group, &[]);
        compute_pass.dispatch_workgroups(self.workgroups.x, self.workgroups.y, self.workgroups.z);
    }

    /// Step the simulation forward by one timestep in its own submission.
    pub fn step(&self) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Simulation Encoder"),
            });
        self.encode_step(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Overwrite GPU state with `store`, e.g. to restart from the spawn layout.
    pub fn reset(&self, store: &ParticleStore) -> Result<(), SimulationError> {
        self.dims.check_same(store.dims())?;
        self.queue.write_buffer(
            &self.position_buffer,
            0,
            bytemuck::cast_slice(store.positions()),
        );
        self.queue.write_buffer(
            &self.velocity_buffer,
            0,
            bytemuck::cast_slice(store.velocities()),
        );
        log::debug!("Particle buffers reset ({} particles)", store.len());
        Ok(())
    }

    /// Copy both buffers back to the CPU. Blocks until the GPU is idle.
    pub fn read_back(&self) -> Result<ParticleStore, SimulationError> {
        let bytes = SLOT_BYTES * self.dims.count() as u64;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.position_buffer, 0, &self.staging_buffer, 0, bytes);
        encoder.copy_buffer_to_buffer(&self.velocity_buffer, 0, &self.staging_buffer, bytes, bytes);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging_buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        receiver.recv()??;

        let (positions, velocities) = {
            let data = slice.get_mapped_range();
            let bytes: &[u8] = &data;
            let slots: &[Slot] = bytemuck::cast_slice(bytes);
            let (positions, velocities) = slots.split_at(self.dims.count());
            (positions.to_vec(), velocities.to_vec())
        };
        self.staging_buffer.unmap();

        Ok(ParticleStore::from_parts(self.dims, positions, velocities)?)
    }

    /// Position buffer, bound by the renderer as per-instance data.
    pub fn position_buffer(&self) -> &wgpu::Buffer {
        &self.position_buffer
    }

    pub fn particle_count(&self) -> u32 {
        self.dims.count() as u32
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_workgroup_matches_integration_tile() {
        assert!(INTEGRATE_SHADER.contains(&TileSize::INTEGRATION.wgsl_attribute()));
    }

    #[test]
    fn shader_flattens_like_the_grid_codec() {
        assert!(INTEGRATE_SHADER
            .contains("let index = gid.x + gid.y * dims.x + gid.z * dims.x * dims.y;"));
    }

    #[test]
    fn shader_bindings_match_layout() {
        for binding in [
            "@group(0) @binding(0) var<storage, read_write> positions: array<vec4<f32>>;",
            "@group(0) @binding(1) var<storage, read_write> velocities: array<vec4<f32>>;",
            "@group(0) @binding(2) var<uniform> params: IntegrationParams;",
        ] {
            assert!(INTEGRATE_SHADER.contains(binding), "missing `{binding}`");
        }
    }
}
