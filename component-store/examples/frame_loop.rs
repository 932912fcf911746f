// Copyright 2025 John Brosnihan
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
//! Frame loop example
//!
//! Shows the intended per-frame order: mutate, let read-only consumers
//! observe new/changed/removed components, then close the frame.

use component_store::ecs::{ComponentData, ContainerStore, EntityAllocator};
use component_store::pool::PoolConfig;
use component_store::StoreResult;

#[derive(Debug, Default)]
struct Transform {
    x: f32,
    y: f32,
}

impl ComponentData for Transform {}

#[derive(Debug, Default)]
struct MeshHandle(u32);

impl ComponentData for MeshHandle {}

// Stand-in for a renderer that owns GPU resources keyed by mesh handle
fn render_pass(store: &mut ContainerStore, frame: u32) -> StoreResult<()> {
    let meshes = store.container_mut::<MeshHandle>()?;
    for slot in meshes.iterate_new() {
        println!("  [frame {frame}] upload mesh {} for {}", slot.value.0, slot.entity());
    }
    for slot in meshes.iterate_removed() {
        println!("  [frame {frame}] release mesh {} for {}", slot.value.0, slot.entity());
    }

    let transforms = store.container_mut::<Transform>()?;
    for slot in transforms.iterate_changed() {
        println!(
            "  [frame {frame}] {} moved to ({:.1}, {:.1})",
            slot.entity(),
            slot.value.x,
            slot.value.y
        );
    }
    Ok(())
}

fn main() -> StoreResult<()> {
    println!("Component Store - Frame Loop Example");
    println!("====================================\n");

    let mut store = ContainerStore::builder()
        .default_pool_config(PoolConfig::new(2, 2))
        .register::<Transform>()
        .register::<MeshHandle>()
        .build()?;
    let mut entities = EntityAllocator::new();

    let ship = entities.allocate();
    let rock = entities.allocate();
    store.create::<Transform>(ship)?;
    store.insert(ship, MeshHandle(7))?;
    store.create::<Transform>(rock)?;
    store.insert(rock, MeshHandle(9))?;

    for frame in 0..4 {
        println!("Frame {frame}:");
        match frame {
            1 => {
                let transform = store.get_mut::<Transform>(ship)?;
                transform.x += 1.5;
                transform.y -= 0.5;
                store.change::<Transform>(ship)?;
            }
            2 => {
                let marked = store.mark_for_removal(rock)?;
                println!("  marked {marked} components of {rock} for removal");
            }
            _ => {}
        }

        render_pass(&mut store, frame)?;
        let report = store.end_frame()?;
        println!(
            "  end of frame: advanced {}, destroyed {}\n",
            report.advanced, report.destroyed
        );
    }

    println!(
        "{} still has a mesh: {}",
        rock,
        store.contains::<MeshHandle>(rock)
    );

    for container in store.containers() {
        println!("{}: {} live", container.type_name(), container.len());
    }
    let stats = store.container::<Transform>()?.stats();
    println!(
        "Transform pool: created {}, destroyed {}, resized {} times, peak {}",
        stats.created, stats.destroyed, stats.resize_count, stats.peak_count
    );
    Ok(())
}
