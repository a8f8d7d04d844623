//! # Infinite Walk Integration Test
//!
//! An observer walking across the world always has a full active window
//! and ground under its feet.

use std::time::Instant;

use inhexit_world::{AxialCoord, CellValue, World, CHUNK_WIDTH};

/// Test: Walk 200 chunks east and back without losing the window.
#[test]
fn test_walk_east_and_back() {
    let mut world = World::with_seed(42.0);
    let cell_size = world.config().cell_size;
    let column = cell_size * 1.5;

    let start = Instant::now();
    let mut x = 0.0f32;
    let steps = 200 * CHUNK_WIDTH / 8;

    for step in 0..steps * 2 {
        x += if step < steps { column * 8.0 } else { -column * 8.0 };
        let y = world.find_surface_height(x);
        world.update_active_window((x, y));

        assert_eq!(world.active_chunks().len(), 25, "window shrank at x={x}");
        let active_flags = world.chunks().filter(|c| c.is_active()).count();
        assert_eq!(active_flags, 25, "stale active flags at x={x}");

        if step % 50 == 0 {
            let q = (x / column).round() as i32;
            let base = world.generator().base_level(q);
            assert_eq!(
                world.get_cell(AxialCoord::new(q, base)),
                CellValue::Grass,
                "no ground at q={q}"
            );
        }
    }

    println!("Walked 400 chunks in {:?}", start.elapsed());
    println!("Loaded chunks: {}", world.loaded_chunk_count());
    println!("Generated total: {}", world.stats().generated);

    // Walking back revisits chunks instead of regenerating them.
    assert_eq!(world.stats().generated as usize, world.loaded_chunk_count());
    assert!(x.abs() < column, "walk did not return to the start");
}

/// Test: Edits survive the observer walking away and back.
#[test]
fn test_edits_survive_walk() {
    let mut world = World::with_seed(7.0);
    let column = world.config().cell_size * 1.5;

    world.update_active_window((0.0, 0.0));
    let surface = world.generator().base_level(0);
    world.set_cell(AxialCoord::new(0, surface), CellValue::Empty);

    world.update_active_window((column * 32.0 * 50.0, 0.0));
    world.update_active_window((0.0, 0.0));

    assert_eq!(world.get_cell(AxialCoord::new(0, surface)), CellValue::Empty);
    assert_eq!(world.dirty_chunks().count(), 1);
}
